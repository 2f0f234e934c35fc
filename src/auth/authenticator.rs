use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::error::AuthError;
use super::password::PasswordEncoder;
use crate::users::{repo::UserStore, repo_types::User};

/// Verifies a username/password pair and resolves the principal.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError>;
}

/// Looks the user up by username and checks the stored hash.
pub struct StoreAuthenticator {
    store: Arc<dyn UserStore>,
    encoder: Arc<dyn PasswordEncoder>,
    // verified against when the username is unknown so both paths cost a hash check
    dummy_hash: String,
}

impl StoreAuthenticator {
    pub fn new(store: Arc<dyn UserStore>, encoder: Arc<dyn PasswordEncoder>) -> anyhow::Result<Self> {
        let dummy_hash = encoder.encode("unknown-user-placeholder")?;
        Ok(Self {
            store,
            encoder,
            dummy_hash,
        })
    }
}

#[async_trait]
impl Authenticator for StoreAuthenticator {
    #[instrument(skip(self, password))]
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .store
            .find_by_username(username)
            .await
            .map_err(|e| AuthError::Failed(format!("{:#}", e)))?;

        let Some(user) = user else {
            let _ = self.encoder.matches(password, &self.dummy_hash);
            debug!("unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.encoder.is_encoded(&user.password) {
            let _ = self.encoder.matches(password, &self.dummy_hash);
            warn!(user_id = user.id, "stored password is not a hash");
            return Err(AuthError::InvalidCredentials);
        }

        if !self.encoder.matches(password, &user.password) {
            debug!(user_id = user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        // only reported to callers who already proved the password
        if !user.is_active {
            return Err(AuthError::Failed("User is disabled".into()));
        }

        Ok(user)
    }
}
