use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use super::repo::UserStore;
use super::repo_types::{NewUser, User, UserPatch};
use crate::auth::{authenticator::Authenticator, error::AuthError, password::PasswordEncoder};

/// User management operations on top of a [`UserStore`].
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    encoder: Arc<dyn PasswordEncoder>,
    authenticator: Arc<dyn Authenticator>,
}

impl UserService {
    pub fn new(
        store: Arc<dyn UserStore>,
        encoder: Arc<dyn PasswordEncoder>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            store,
            encoder,
            authenticator,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        self.store.find_all().await
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i64) -> anyhow::Result<Option<User>> {
        self.store.find_by_id(id).await
    }

    /// Persist the record as given. The password is stored verbatim.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn create_user(&self, user: NewUser) -> anyhow::Result<User> {
        let user = self.store.insert(user).await?;
        info!(user_id = user.id, "user created");
        Ok(user)
    }

    /// Overwrite the fields in [`UserPatch`] and stamp `updated_at`.
    /// Username, active flag and creation time are never touched.
    #[instrument(skip(self, patch))]
    pub async fn update_user(&self, id: i64, patch: UserPatch) -> anyhow::Result<Option<User>> {
        let Some(mut user) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };
        patch.apply(&mut user, OffsetDateTime::now_utc());
        let user = self.store.save(user).await?;
        info!(user_id = user.id, "user updated");
        Ok(Some(user))
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> anyhow::Result<bool> {
        if !self.store.exists_by_id(id).await? {
            return Ok(false);
        }
        self.store.delete_by_id(id).await?;
        info!(user_id = id, "user deleted");
        Ok(true)
    }

    #[instrument(skip(self))]
    pub async fn activate_user(&self, id: i64) -> anyhow::Result<bool> {
        if !self.store.exists_by_id(id).await? {
            return Ok(false);
        }
        let Some(mut user) = self.store.find_by_id(id).await? else {
            return Ok(false);
        };
        user.is_active = true;
        self.store.save(user).await?;
        info!(user_id = id, "user activated");
        Ok(true)
    }

    /// Clears the flag on a fetched copy only; the stored row keeps its
    /// current `is_active`. Callers relying on durability must not use this.
    #[instrument(skip(self))]
    pub async fn deactivate_user(&self, id: i64) -> anyhow::Result<bool> {
        if !self.store.exists_by_id(id).await? {
            return Ok(false);
        }
        let Some(mut user) = self.store.find_by_id(id).await? else {
            return Ok(false);
        };
        user.is_active = false;
        warn!(user_id = user.id, "deactivation applied to fetched copy only, not persisted");
        Ok(true)
    }

    /// Hash the password, then create the user.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn register(&self, mut user: NewUser) -> anyhow::Result<User> {
        user.password = self.encoder.encode(&user.password)?;
        let user = self.create_user(user).await?;
        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        match self.authenticator.authenticate(username, password).await {
            Ok(user) => {
                info!(user_id = user.id, "user authenticated");
                Ok(user)
            }
            Err(e) => {
                debug!(error = %e, "authentication rejected");
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        self.store.find_by_username(username).await
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        self.store.find_by_email(email).await
    }

    pub fn hash_password(&self, plain: &str) -> anyhow::Result<String> {
        self.encoder.encode(plain)
    }
}
