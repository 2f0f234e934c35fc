use thiserror::Error;

/// Failures of the credential check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown username or wrong password; the two are never told apart.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Anything else that went wrong while authenticating.
    #[error("Authentication failed: {0}")]
    Failed(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Failed(_) => "authentication_failed",
        }
    }
}
