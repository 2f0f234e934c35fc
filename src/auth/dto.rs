use serde::Deserialize;

use crate::users::repo_types::NewUser;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl From<RegisterRequest> for NewUser {
    fn from(r: RegisterRequest) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            ..NewUser::new(r.username, r.email, r.password)
        }
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
