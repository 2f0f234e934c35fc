use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String, // hash once registered
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Caller-supplied fields of a user; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
            is_active: true,
        }
    }
}

/// The only fields `UserService::update_user` writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPatch {
    pub password: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserPatch {
    /// Overwrite the allowlisted fields and stamp `updated_at`.
    pub(crate) fn apply(self, user: &mut User, now: OffsetDateTime) {
        user.password = self.password;
        user.email = self.email;
        user.first_name = self.first_name;
        user.last_name = self.last_name;
        user.updated_at = now;
    }
}
