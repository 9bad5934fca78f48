use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A stored user record.
///
/// `email` keeps the casing it was registered with; comparisons against it are
/// case-insensitive (see [`crate::store`]). Not `Serialize` on purpose: use
/// [`UserResponse`] for anything that leaves the service.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user, without the password hash.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        }
    }
}
