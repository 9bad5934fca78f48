pub mod extractors;
pub mod flow;
pub mod identity;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use extractors::AuthenticatedUser;
pub use flow::{AuthError, AuthFlow};
pub use identity::{IdentityError, IdentityResolver};
pub use password::{PasswordError, PasswordHasher};
pub use token::{Claims, TokenError, TokenKeys, TokenService};

/// Body of `POST /login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    /// Not length-checked so that a short wrong password gets the same 401
    /// as any other wrong password.
    pub password: String,
}

/// Body of `POST /register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    /// At least 6 characters. Only the first 72 bytes take part in hashing.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Returned by a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Sent back as `Authorization: Bearer <token>`.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
