use std::sync::Arc;

use log::{debug, warn};
use thiserror::Error;

use crate::auth::token::TokenService;
use crate::models::User;
use crate::store::{StoreError, UserStore};

#[derive(Debug, Error)]
pub enum IdentityError {
    /// No `Authorization` header, or one that is not `Bearer <token>`.
    #[error("missing bearer credential")]
    MissingCredential,
    /// The token was rejected, or its subject no longer exists.
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves the raw `Authorization` header of a request into the user it
/// authenticates.
///
/// Holds no per-request state; the outcome depends only on the header, the
/// token keys and the current contents of the user store.
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: Arc<TokenService>,
}

impl IdentityResolver {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    pub async fn resolve(
        &self,
        raw_auth_header: Option<&str>,
        users: &dyn UserStore,
    ) -> Result<User, IdentityError> {
        let token = raw_auth_header
            .and_then(bearer_token)
            .ok_or(IdentityError::MissingCredential)?;

        let user_id = self.tokens.verify(token).map_err(|e| {
            debug!("rejected bearer token: {}", e);
            IdentityError::Unauthorized
        })?;

        match users.find_by_id(user_id).await? {
            Some(user) => Ok(user),
            None => {
                warn!("valid token for unknown user {}", user_id);
                Err(IdentityError::Unauthorized)
            }
        }
    }
}

/// Extracts `<token>` from `Bearer <token>`. The scheme is matched
/// case-insensitively.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}
