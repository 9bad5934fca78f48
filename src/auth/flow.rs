use std::sync::Arc;

use log::{error, info};
use thiserror::Error;

use crate::auth::password::{PasswordError, PasswordHasher};
use crate::auth::token::{TokenError, TokenService};
use crate::models::User;
use crate::store::{StoreError, UserStore};

/// Hashed at startup and verified against when a login names an unknown
/// email, so that path costs one bcrypt verification like a real mismatch.
const DUMMY_PASSWORD: &str = "tasktrack-dummy-password";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already registered")]
    DuplicateEmail,
    /// Unknown email and wrong password both end up here.
    #[error("incorrect email or password")]
    InvalidCredentials,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> AuthError {
        match error {
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(error: TokenError) -> AuthError {
        AuthError::Internal(error.to_string())
    }
}

impl From<PasswordError> for AuthError {
    fn from(error: PasswordError) -> AuthError {
        AuthError::Internal(error.to_string())
    }
}

/// Registration and login.
///
/// Owns the immutable hashing and signing configuration; the user store is
/// passed in on every call.
#[derive(Clone)]
pub struct AuthFlow {
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    dummy_hash: String,
}

impl AuthFlow {
    pub fn new(hasher: PasswordHasher, tokens: Arc<TokenService>) -> Result<Self, PasswordError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            hasher,
            tokens,
            dummy_hash,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Creates a new user. The email keeps its casing but must be unique
    /// ignoring case.
    ///
    /// The pre-check gives a fast answer for the common case; the store's own
    /// uniqueness guarantee decides concurrent registrations.
    pub async fn register(
        &self,
        users: &dyn UserStore,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        if users.find_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hash(password.to_string()).await?;
        let user = users.insert(email, &password_hash).await?;

        info!("registered user {}", user.id);
        Ok(user)
    }

    /// Checks the credentials and issues an access token for the user.
    pub async fn login(
        &self,
        users: &dyn UserStore,
        email: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        let user = users.find_by_email(email).await?;

        let stored_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };
        let verified = self.verify(password.to_string(), stored_hash).await?;

        match user {
            Some(user) if verified => {
                let token = self.tokens.issue(user.id)?;
                info!("user {} logged in", user.id);
                Ok(token)
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn hash(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher;
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))??;
        Ok(hashed)
    }

    /// A stored hash that cannot be parsed counts as a failed verification.
    async fn verify(&self, password: String, stored_hash: String) -> Result<bool, AuthError> {
        let hasher = self.hasher;
        let outcome = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        match outcome {
            Ok(verified) => Ok(verified),
            Err(e) => {
                error!("stored password hash is unusable: {}", e);
                Ok(false)
            }
        }
    }
}
