use std::sync::Arc;

use crate::auth::flow::AuthFlow;
use crate::auth::identity::IdentityResolver;
use crate::auth::password::{PasswordError, PasswordHasher};
use crate::auth::token::{TokenKeys, TokenService};
use crate::config::Config;
use crate::store::{TaskStore, UserStore};

/// Everything a request handler needs, built once at startup and shared
/// read-only across workers through `web::Data`.
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub auth: AuthFlow,
    pub identity: IdentityResolver,
}

impl AppState {
    pub fn new(
        hasher: PasswordHasher,
        tokens: TokenService,
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Result<Self, PasswordError> {
        let tokens = Arc::new(tokens);
        Ok(Self {
            users,
            tasks,
            auth: AuthFlow::new(hasher, tokens.clone())?,
            identity: IdentityResolver::new(tokens),
        })
    }

    pub fn from_config(
        config: &Config,
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Result<Self, PasswordError> {
        let tokens = TokenService::new(
            TokenKeys::from_secret(config.jwt_secret.as_bytes()),
            config.token_lifetime,
        );
        Self::new(PasswordHasher::new(config.bcrypt_cost), tokens, users, tasks)
    }
}
