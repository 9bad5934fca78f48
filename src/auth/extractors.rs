use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// The user behind the request's bearer token.
///
/// Taking this as a handler argument makes the route protected: the token is
/// verified before the user store is touched, and any failure ends the
/// request with a 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let auth_header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                AppError::InternalServerError("AppState is not registered".into())
            })?;
            let user = state
                .identity
                .resolve(auth_header.as_deref(), state.users.as_ref())
                .await
                .map_err(AppError::from)?;
            Ok::<_, ActixError>(AuthenticatedUser(user))
        })
    }
}
