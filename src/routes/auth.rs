use crate::{
    auth::{AuthenticatedUser, LoginRequest, RegisterRequest, TokenResponse},
    error::AppError,
    models::UserResponse,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns it without the password hash.
/// An email that is already registered (ignoring case) yields 400.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = state
        .auth
        .register(
            state.users.as_ref(),
            &register_data.email,
            &register_data.password,
        )
        .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Login user
///
/// Authenticates a user and returns a bearer access token. Unknown email and
/// wrong password produce the same 401.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let token = state
        .auth
        .login(state.users.as_ref(), &login_data.email, &login_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token)))
}

/// Logout user
///
/// Tokens are stateless, so this only confirms the caller is authenticated.
/// The token itself stays valid until it expires.
#[post("/logout")]
pub async fn logout(_user: AuthenticatedUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully logged out" })))
}
