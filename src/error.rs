//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the single error type handlers return.
//! Every domain error (`AuthError`, `IdentityError`, `TaskError`,
//! `StoreError`, `validator::ValidationErrors`) converts into it with `?`.
//!
//! `AppError` implements `actix_web::error::ResponseError`, turning errors into
//! JSON bodies of the form `{"error": "..."}`. Internal details (store
//! failures, token failure kinds) are logged here and never sent to clients.

use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use log::error;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::flow::AuthError;
use crate::auth::identity::IdentityError;
use crate::store::StoreError;
use crate::tasks::TaskError;

const UNAUTHORIZED_MESSAGE: &str = "Could not validate credentials";
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed, expired or otherwise rejected bearer token (HTTP 401).
    Unauthorized,
    /// Login failed, for either an unknown email or a wrong password (HTTP 401).
    InvalidCredentials,
    /// Represents a client-side error due to a malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// Represents a situation where a requested resource was not found (HTTP 404).
    NotFound(String),
    /// Represents an unexpected server-side error (HTTP 500).
    /// The message is logged, not returned.
    InternalServerError(String),
    /// Represents an error originating from the store (HTTP 500).
    DatabaseError(String),
    /// Represents an error due to failed input validation (HTTP 422 Unprocessable Entity).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            AppError::Unauthorized => response
                .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
                .json(json!({ "error": UNAUTHORIZED_MESSAGE })),
            AppError::InvalidCredentials => response
                .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
                .json(json!({ "error": "Incorrect email or password" })),
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::ValidationError(msg) => response.json(json!({ "error": msg })),
            AppError::InternalServerError(msg) | AppError::DatabaseError(msg) => {
                error!("{}", msg);
                response.json(json!({ "error": INTERNAL_MESSAGE }))
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::DuplicateEmail => AppError::BadRequest("Email already registered".into()),
            other => AppError::DatabaseError(other.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::DuplicateEmail => AppError::BadRequest("Email already registered".into()),
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(error: IdentityError) -> AppError {
        match error {
            IdentityError::MissingCredential | IdentityError::Unauthorized => AppError::Unauthorized,
            IdentityError::Store(e) => e.into(),
        }
    }
}

impl From<TaskError> for AppError {
    fn from(error: TaskError) -> AppError {
        match error {
            TaskError::NotFound => AppError::NotFound("Task not found".into()),
            TaskError::Store(e) => e.into(),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}
