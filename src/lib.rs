#![doc = "The `tasktrack` library crate."]
#![doc = ""]
#![doc = "Multi-tenant task tracking: users register, log in for a bearer token, and"]
#![doc = "manage a private list of tasks. The binary (`main.rs`) wires these modules"]
#![doc = "into an actix-web server backed by Postgres."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod tasks;

pub use crate::error::AppError;
pub use crate::state::AppState;
