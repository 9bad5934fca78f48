//! Persistence collaborators for users and tasks.
//!
//! Stores return plain records; nothing is loaded lazily. Every task query
//! takes the owner id as part of its key, so a task id alone never reaches a
//! row belonging to someone else.
//!
//! Email comparison is case-insensitive everywhere; the stored email keeps
//! the casing it was registered with.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Task, TaskInput, TaskPatch, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The email is already taken. Raised by the storage layer itself, so
    /// concurrent registrations cannot both succeed.
    #[error("email already registered")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match error {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateEmail
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(error.to_string())
            }
            _ => StoreError::Database(error.to_string()),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user.
    ///
    /// # Errors
    /// * `DuplicateEmail` - a user with the same email (ignoring case) exists
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, owner_id: i32, input: TaskInput) -> Result<Task, StoreError>;

    /// Tasks of `owner_id` in creation order.
    async fn list_by_owner(
        &self,
        owner_id: i32,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Task>, StoreError>;

    async fn find_by_id_and_owner(&self, id: Uuid, owner_id: i32)
        -> Result<Option<Task>, StoreError>;

    /// Returns `None` when no task with this id belongs to `owner_id`.
    async fn update(
        &self,
        id: Uuid,
        owner_id: i32,
        patch: TaskPatch,
    ) -> Result<Option<Task>, StoreError>;

    /// Returns whether a task was removed.
    async fn delete(&self, id: Uuid, owner_id: i32) -> Result<bool, StoreError>;
}
