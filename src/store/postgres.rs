use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, TaskStore, UserStore};
use crate::config::Config;
use crate::models::{Task, TaskInput, TaskPatch, User};

const USER_COLUMNS: &str = "id, email, password_hash, created_at";
const TASK_COLUMNS: &str = "id, owner_id, title, description, completed, created_at, updated_at";

/// Postgres-backed store.
///
/// Expects the following schema (migrations are managed outside this crate):
///
/// ```sql
/// CREATE TABLE users (
///     id            SERIAL PRIMARY KEY,
///     email         TEXT NOT NULL,
///     password_hash TEXT NOT NULL,
///     created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
/// );
/// CREATE UNIQUE INDEX users_email_lower_key ON users (lower(email));
///
/// CREATE TABLE tasks (
///     id          UUID PRIMARY KEY,
///     owner_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title       TEXT NOT NULL,
///     description TEXT,
///     completed   BOOLEAN NOT NULL DEFAULT false,
///     created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
///     updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
/// );
/// CREATE INDEX tasks_owner_idx ON tasks (owner_id, created_at);
/// ```
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a pool where both acquiring a connection and every statement are
    /// bounded by `database_timeout`.
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let timeout_ms = config.database_timeout.as_millis().to_string();
        let options = PgConnectOptions::from_str(&config.database_url)?
            .options([("statement_timeout", timeout_ms.as_str())]);

        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(config.database_timeout)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert(&self, owner_id: i32, input: TaskInput) -> Result<Task, StoreError> {
        let task = Task::new(input, owner_id);
        let sql = format!(
            "INSERT INTO tasks (id, owner_id, title, description, completed, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(task.owner_id)
            .bind(task.title)
            .bind(task.description)
            .bind(task.completed)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    async fn list_by_owner(
        &self,
        owner_id: i32,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE owner_id = $1
             ORDER BY created_at, id
             OFFSET $2 LIMIT $3",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find_by_id_and_owner(
        &self,
        id: Uuid,
        owner_id: i32,
    ) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: i32,
        patch: TaskPatch,
    ) -> Result<Option<Task>, StoreError> {
        // Timestamps come from the application clock, as on insert.
        let sql = format!(
            "UPDATE tasks
             SET title = COALESCE($1, title),
                 description = CASE WHEN $2 THEN $3 ELSE description END,
                 completed = COALESCE($4, completed),
                 updated_at = $5
             WHERE id = $6 AND owner_id = $7
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(patch.title)
            .bind(patch.description.is_some())
            .bind(patch.description.flatten())
            .bind(patch.completed)
            .bind(Utc::now())
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete(&self, id: Uuid, owner_id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
