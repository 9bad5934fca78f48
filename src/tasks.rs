//! Task operations scoped to an authenticated owner.

use log::debug;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Task, TaskInput, TaskPatch, TaskQuery, User};
use crate::store::{StoreError, TaskStore};

#[derive(Debug, Error)]
pub enum TaskError {
    /// The task does not exist or belongs to someone else. The two cases are
    /// deliberately the same error.
    #[error("task not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Task CRUD for one resolved identity.
///
/// The owner id is captured at construction and passed to every store call,
/// so there is no way to reach a task by id alone.
pub struct TaskFlow<'a> {
    store: &'a dyn TaskStore,
    owner_id: i32,
}

impl<'a> TaskFlow<'a> {
    pub fn for_owner(store: &'a dyn TaskStore, owner: &User) -> Self {
        Self {
            store,
            owner_id: owner.id,
        }
    }

    pub async fn create(&self, input: TaskInput) -> Result<Task, TaskError> {
        let task = self.store.insert(self.owner_id, input).await?;
        debug!("user {} created task {}", self.owner_id, task.id);
        Ok(task)
    }

    pub async fn list(&self, query: &TaskQuery) -> Result<Vec<Task>, TaskError> {
        let tasks = self
            .store
            .list_by_owner(self.owner_id, query.offset(), query.limit())
            .await?;
        Ok(tasks)
    }

    pub async fn get(&self, id: Uuid) -> Result<Task, TaskError> {
        self.store
            .find_by_id_and_owner(id, self.owner_id)
            .await?
            .ok_or(TaskError::NotFound)
    }

    pub async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<Task, TaskError> {
        self.store
            .update(id, self.owner_id, patch)
            .await?
            .ok_or(TaskError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), TaskError> {
        if self.store.delete(id, self.owner_id).await? {
            debug!("user {} deleted task {}", self.owner_id, id);
            Ok(())
        } else {
            Err(TaskError::NotFound)
        }
    }
}
