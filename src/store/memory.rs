use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{StoreError, TaskStore, UserStore};
use crate::models::{Task, TaskInput, TaskPatch, User};

/// In-process store implementing both [`UserStore`] and [`TaskStore`].
///
/// The email uniqueness check and the insert happen under the same lock, which
/// gives the same guarantee as a unique index.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<UserTable>,
    tasks: Mutex<Vec<Task>>,
}

#[derive(Default)]
struct UserTable {
    next_id: i32,
    rows: Vec<User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a user and their tasks.
    pub async fn remove_user(&self, id: i32) {
        self.users.lock().await.rows.retain(|u| u.id != id);
        self.tasks.lock().await.retain(|t| t.owner_id != id);
    }
}

/// Full Unicode lowercase comparison, matching `lower()` on a UTF-8 Postgres
/// database.
fn same_email(stored: &str, candidate: &str) -> bool {
    stored.to_lowercase() == candidate.to_lowercase()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut table = self.users.lock().await;
        if table.rows.iter().any(|u| same_email(&u.email, email)) {
            return Err(StoreError::DuplicateEmail);
        }

        table.next_id += 1;
        let user = User {
            id: table.next_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        table.rows.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let table = self.users.lock().await;
        Ok(table
            .rows
            .iter()
            .find(|u| same_email(&u.email, email))
            .cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let table = self.users.lock().await;
        Ok(table.rows.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, owner_id: i32, input: TaskInput) -> Result<Task, StoreError> {
        let task = Task::new(input, owner_id);
        self.tasks.lock().await.push(task.clone());
        Ok(task)
    }

    async fn list_by_owner(
        &self,
        owner_id: i32,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.lock().await;
        Ok(tasks
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn find_by_id_and_owner(
        &self,
        id: Uuid,
        owner_id: i32,
    ) -> Result<Option<Task>, StoreError> {
        let tasks = self.tasks.lock().await;
        Ok(tasks
            .iter()
            .find(|t| t.id == id && t.owner_id == owner_id)
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: i32,
        patch: TaskPatch,
    ) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.lock().await;
        match tasks
            .iter_mut()
            .find(|t| t.id == id && t.owner_id == owner_id)
        {
            Some(task) => {
                task.apply(patch);
                Ok(Some(task.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid, owner_id: i32) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.lock().await;
        let before = tasks.len();
        tasks.retain(|t| !(t.id == id && t.owner_id == owner_id));
        Ok(tasks.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: None,
        }
    }

    #[actix_rt::test]
    async fn test_email_uniqueness_ignores_case() {
        let store = MemoryStore::new();
        let user = UserStore::insert(&store, "Mixed@Example.com", "hash").await.unwrap();
        assert_eq!(user.email, "Mixed@Example.com");

        let duplicate = UserStore::insert(&store, "mixed@example.COM", "hash").await;
        assert!(matches!(duplicate, Err(StoreError::DuplicateEmail)));

        let found = store.find_by_email("MIXED@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[actix_rt::test]
    async fn test_email_uniqueness_folds_non_ascii_letters() {
        let store = MemoryStore::new();
        UserStore::insert(&store, "Émile@Example.com", "hash").await.unwrap();

        let duplicate = UserStore::insert(&store, "émile@example.com", "hash").await;
        assert!(matches!(duplicate, Err(StoreError::DuplicateEmail)));
        assert!(store.find_by_email("ÉMILE@EXAMPLE.COM").await.unwrap().is_some());
    }

    #[actix_rt::test]
    async fn test_update_clears_description_and_bumps_timestamp() {
        let store = MemoryStore::new();
        let task = TaskStore::insert(
            &store,
            1,
            TaskInput {
                title: "with notes".to_string(),
                description: Some("notes".to_string()),
            },
        )
        .await
        .unwrap();

        let updated = store
            .update(
                task.id,
                1,
                TaskPatch {
                    description: Some(None),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[actix_rt::test]
    async fn test_user_ids_are_unique() {
        let store = MemoryStore::new();
        let a = UserStore::insert(&store, "a@example.com", "h").await.unwrap();
        let b = UserStore::insert(&store, "b@example.com", "h").await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.find_by_id(b.id).await.unwrap().map(|u| u.email), Some(b.email));
        assert!(store.find_by_id(999).await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_task_operations_are_scoped_to_owner() {
        let store = MemoryStore::new();
        let task = TaskStore::insert(&store, 1, input("mine")).await.unwrap();

        assert!(store.find_by_id_and_owner(task.id, 2).await.unwrap().is_none());
        assert!(store
            .update(task.id, 2, TaskPatch::default())
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete(task.id, 2).await.unwrap());

        assert!(store.find_by_id_and_owner(task.id, 1).await.unwrap().is_some());
        assert!(store.delete(task.id, 1).await.unwrap());
        assert!(store.find_by_id_and_owner(task.id, 1).await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_list_pagination_preserves_creation_order() {
        let store = MemoryStore::new();
        for title in ["one", "two", "three"] {
            TaskStore::insert(&store, 1, input(title)).await.unwrap();
        }
        TaskStore::insert(&store, 2, input("other")).await.unwrap();

        let titles = |tasks: Vec<Task>| tasks.into_iter().map(|t| t.title).collect::<Vec<_>>();
        assert_eq!(
            titles(store.list_by_owner(1, 0, 100).await.unwrap()),
            vec!["one", "two", "three"]
        );
        assert_eq!(titles(store.list_by_owner(1, 1, 1).await.unwrap()), vec!["two"]);
    }

    #[actix_rt::test]
    async fn test_remove_user_drops_their_tasks() {
        let store = MemoryStore::new();
        let user = UserStore::insert(&store, "gone@example.com", "h").await.unwrap();
        TaskStore::insert(&store, user.id, input("orphan")).await.unwrap();

        store.remove_user(user.id).await;
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
        assert!(store.list_by_owner(user.id, 0, 100).await.unwrap().is_empty());
    }
}
