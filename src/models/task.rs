use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Default and maximum page size for task listings.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Input structure for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update for a task. Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(min = 1, max = 200))]
    #[serde(default)]
    pub title: Option<String>,

    /// `Some(None)` (an explicit `null`) clears the description.
    #[validate(length(max = 1000))]
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub completed: Option<bool>,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// Identifier of the user who owns the task. Never changes after creation.
    pub owner_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pagination parameters for listing tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskQuery {
    /// Number of tasks to skip. Defaults to 0.
    #[validate(range(min = 0))]
    pub skip: Option<i64>,
    /// Maximum number of tasks to return. Defaults to 100.
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

/// Marks a field as present even when its value is `null`, so that an
/// absent field and an explicit `null` deserialize differently.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl TaskQuery {
    pub fn offset(&self) -> i64 {
        self.skip.unwrap_or(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(MAX_PAGE_SIZE)
    }
}

impl Task {
    /// Creates a new, not yet completed `Task` owned by `owner_id`.
    pub fn new(input: TaskInput, owner_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: input.title,
            description: input.description,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields present in `patch` and bumps `updated_at`.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let input = TaskInput {
            title: "Test Task".to_string(),
            description: Some("Test Description".to_string()),
        };

        let task = Task::new(input, 1);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.owner_id, 1);
        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_apply_patch_keeps_absent_fields() {
        let mut task = Task::new(
            TaskInput {
                title: "Original".to_string(),
                description: Some("Description".to_string()),
            },
            1,
        );

        task.apply(TaskPatch {
            title: Some("Updated".to_string()),
            ..TaskPatch::default()
        });
        assert_eq!(task.title, "Updated");
        assert_eq!(task.description.as_deref(), Some("Description"));
        assert!(!task.completed);

        task.apply(TaskPatch {
            completed: Some(true),
            ..TaskPatch::default()
        });
        assert!(task.completed);
        assert_eq!(task.title, "Updated");
    }

    #[test]
    fn test_apply_patch_clears_description() {
        let mut task = Task::new(
            TaskInput {
                title: "Original".to_string(),
                description: Some("Description".to_string()),
            },
            1,
        );

        task.apply(TaskPatch {
            description: Some(None),
            ..TaskPatch::default()
        });
        assert_eq!(task.description, None);
        assert_eq!(task.title, "Original");
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let absent: TaskPatch = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert_eq!(absent.description, None);

        let null: TaskPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(null.description, Some(None));

        let set: TaskPatch = serde_json::from_str(r#"{"description": "new"}"#).unwrap();
        assert_eq!(set.description, Some(Some("new".to_string())));
    }

    #[test]
    fn test_task_input_validation() {
        let valid = TaskInput {
            title: "Valid Task".to_string(),
            description: None,
        };
        assert!(valid.validate().is_ok());

        let empty_title = TaskInput {
            title: "".to_string(),
            description: None,
        };
        assert!(empty_title.validate().is_err());

        let long_title = TaskInput {
            title: "a".repeat(201),
            description: None,
        };
        assert!(long_title.validate().is_err());

        let long_description = TaskInput {
            title: "Valid".to_string(),
            description: Some("b".repeat(1001)),
        };
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_task_patch_validation() {
        assert!(TaskPatch::default().validate().is_ok());

        let empty_title = TaskPatch {
            title: Some(String::new()),
            ..TaskPatch::default()
        };
        assert!(empty_title.validate().is_err());

        let long_description = TaskPatch {
            description: Some(Some("b".repeat(1001))),
            ..TaskPatch::default()
        };
        assert!(long_description.validate().is_err());

        let cleared = TaskPatch {
            description: Some(None),
            ..TaskPatch::default()
        };
        assert!(cleared.validate().is_ok());
    }

    #[test]
    fn test_task_query_defaults_and_bounds() {
        let query = TaskQuery::default();
        assert_eq!(query.offset(), 0);
        assert_eq!(query.limit(), MAX_PAGE_SIZE);
        assert!(query.validate().is_ok());

        let too_large = TaskQuery {
            skip: None,
            limit: Some(101),
        };
        assert!(too_large.validate().is_err());

        let negative_skip = TaskQuery {
            skip: Some(-1),
            limit: None,
        };
        assert!(negative_skip.validate().is_err());
    }
}
