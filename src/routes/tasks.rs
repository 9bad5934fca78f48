use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{TaskInput, TaskPatch, TaskQuery},
    state::AppState,
    tasks::TaskFlow,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Retrieves the authenticated user's tasks, oldest first.
///
/// ## Query Parameters:
/// - `skip` (optional): number of tasks to skip, default 0.
/// - `limit` (optional): page size between 1 and 100, default 100.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `401 Unauthorized`: missing or invalid token.
/// - `422 Unprocessable Entity`: invalid pagination parameters.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query_params: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    query_params.validate()?;

    let tasks = TaskFlow::for_owner(state.tasks.as_ref(), &user.0)
        .list(&query_params)
        .await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: 1 to 200 characters (required).
/// - `description` (optional): at most 1000 characters.
///
/// ## Responses:
/// - `201 Created`: the new `Task`, with `completed: false`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `422 Unprocessable Entity`: validation failure.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = TaskFlow::for_owner(state.tasks.as_ref(), &user.0)
        .create(task_data.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = TaskFlow::for_owner(state.tasks.as_ref(), &user.0)
        .get(task_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Updates an existing task. Only the fields present in the body change.
///
/// ## Request Body:
/// Any of `title`, `description`, `completed`.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: no such task, or it belongs to another user.
/// - `422 Unprocessable Entity`: validation failure.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = TaskFlow::for_owner(state.tasks.as_ref(), &user.0)
        .update(task_id.into_inner(), task_data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Task deleted successfully"}`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    TaskFlow::for_owner(state.tasks.as_ref(), &user.0)
        .delete(task_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted successfully" })))
}
