//! Route handlers. Each one validates its input, runs one guarded storage
//! call and re-reads the affected todo before answering.

use axum::{
    extract::{FromRequest, FromRequestParts, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::error::{AppError, TODO_NOT_FOUND};
use crate::models::{MessageResponse, Todo, TodoInput, TodoWithUpdates, UpdateInput};
use crate::storage::StorageError;
use crate::Storage;

const CANNOT_UPDATE_COMPLETED: &str = "Cannot add updates to completed todos";
const TODO_DELETED: &str = "Todo deleted successfully";

/// JSON body extractor whose rejections render as `{"message": ...}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path extractor whose rejections render as `{"message": ...}`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health(State(storage): State<Storage>) -> Result<Json<HealthResponse>, AppError> {
    storage.ping().await?;
    Ok(Json(HealthResponse { status: "ok" }))
}

pub async fn list_todos(State(storage): State<Storage>) -> Result<Json<Vec<Todo>>, AppError> {
    Ok(Json(storage.list_todos().await?))
}

pub async fn get_todo(
    State(storage): State<Storage>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<TodoWithUpdates>, AppError> {
    Ok(Json(load_with_updates(&storage, id).await?))
}

pub async fn create_todo(
    State(storage): State<Storage>,
    AppJson(input): AppJson<TodoInput>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let fields = input.into_fields()?;
    let todo = storage.create_todo(&fields).await?;
    info!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(storage): State<Storage>,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<TodoInput>,
) -> Result<Json<Todo>, AppError> {
    let fields = input.into_fields()?;
    let todo = storage
        .update_todo(id, &fields)
        .await
        .map_err(AppError::guarded)?;
    info!(id, "updated todo");
    Ok(Json(todo))
}

pub async fn delete_todo(
    State(storage): State<Storage>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    storage.delete_todo(id).await.map_err(AppError::guarded)?;
    info!(id, "deleted todo");
    Ok(Json(MessageResponse::new(TODO_DELETED)))
}

pub async fn complete_todo(
    State(storage): State<Storage>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<TodoWithUpdates>, AppError> {
    let todo = storage.complete_todo(id).await.map_err(AppError::guarded)?;
    info!(id, "completed todo");
    let updates = storage.list_updates(id).await?;
    Ok(Json(TodoWithUpdates { todo, updates }))
}

pub async fn add_update(
    State(storage): State<Storage>,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<UpdateInput>,
) -> Result<Json<TodoWithUpdates>, AppError> {
    let text = input.into_text()?;
    storage.add_update(id, &text).await.map_err(|err| match err {
        StorageError::Completed => AppError::Conflict(CANNOT_UPDATE_COMPLETED.to_string()),
        other => AppError::from(other),
    })?;
    info!(id, "added update to todo");
    Ok(Json(load_with_updates(&storage, id).await?))
}

async fn load_with_updates(storage: &Storage, id: i64) -> Result<TodoWithUpdates, AppError> {
    let todo = storage
        .get_todo(id)
        .await?
        .ok_or_else(|| AppError::NotFound(TODO_NOT_FOUND.to_string()))?;
    let updates = storage.list_updates(id).await?;
    Ok(TodoWithUpdates { todo, updates })
}
