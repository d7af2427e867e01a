use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use todo_core::{NewTodo, Todo, TodoPatch};

use crate::{error::AppError, store::TodoStore, AppState};

/// Body of every successful write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

impl Message {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
}

async fn list_todos(State(store): State<TodoStore>) -> Result<Json<Vec<Todo>>, AppError> {
    Ok(Json(store.list().await?))
}

async fn get_todo(
    State(store): State<TodoStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Todo>, AppError> {
    let Path(id) = id?;
    Ok(Json(store.get(id).await?))
}

/// Replies with a message rather than the created record.
async fn create_todo(
    State(store): State<TodoStore>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let Json(input) = payload?;
    let todo = store.create(input).await?;
    tracing::info!(id = todo.id, "todo created");
    Ok((StatusCode::CREATED, Message::new("Todo added successfully")))
}

async fn update_todo(
    State(store): State<TodoStore>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TodoPatch>, JsonRejection>,
) -> Result<Json<Message>, AppError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    store.update(id, patch).await?;
    tracing::info!(id, "todo updated");
    Ok(Message::new("Todo updated successfully"))
}

async fn delete_todo(
    State(store): State<TodoStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Message>, AppError> {
    let Path(id) = id?;
    store.delete(id).await?;
    tracing::info!(id, "todo deleted");
    Ok(Message::new("Todo deleted successfully"))
}
