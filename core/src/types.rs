//! Domain DTOs for the todo API.
//!
//! These mirror the server's JSON but are defined independently so the
//! client carries no database or web-framework dependencies.

use serde::{Deserialize, Serialize};

/// A single todo item as returned by list, create and update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub completed: bool,
    pub completed_at: Option<String>,
}

/// A note attached to a todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoUpdate {
    pub id: i64,
    pub text: String,
    pub date: String,
}

/// A todo with its notes, newest first. Returned by get, complete and
/// add-update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoDetail {
    #[serde(flatten)]
    pub todo: Todo,
    #[serde(default)]
    pub updates: Vec<TodoUpdate>,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request payload for replacing a todo's title and description. An omitted
/// description is stored as empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request payload for attaching a note to a todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddUpdate {
    pub update: String,
}

/// `{"message": ...}` body used for errors and delete confirmations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MessageBody {
    pub message: String,
}
