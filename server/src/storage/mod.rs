//! Persistence for todos and their notes.
//!
//! Every write that must respect the completed lock carries a
//! `completed = false` predicate in the same statement, so the check and the
//! mutation are evaluated atomically by the database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::models::{Todo, TodoFields, TodoUpdate};

pub mod mysql;
pub mod sqlite;

pub use mysql::MySqlStorage;
pub use sqlite::SqliteStorage;

#[derive(Error, Debug)]
pub enum StorageError {
    /// No row matched, or a `completed = false` guard excluded it.
    #[error("Todo not found")]
    NotFound,
    #[error("Todo is already completed")]
    Completed,
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Database error: {0}")]
    Database(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait TodoStorage: Send + Sync {
    /// Creates missing tables and columns. Safe to run on every start.
    async fn initialize(&self) -> StorageResult<()>;

    async fn ping(&self) -> StorageResult<()>;

    /// All todos, newest first.
    async fn list_todos(&self) -> StorageResult<Vec<Todo>>;
    async fn get_todo(&self, id: i64) -> StorageResult<Option<Todo>>;
    /// Notes of one todo, newest first.
    async fn list_updates(&self, todo_id: i64) -> StorageResult<Vec<TodoUpdate>>;

    async fn create_todo(&self, fields: &TodoFields) -> StorageResult<Todo>;
    /// Fails with `NotFound` when the todo is missing or completed.
    async fn update_todo(&self, id: i64, fields: &TodoFields) -> StorageResult<Todo>;
    /// Fails with `NotFound` when the todo is missing or completed.
    async fn delete_todo(&self, id: i64) -> StorageResult<()>;
    /// One-way transition. Fails with `NotFound` when missing or already completed.
    async fn complete_todo(&self, id: i64) -> StorageResult<Todo>;
    /// Fails with `NotFound` or `Completed`.
    async fn add_update(&self, todo_id: i64, text: &str) -> StorageResult<()>;

    async fn close(&self);
}

/// Opens the backend selected by `config`.
pub async fn connect(
    config: &DatabaseConfig,
    max_connections: u32,
) -> StorageResult<Arc<dyn TodoStorage>> {
    info!(database = %config.describe(), "connecting to database");
    let storage: Arc<dyn TodoStorage> = match config {
        DatabaseConfig::Sqlite { url } => Arc::new(SqliteStorage::new(url, max_connections).await?),
        DatabaseConfig::MySql { .. } => Arc::new(MySqlStorage::new(config, max_connections).await?),
    };
    Ok(storage)
}

/// Current time at the precision timestamps are stored with.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
