use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use super::{now, StorageError, StorageResult, TodoStorage};
use crate::models::{timestamp, Todo, TodoFields, TodoUpdate};

const CREATE_TODOS: &str = r#"
    CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        completed INTEGER NOT NULL DEFAULT 0,
        completed_at TEXT NULL
    )
"#;

const CREATE_TODO_UPDATES: &str = r#"
    CREATE TABLE IF NOT EXISTS todo_updates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        todo_id INTEGER NOT NULL REFERENCES todos(id) ON DELETE CASCADE,
        update_text TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
"#;

const CREATE_TODO_UPDATES_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_todo_updates_todo_id ON todo_updates(todo_id)";

/// SQLite implementation of `TodoStorage`.
///
/// Timestamps are stored as fixed-width `YYYY-MM-DDTHH:MM:SS.mmmZ` text, so
/// ordering by the column is chronological.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub async fn new(url: &str, max_connections: u32) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives only as long as its connection.
        let pool = if url.contains(":memory:") || url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(options)
                .await?
        };

        debug!(url, "sqlite pool ready");
        Ok(Self { pool })
    }

    /// A private database that disappears when the storage is dropped.
    pub async fn in_memory() -> StorageResult<Self> {
        Self::new("sqlite::memory:", 1).await
    }

    async fn add_missing_columns(&self) -> StorageResult<()> {
        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('todos')")
                .fetch_all(&self.pool)
                .await?;

        if !columns.iter().any(|c| c == "completed") {
            info!("adding todos.completed column");
            sqlx::query("ALTER TABLE todos ADD COLUMN completed INTEGER NOT NULL DEFAULT 0")
                .execute(&self.pool)
                .await?;
        }
        if !columns.iter().any(|c| c == "completed_at") {
            info!("adding todos.completed_at column");
            sqlx::query("ALTER TABLE todos ADD COLUMN completed_at TEXT NULL")
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    fn row_to_todo(row: &SqliteRow) -> StorageResult<Todo> {
        let description: Option<String> = row.try_get("description")?;
        let created_at: String = row.try_get("created_at")?;
        let completed_at: Option<String> = row.try_get("completed_at")?;

        Ok(Todo {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: description.unwrap_or_default(),
            created_at: parse_timestamp(&created_at)?,
            completed: row.try_get("completed")?,
            completed_at: completed_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }

    fn row_to_update(row: &SqliteRow) -> StorageResult<TodoUpdate> {
        let created_at: String = row.try_get("created_at")?;
        Ok(TodoUpdate {
            id: row.try_get("id")?,
            text: row.try_get("update_text")?,
            date: parse_timestamp(&created_at)?,
        })
    }

    async fn fetch_existing(&self, id: i64) -> StorageResult<Todo> {
        self.get_todo(id).await?.ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl TodoStorage for SqliteStorage {
    async fn initialize(&self) -> StorageResult<()> {
        sqlx::query(CREATE_TODOS).execute(&self.pool).await?;
        self.add_missing_columns().await?;
        sqlx::query(CREATE_TODO_UPDATES).execute(&self.pool).await?;
        sqlx::query(CREATE_TODO_UPDATES_INDEX)
            .execute(&self.pool)
            .await?;
        info!("sqlite schema ready");
        Ok(())
    }

    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_todos(&self) -> StorageResult<Vec<Todo>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, created_at, completed, completed_at
            FROM todos
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_todo).collect()
    }

    async fn get_todo(&self, id: i64) -> StorageResult<Option<Todo>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, created_at, completed, completed_at
            FROM todos
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_todo).transpose()
    }

    async fn list_updates(&self, todo_id: i64) -> StorageResult<Vec<TodoUpdate>> {
        let rows = sqlx::query(
            r#"
            SELECT id, update_text, created_at
            FROM todo_updates
            WHERE todo_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(todo_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_update).collect()
    }

    async fn create_todo(&self, fields: &TodoFields) -> StorageResult<Todo> {
        let result = sqlx::query(
            "INSERT INTO todos (title, description, created_at, completed) VALUES (?, ?, ?, ?)",
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(timestamp::format(&now()))
        .bind(false)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, "inserted todo");
        self.fetch_existing(id).await
    }

    async fn update_todo(&self, id: i64, fields: &TodoFields) -> StorageResult<Todo> {
        let result = sqlx::query(
            "UPDATE todos SET title = ?, description = ? WHERE id = ? AND completed = ?",
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(id)
        .bind(false)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        self.fetch_existing(id).await
    }

    async fn delete_todo(&self, id: i64) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND completed = ?")
            .bind(id)
            .bind(false)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn complete_todo(&self, id: i64) -> StorageResult<Todo> {
        let result = sqlx::query(
            "UPDATE todos SET completed = ?, completed_at = ? WHERE id = ? AND completed = ?",
        )
        .bind(true)
        .bind(timestamp::format(&now()))
        .bind(id)
        .bind(false)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        self.fetch_existing(id).await
    }

    async fn add_update(&self, todo_id: i64, text: &str) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO todo_updates (todo_id, update_text, created_at)
            SELECT id, ?, ? FROM todos WHERE id = ? AND completed = ?
            "#,
        )
        .bind(text)
        .bind(timestamp::format(&now()))
        .bind(todo_id)
        .bind(false)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get_todo(todo_id).await? {
                Some(_) => Err(StorageError::Completed),
                None => Err(StorageError::NotFound),
            };
        }
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Accepts the stored RFC 3339 form and SQLite's `CURRENT_TIMESTAMP` form.
fn parse_timestamp(raw: &str) -> StorageResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| StorageError::Database(format!("Invalid timestamp: {raw}")))
}
