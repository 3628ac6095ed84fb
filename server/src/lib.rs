//! HTTP service for a todo list backed by a relational database.
//!
//! The storage handle is built by the caller and injected into the router,
//! so tests can run the same routes against an in-memory SQLite database.

use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod storage;

pub use error::AppError;
pub use models::{Todo, TodoUpdate, TodoWithUpdates};
pub use storage::{SqliteStorage, StorageError, TodoStorage};

pub type Storage = Arc<dyn TodoStorage>;

pub fn app(storage: Storage) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/{id}",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .route("/todos/{id}/complete", patch(handlers::complete_todo))
        .route("/todos/{id}/updates", post(handlers::add_update))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(storage)
}

pub async fn run(listener: TcpListener, storage: Storage) -> Result<(), std::io::Error> {
    serve_until(listener, storage, std::future::pending()).await
}

/// Serves until `shutdown` resolves, then drains in-flight requests.
pub async fn serve_until<F>(
    listener: TcpListener,
    storage: Storage,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(storage))
        .with_graceful_shutdown(shutdown)
        .await
}
