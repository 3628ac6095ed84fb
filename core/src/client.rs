//! Stateless HTTP request builder and response parser for the todo API.
//!
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AddUpdate, CreateTodo, MessageBody, Todo, TodoDetail, UpdateTodo};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        self.empty(HttpMethod::Get, "/todos".to_string())
    }

    pub fn build_get_todo(&self, id: i64) -> HttpRequest {
        self.empty(HttpMethod::Get, format!("/todos/{id}"))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, "/todos".to_string(), input)
    }

    pub fn build_update_todo(&self, id: i64, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Put, format!("/todos/{id}"), input)
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        self.empty(HttpMethod::Delete, format!("/todos/{id}"))
    }

    pub fn build_complete_todo(&self, id: i64) -> HttpRequest {
        self.empty(HttpMethod::Patch, format!("/todos/{id}/complete"))
    }

    pub fn build_add_update(&self, id: i64, input: &AddUpdate) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, format!("/todos/{id}/updates"), input)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<TodoDetail, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response, 201)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response, 200)
    }

    /// Returns the server's confirmation message.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<String, ApiError> {
        let body: MessageBody = parse_json(response, 200)?;
        Ok(body.message)
    }

    pub fn parse_complete_todo(&self, response: HttpResponse) -> Result<TodoDetail, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_add_update(&self, response: HttpResponse) -> Result<TodoDetail, ApiError> {
        parse_json(response, 200)
    }

    fn empty(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_json<T: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse, expected: u16) -> Result<T, ApiError> {
    check_status(&response, expected)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    match response.status {
        404 => Err(ApiError::NotFound {
            message: error_message(&response.body),
        }),
        400 => Err(ApiError::BadRequest {
            message: error_message(&response.body),
        }),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

/// The `message` field of an error body, or the raw body when it has none.
fn error_message(body: &str) -> String {
    serde_json::from_str::<MessageBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.to_string())
}
