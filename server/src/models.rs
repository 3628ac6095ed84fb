//! Wire and domain types for the todo service.
//!
//! Timestamps leave the service as UTC ISO-8601 strings with millisecond
//! precision (`2024-05-01T10:20:30.123Z`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const UPDATE_TEXT_REQUIRED: &str = "Update text is required";

/// A single todo row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub completed: bool,
    #[serde(with = "timestamp::option")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A note attached to a todo, serialized as `{id, text, date}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoUpdate {
    pub id: i64,
    pub text: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
}

/// A todo together with its notes, newest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoWithUpdates {
    #[serde(flatten)]
    pub todo: Todo,
    pub updates: Vec<TodoUpdate>,
}

/// Body of `POST /todos` and `PUT /todos/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct TodoInput {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Validated title and description, ready to be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoFields {
    pub title: String,
    pub description: String,
}

impl TodoInput {
    pub fn into_fields(self) -> Result<TodoFields, AppError> {
        let title = self
            .title
            .filter(|title| !title.trim().is_empty())
            .ok_or_else(|| AppError::Validation(TITLE_REQUIRED.to_string()))?;
        Ok(TodoFields {
            title,
            description: self.description.unwrap_or_default(),
        })
    }
}

/// Body of `POST /todos/{id}/updates`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateInput {
    pub update: Option<String>,
}

impl UpdateInput {
    pub fn into_text(self) -> Result<String, AppError> {
        self.update
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AppError::Validation(UPDATE_TEXT_REQUIRED.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Serde adapter for millisecond-precision UTC timestamps.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<DateTime<Utc>>::deserialize(deserializer)
        }
    }
}
