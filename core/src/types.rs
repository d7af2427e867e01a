//! Domain DTOs for the todo service.
//!
//! # Design
//! `Todo` is the full record as both API surfaces return it. `NewTodo` is the
//! creation payload: `title`, `description` and `time` must be present as
//! keys (the latter two may be `null`) while `images` may be left out.
//! `TodoPatch` keeps every field tri-state so a partial update can tell an
//! absent key (keep the stored value) from an explicit `null` (clear it).

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// A single todo record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub time: Option<NaiveDateTime>,
    /// Opaque reference to image data, usually a file path. Never checked.
    pub images: Option<String>,
}

/// Payload for creating a todo. The store assigns the `id`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    #[serde(deserialize_with = "required_nullable")]
    pub description: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub time: Option<NaiveDateTime>,
    #[serde(default)]
    pub images: Option<String>,
}

impl NewTodo {
    /// A todo with only a title; every optional field is null.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            time: None,
            images: None,
        }
    }
}

/// Partial update. `None` leaves a field alone, `Some(None)` clears it and
/// `Some(Some(v))` replaces it.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TodoPatch {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub time: Option<Option<NaiveDateTime>>,
    #[serde(default, deserialize_with = "present")]
    pub images: Option<Option<String>>,
}

impl TodoPatch {
    /// Reject a patch that would null the title.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if matches!(self.title, Some(None)) {
            return Err(ValidationError::NullField("title"));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.time.is_none()
            && self.images.is_none()
    }
}

/// The key must be present, but its value may be `null`.
fn required_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::deserialize(deserializer)
}

/// Only called when the key is present, so wrap whatever it holds in `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::deserialize(deserializer).map(Some)
}
