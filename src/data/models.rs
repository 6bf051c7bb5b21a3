//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// An outstanding task item
///
/// Owned by the data store; the page only ever reads a snapshot
/// of these at render time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: String,
    /// Task text shown on the page
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// An authenticated visitor
///
/// Built per request from the session credential. Never persisted;
/// dropped when the response is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Display name from the identity provider
    pub name: String,
    /// Opaque provider-issued subject identifier
    pub identifier: String,
}
