//! Stored document DTOs.

use serde::{Deserialize, Serialize};

/// A message as persisted in the `chat` collection (the id is the storage key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDocument {
    pub tag: String,
    pub content: String,
    pub ts: i64,
}

/// The single tag list document in the `tags` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagListDocument {
    pub tags: Vec<String>,
}
