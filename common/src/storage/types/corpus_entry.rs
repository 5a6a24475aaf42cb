use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{deserialize_datetime, deserialize_flexible_id, serialize_datetime, StoredObject};

/// A document in the retrieval corpus. Entries are append-only: the service
/// never mutates or deletes them once stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusEntry {
    #[serde(deserialize_with = "deserialize_flexible_id")]
    pub id: String,
    #[serde(
        serialize_with = "serialize_datetime",
        deserialize_with = "deserialize_datetime",
        default
    )]
    pub created_at: DateTime<Utc>,
    #[serde(
        serialize_with = "serialize_datetime",
        deserialize_with = "deserialize_datetime",
        default
    )]
    pub updated_at: DateTime<Utc>,
    pub text: String,
    pub embedding: Vec<f32>,
}

impl StoredObject for CorpusEntry {
    fn table_name() -> &'static str {
        "corpus_entry"
    }

    fn get_id(&self) -> &str {
        &self.id
    }
}

impl CorpusEntry {
    pub fn new(text: String, embedding: Vec<f32>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            text,
            embedding,
        }
    }
}
