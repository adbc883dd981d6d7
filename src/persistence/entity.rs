//! Persisted entity graph.
//!
//! A plain mirror of the stored rows. Calling code never sees these: the
//! repositories hand out `Word` aggregates and go through the mapper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lexicon_core::{SenseRelations, WordFamily};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntity {
    pub id: Uuid,
    pub text: String,
    pub normalized_text: String,
    pub language: String,
    pub source: String,
    pub frequency_rank: Option<i32>,
    pub frequency_count: Option<i64>,
    pub inflections: Option<Vec<String>>,
    pub word_family: Option<WordFamily>,
    pub provenance: Option<String>,
    pub pronunciations: Vec<PronunciationEntity>,
    pub senses: Vec<SenseEntity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WordEntity {
    pub fn sense(&self, id: Uuid) -> Option<&SenseEntity> {
        self.senses.iter().find(|s| s.id == id)
    }

    pub fn example_count(&self) -> usize {
        self.senses.iter().map(|s| s.examples.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronunciationEntity {
    pub id: Uuid,
    pub ipa: Option<String>,
    pub audio_url: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseEntity {
    pub id: Uuid,
    pub part_of_speech: String,
    pub definition: String,
    pub short_definition: Option<String>,
    pub localized_definition: Option<String>,
    pub sense_index: i32,
    pub source: String,
    pub cefr_level: Option<String>,
    /// Stored as one JSONB column
    pub relations: SenseRelations,
    pub external_id: Option<String>,
    pub examples: Vec<ExampleEntity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleEntity {
    pub id: Uuid,
    pub text: String,
    pub translation: Option<String>,
    pub display_order: i32,
    pub external_id: Option<String>,
}
