//! Row types for the `lexicon` schema.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use lexicon_core::{CachedRawResponse, EndpointType, SenseRelations, WordFamily};

use crate::persistence::entity::{ExampleEntity, PronunciationEntity, SenseEntity, WordEntity};

#[derive(Debug, FromRow)]
pub(super) struct WordRow {
    pub id: Uuid,
    pub text: String,
    pub normalized_text: String,
    pub language: String,
    pub source: String,
    pub frequency_rank: Option<i32>,
    pub frequency_count: Option<i64>,
    pub inflections: Option<Json<Vec<String>>>,
    pub word_family: Option<Json<WordFamily>>,
    pub provenance: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub(super) struct PronunciationRow {
    pub id: Uuid,
    pub ipa: Option<String>,
    pub audio_url: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, FromRow)]
pub(super) struct SenseRow {
    pub id: Uuid,
    pub part_of_speech: String,
    pub definition: String,
    pub short_definition: Option<String>,
    pub localized_definition: Option<String>,
    pub sense_index: i32,
    pub source: String,
    pub cefr_level: Option<String>,
    pub relations: Json<SenseRelations>,
    pub external_id: Option<String>,
}

#[derive(Debug, FromRow)]
pub(super) struct ExampleRow {
    pub id: Uuid,
    pub sense_id: Uuid,
    pub text: String,
    pub translation: Option<String>,
    pub display_order: i32,
    pub external_id: Option<String>,
}

impl WordRow {
    /// Assemble the full graph from the word row and its child rows.
    pub fn into_entity(
        self,
        pronunciations: Vec<PronunciationRow>,
        senses: Vec<SenseRow>,
        examples: Vec<ExampleRow>,
    ) -> WordEntity {
        let senses = senses
            .into_iter()
            .map(|s| {
                let examples = examples
                    .iter()
                    .filter(|e| e.sense_id == s.id)
                    .map(|e| ExampleEntity {
                        id: e.id,
                        text: e.text.clone(),
                        translation: e.translation.clone(),
                        display_order: e.display_order,
                        external_id: e.external_id.clone(),
                    })
                    .collect();
                SenseEntity {
                    id: s.id,
                    part_of_speech: s.part_of_speech,
                    definition: s.definition,
                    short_definition: s.short_definition,
                    localized_definition: s.localized_definition,
                    sense_index: s.sense_index,
                    source: s.source,
                    cefr_level: s.cefr_level,
                    relations: s.relations.0,
                    external_id: s.external_id,
                    examples,
                }
            })
            .collect();

        WordEntity {
            id: self.id,
            text: self.text,
            normalized_text: self.normalized_text,
            language: self.language,
            source: self.source,
            frequency_rank: self.frequency_rank,
            frequency_count: self.frequency_count,
            inflections: self.inflections.map(|j| j.0),
            word_family: self.word_family.map(|j| j.0),
            provenance: self.provenance,
            pronunciations: pronunciations
                .into_iter()
                .map(|p| PronunciationEntity {
                    id: p.id,
                    ipa: p.ipa,
                    audio_url: p.audio_url,
                    region: p.region,
                })
                .collect(),
            senses,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct RawResponseRow {
    pub id: Uuid,
    pub provider: String,
    pub endpoint_type: String,
    pub request_identifier: String,
    pub raw_response: String,
    pub response_size_bytes: i64,
    pub status_code: i32,
    pub latency_ms: i64,
    pub fetched_at: DateTime<Utc>,
}

impl TryFrom<RawResponseRow> for CachedRawResponse {
    type Error = anyhow::Error;

    fn try_from(row: RawResponseRow) -> Result<Self, Self::Error> {
        let endpoint_type: EndpointType = row.endpoint_type.parse()?;
        let status_code = u16::try_from(row.status_code)
            .map_err(|_| anyhow::anyhow!("invalid status code {}", row.status_code))?;
        Ok(CachedRawResponse {
            id: row.id,
            provider: row.provider,
            endpoint_type,
            request_identifier: row.request_identifier,
            raw_response: row.raw_response,
            response_size_bytes: row.response_size_bytes,
            status_code,
            latency_ms: row.latency_ms,
            fetched_at: row.fetched_at,
        })
    }
}
