use serde::Deserialize;
use serde_json::Value;

use lexicon_core::ProviderSource;

use super::adapter::{inflections, word_family};
use super::types::OxEntryResponse;
use crate::backfill::{DerivedFieldExtractor, DerivedFields};
use crate::providers::normalize::clean;

/// Oxford has no frequency data; word family comes from `derivatives`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxfordExtractor;

impl DerivedFieldExtractor for OxfordExtractor {
    fn provider(&self) -> ProviderSource {
        ProviderSource::Oxford
    }

    fn headword(&self, payload: &Value) -> Result<Option<String>, serde_json::Error> {
        let response = OxEntryResponse::deserialize(payload)?;
        Ok(clean(response.headword()))
    }

    fn extract(&self, payload: &Value) -> Result<DerivedFields, serde_json::Error> {
        let response = OxEntryResponse::deserialize(payload)?;
        Ok(DerivedFields {
            word_family: word_family(&response),
            inflections: inflections(&response),
            frequency_rank: None,
            frequency_count: None,
        })
    }
}
