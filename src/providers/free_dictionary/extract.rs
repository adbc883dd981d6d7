use serde::Deserialize;
use serde_json::Value;

use lexicon_core::ProviderSource;

use super::types::{headword, FdResponse};
use crate::backfill::{DerivedFieldExtractor, DerivedFields};
use crate::providers::normalize::clean;

/// FreeDictionary carries none of the derived fields; every payload yields
/// an empty set and the pipeline reports it as skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeDictionaryExtractor;

impl DerivedFieldExtractor for FreeDictionaryExtractor {
    fn provider(&self) -> ProviderSource {
        ProviderSource::FreeDictionary
    }

    fn headword(&self, payload: &Value) -> Result<Option<String>, serde_json::Error> {
        let entries = FdResponse::deserialize(payload)?;
        Ok(clean(headword(&entries)))
    }

    fn extract(&self, payload: &Value) -> Result<DerivedFields, serde_json::Error> {
        FdResponse::deserialize(payload)?;
        Ok(DerivedFields::default())
    }
}
