use serde::Deserialize;
use serde_json::Value;

use lexicon_core::ProviderSource;

use super::types::AzEntry;
use crate::backfill::{DerivedFieldExtractor, DerivedFields};
use crate::providers::normalize::{clean, clean_list};

/// AzVocab entries carry all four derived fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct AzVocabExtractor;

impl DerivedFieldExtractor for AzVocabExtractor {
    fn provider(&self) -> ProviderSource {
        ProviderSource::AzVocab
    }

    fn headword(&self, payload: &Value) -> Result<Option<String>, serde_json::Error> {
        let entry = AzEntry::deserialize(payload)?;
        Ok(clean(entry.headword.as_deref()))
    }

    fn extract(&self, payload: &Value) -> Result<DerivedFields, serde_json::Error> {
        let entry = AzEntry::deserialize(payload)?;
        Ok(DerivedFields {
            word_family: entry.word_family.map(|family| {
                family
                    .into_iter()
                    .map(|(pos, forms)| (pos, clean_list(forms)))
                    .filter(|(_, forms)| !forms.is_empty())
                    .collect()
            }),
            inflections: entry.inflections.map(clean_list).filter(|v| !v.is_empty()),
            frequency_rank: entry.rank,
            frequency_count: entry.frequency,
        })
    }
}
