//! Dictionary providers.
//!
//! Each provider bundles three things:
//!
//! - a client that speaks the provider's HTTP API through the cache-aside
//!   `CachedHttpClient`
//! - an adapter that turns one raw detail payload into a `Word`
//! - a backfill extractor that re-derives word-level fields from a cached
//!   payload without calling the provider again

pub mod azvocab;
pub mod free_dictionary;
pub mod normalize;
pub mod oxford;

pub use azvocab::{AzVocabAdapter, AzVocabClient, AzVocabExtractor};
pub use free_dictionary::{FreeDictionaryAdapter, FreeDictionaryClient, FreeDictionaryExtractor};
pub use oxford::{OxfordAdapter, OxfordClient, OxfordExtractor};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lexicon_core::{ProviderSource, Word};

use crate::error::ProviderError;

// =============================================================================
// Result Types
// =============================================================================

/// One headword returned by a provider search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Headword as spelled by the provider
    pub headword: String,
    /// Provider ids of the detail entries behind this headword
    pub detail_ids: Vec<String>,
}

impl SearchCandidate {
    pub fn new(headword: impl Into<String>, detail_ids: Vec<String>) -> Self {
        Self {
            headword: headword.into(),
            detail_ids,
        }
    }
}

// =============================================================================
// Trait Definitions
// =============================================================================

/// Converts one raw detail payload into a transient `Word`.
///
/// Returns `None` when the payload has no headword or cannot be read at all.
/// Missing optional fields and absent arrays are tolerated.
pub trait WordAdapter: Send + Sync {
    fn to_word_aggregate(&self, raw: &str, language: &str) -> Option<Word>;
}

/// A pluggable external dictionary.
///
/// Not-found is never an error: `search` returns an empty list and
/// `definition` returns `None`.
#[async_trait]
pub trait DictionaryProvider: Send + Sync {
    fn source(&self) -> ProviderSource;

    /// Human-readable name (e.g., "Oxford Dictionaries")
    fn source_name(&self) -> &'static str;

    /// Language codes this provider serves
    fn languages(&self) -> &[&'static str];

    fn supports_language(&self, language: &str) -> bool {
        self.languages()
            .iter()
            .any(|l| l.eq_ignore_ascii_case(language))
    }

    async fn search(
        &self,
        term: &str,
        language: &str,
    ) -> Result<Vec<SearchCandidate>, ProviderError>;

    /// Raw payload of one detail entry.
    async fn definition(
        &self,
        detail_id: &str,
        language: &str,
    ) -> Result<Option<String>, ProviderError>;

    fn adapter(&self) -> &dyn WordAdapter;

    fn to_word_aggregate(&self, raw: &str, language: &str) -> Option<Word> {
        self.adapter().to_word_aggregate(raw, language)
    }
}
