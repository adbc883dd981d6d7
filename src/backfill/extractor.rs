//! Per-provider extraction of derived word fields from cached payloads.

use serde_json::Value;
use std::collections::HashMap;

use lexicon_core::{ProviderSource, WordFamily};

use crate::providers::{AzVocabExtractor, FreeDictionaryExtractor, OxfordExtractor};

/// Word-level fields a backfill can fill in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedFields {
    pub word_family: Option<WordFamily>,
    pub inflections: Option<Vec<String>>,
    pub frequency_rank: Option<i32>,
    pub frequency_count: Option<i64>,
}

impl DerivedFields {
    pub fn is_empty(&self) -> bool {
        self.word_family.is_none()
            && self.inflections.is_none()
            && self.frequency_rank.is_none()
            && self.frequency_count.is_none()
    }
}

/// Reads one provider's detail payload.
///
/// Errors mean the payload does not have the provider's shape at all.
pub trait DerivedFieldExtractor: Send + Sync {
    fn provider(&self) -> ProviderSource;

    /// Headword the payload describes, used to find the target word.
    fn headword(&self, payload: &Value) -> Result<Option<String>, serde_json::Error>;

    fn extract(&self, payload: &Value) -> Result<DerivedFields, serde_json::Error>;
}

/// Extractors keyed by provider.
pub struct ExtractorRegistry {
    extractors: HashMap<ProviderSource, Box<dyn DerivedFieldExtractor>>,
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// One extractor for every supported provider.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(AzVocabExtractor));
        registry.register(Box::new(OxfordExtractor));
        registry.register(Box::new(FreeDictionaryExtractor));
        registry
    }

    pub fn register(&mut self, extractor: Box<dyn DerivedFieldExtractor>) {
        self.extractors.insert(extractor.provider(), extractor);
    }

    /// Extractor for a stored provider name, if the provider is still known.
    pub fn get(&self, provider: &str) -> Option<&dyn DerivedFieldExtractor> {
        let source: ProviderSource = provider.parse().ok()?;
        self.extractors.get(&source).map(|e| e.as_ref())
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
