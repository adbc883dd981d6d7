//! FreeDictionary (dictionaryapi.dev) HTTP client.
//!
//! There is no search endpoint: the term itself is the only candidate and
//! its detail id, so `search` never touches the network.

use async_trait::async_trait;
use std::sync::Arc;

use lexicon_core::{normalize_text, ProviderSource, RawResponseStore};

use super::adapter::FreeDictionaryAdapter;
use crate::config::ProviderEndpoint;
use crate::error::ProviderError;
use crate::http::{endpoint_url, CachedHttpClient, HttpTransport};
use crate::providers::{DictionaryProvider, SearchCandidate, WordAdapter};

pub struct FreeDictionaryClient {
    http: CachedHttpClient,
    base_url: String,
    adapter: FreeDictionaryAdapter,
}

impl FreeDictionaryClient {
    pub fn new(
        endpoint: &ProviderEndpoint,
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn RawResponseStore>,
    ) -> Self {
        Self {
            http: CachedHttpClient::new(ProviderSource::FreeDictionary, transport, cache),
            base_url: endpoint.base_url.clone(),
            adapter: FreeDictionaryAdapter,
        }
    }
}

#[async_trait]
impl DictionaryProvider for FreeDictionaryClient {
    fn source(&self) -> ProviderSource {
        ProviderSource::FreeDictionary
    }

    fn source_name(&self) -> &'static str {
        "Free Dictionary API"
    }

    fn languages(&self) -> &[&'static str] {
        &["en"]
    }

    async fn search(
        &self,
        term: &str,
        _language: &str,
    ) -> Result<Vec<SearchCandidate>, ProviderError> {
        let identifier = normalize_text(term);
        if identifier.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![SearchCandidate::new(term.trim(), vec![identifier])])
    }

    async fn definition(
        &self,
        detail_id: &str,
        language: &str,
    ) -> Result<Option<String>, ProviderError> {
        let url = endpoint_url(&self.base_url, &["entries", language, detail_id], &[])?;
        self.http.definition(detail_id, url.as_str()).await
    }

    fn adapter(&self) -> &dyn WordAdapter {
        &self.adapter
    }
}
