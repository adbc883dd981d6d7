//! AzVocab HTTP client.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use lexicon_core::{normalize_text, EndpointType, ProviderSource, RawResponseStore};

use super::adapter::AzVocabAdapter;
use super::types::AzSearchResponse;
use crate::config::ProviderEndpoint;
use crate::error::ProviderError;
use crate::http::{endpoint_url, CachedHttpClient, HttpTransport};
use crate::providers::normalize::clean;
use crate::providers::{DictionaryProvider, SearchCandidate, WordAdapter};

pub struct AzVocabClient {
    http: CachedHttpClient,
    base_url: String,
    adapter: AzVocabAdapter,
}

impl AzVocabClient {
    pub fn new(
        endpoint: &ProviderEndpoint,
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn RawResponseStore>,
    ) -> Self {
        let mut http = CachedHttpClient::new(ProviderSource::AzVocab, transport, cache);
        if let Some(key) = &endpoint.api_key {
            http = http.with_header("X-Api-Key", key.clone());
        }
        Self {
            http,
            base_url: endpoint.base_url.clone(),
            adapter: AzVocabAdapter,
        }
    }
}

#[async_trait]
impl DictionaryProvider for AzVocabClient {
    fn source(&self) -> ProviderSource {
        ProviderSource::AzVocab
    }

    fn source_name(&self) -> &'static str {
        "AzVocab English-Vietnamese"
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
        let url = endpoint_url(&self.base_url, &["search"], &[("q", identifier.as_str())])?;

        let response: Option<AzSearchResponse> = self
            .http
            .fetch_json(EndpointType::Search, &identifier, url.as_str())
            .await?;
        let candidates: Vec<SearchCandidate> = response
            .map(|r| r.data)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|hit| {
                let headword = clean(hit.headword.as_deref())?;
                let ids: Vec<String> = hit
                    .entry_ids
                    .into_iter()
                    .filter(|id| !id.trim().is_empty())
                    .collect();
                (!ids.is_empty()).then(|| SearchCandidate::new(headword, ids))
            })
            .collect();

        debug!(term = %identifier, count = candidates.len(), "AzVocab search");
        Ok(candidates)
    }

    async fn definition(
        &self,
        detail_id: &str,
        _language: &str,
    ) -> Result<Option<String>, ProviderError> {
        let url = endpoint_url(&self.base_url, &["entries", detail_id], &[])?;
        self.http.definition(detail_id, url.as_str()).await
    }

    fn adapter(&self) -> &dyn WordAdapter {
        &self.adapter
    }
}
