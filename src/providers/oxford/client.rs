//! Oxford Dictionaries HTTP client.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use lexicon_core::{normalize_text, EndpointType, ProviderSource, RawResponseStore};

use super::adapter::OxfordAdapter;
use super::types::OxSearchResponse;
use crate::config::ProviderEndpoint;
use crate::error::ProviderError;
use crate::http::{endpoint_url, CachedHttpClient, HttpTransport};
use crate::providers::normalize::clean;
use crate::providers::{DictionaryProvider, SearchCandidate, WordAdapter};

pub struct OxfordClient {
    http: CachedHttpClient,
    base_url: String,
    /// Oxford's code for English, e.g. "en-gb" or "en-us"
    english_region: String,
    adapter: OxfordAdapter,
}

impl OxfordClient {
    /// Requests are authenticated with the `app_id` / `app_key` headers.
    pub fn new(
        endpoint: &ProviderEndpoint,
        english_region: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn RawResponseStore>,
    ) -> Self {
        let mut http = CachedHttpClient::new(ProviderSource::Oxford, transport, cache);
        if let Some(app_id) = &endpoint.app_id {
            http = http.with_header("app_id", app_id.clone());
        }
        if let Some(app_key) = &endpoint.api_key {
            http = http.with_header("app_key", app_key.clone());
        }
        Self {
            http,
            base_url: endpoint.base_url.clone(),
            english_region: english_region.into(),
            adapter: OxfordAdapter,
        }
    }

    fn language_code<'a>(&'a self, language: &'a str) -> &'a str {
        if language.eq_ignore_ascii_case("en") {
            &self.english_region
        } else {
            language
        }
    }
}

#[async_trait]
impl DictionaryProvider for OxfordClient {
    fn source(&self) -> ProviderSource {
        ProviderSource::Oxford
    }

    fn source_name(&self) -> &'static str {
        "Oxford Dictionaries"
    }

    fn languages(&self) -> &[&'static str] {
        &["en"]
    }

    async fn search(
        &self,
        term: &str,
        language: &str,
    ) -> Result<Vec<SearchCandidate>, ProviderError> {
        let identifier = normalize_text(term);
        if identifier.is_empty() {
            return Ok(Vec::new());
        }
        let url = endpoint_url(
            &self.base_url,
            &["search", self.language_code(language)],
            &[("q", identifier.as_str())],
        )?;

        let response: Option<OxSearchResponse> = self
            .http
            .fetch_json(EndpointType::Search, &identifier, url.as_str())
            .await?;
        let candidates: Vec<SearchCandidate> = response
            .map(|r| r.results)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|result| {
                let id = clean(result.id.as_deref())?;
                let headword = clean(result.word.as_deref()).unwrap_or_else(|| id.clone());
                Some(SearchCandidate::new(headword, vec![id]))
            })
            .collect();

        debug!(term = %identifier, count = candidates.len(), "Oxford search");
        Ok(candidates)
    }

    async fn definition(
        &self,
        detail_id: &str,
        language: &str,
    ) -> Result<Option<String>, ProviderError> {
        let url = endpoint_url(
            &self.base_url,
            &["entries", self.language_code(language), detail_id],
            &[],
        )?;
        self.http.definition(detail_id, url.as_str()).await
    }

    fn adapter(&self) -> &dyn WordAdapter {
        &self.adapter
    }
}
