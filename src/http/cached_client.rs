//! Cache-aside HTTP client for one dictionary provider.
//!
//! Every call first consults the raw-response store keyed by
//! `(provider, endpoint_type, request_identifier)`. On a miss the provider
//! is called and the verbatim body is written back:
//!
//! | status          | result                     | cached |
//! |-----------------|----------------------------|--------|
//! | 2xx             | `Ok(Some(body))`           | yes    |
//! | 429             | `Err(RateLimited)`         | no     |
//! | other 4xx       | `Ok(None)` (not found)     | yes    |
//! | 5xx             | `Err(Upstream)`            | no     |
//! | timeout/connect | `Err(Timeout / Transport)` | no     |

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use lexicon_core::{CacheKey, EndpointType, NewRawResponse, ProviderSource, RawResponseStore};

use super::transport::HttpTransport;
use crate::error::ProviderError;

const MAX_ERROR_BODY: usize = 512;

#[derive(Clone)]
pub struct CachedHttpClient {
    provider: ProviderSource,
    transport: Arc<dyn HttpTransport>,
    cache: Arc<dyn RawResponseStore>,
    headers: Vec<(String, String)>,
}

impl CachedHttpClient {
    pub fn new(
        provider: ProviderSource,
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn RawResponseStore>,
    ) -> Self {
        Self {
            provider,
            transport,
            cache,
            headers: Vec::new(),
        }
    }

    /// Add a header sent with every request (credentials, mostly).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn provider(&self) -> ProviderSource {
        self.provider
    }

    pub async fn search(
        &self,
        request_identifier: &str,
        url: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.fetch(EndpointType::Search, request_identifier, url)
            .await
    }

    pub async fn definition(
        &self,
        request_identifier: &str,
        url: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.fetch(EndpointType::Definition, request_identifier, url)
            .await
    }

    /// Fetch and decode a JSON body. Not-found stays `None`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint_type: EndpointType,
        request_identifier: &str,
        url: &str,
    ) -> Result<Option<T>, ProviderError> {
        let Some(body) = self.fetch(endpoint_type, request_identifier, url).await? else {
            return Ok(None);
        };
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    /// Cache-aside fetch of one raw body.
    pub async fn fetch(
        &self,
        endpoint_type: EndpointType,
        request_identifier: &str,
        url: &str,
    ) -> Result<Option<String>, ProviderError> {
        let key = CacheKey::new(self.provider, endpoint_type, request_identifier);

        match self.cache.get(&key).await {
            Ok(Some(cached)) => {
                debug!(key = %key, status = cached.status_code, "Raw response cache hit");
                return Ok(cached.is_success().then_some(cached.raw_response));
            }
            Ok(None) => {}
            Err(e) => {
                // A broken cache read degrades to a live call.
                warn!(key = %key, error = %e, "Raw response cache read failed");
            }
        }

        let started = Instant::now();
        let response = self.transport.get(url, &self.headers).await?;
        let latency_ms = started.elapsed().as_millis() as i64;
        debug!(key = %key, status = response.status, latency_ms, "Provider call completed");

        match response.status {
            200..=299 => {
                self.store(key, &response.body, response.status, latency_ms)
                    .await;
                Ok(Some(response.body))
            }
            429 => {
                warn!(provider = %self.provider, "Provider rate limit hit");
                Err(ProviderError::RateLimited)
            }
            400..=499 => {
                self.store(key, &response.body, response.status, latency_ms)
                    .await;
                Ok(None)
            }
            status => Err(ProviderError::Upstream {
                status,
                body: truncate_body(response.body),
            }),
        }
    }

    async fn store(&self, key: CacheKey, body: &str, status_code: u16, latency_ms: i64) {
        let record = NewRawResponse {
            key,
            raw_response: body.to_string(),
            status_code,
            latency_ms,
        };
        let key_text = record.key.to_string();
        if let Err(e) = self.cache.upsert(record).await {
            warn!(key = %key_text, error = %e, "Failed to cache raw response");
        }
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "é".repeat(400);
        let cut = truncate_body(body);
        assert!(cut.len() <= MAX_ERROR_BODY);
        assert!(cut.chars().all(|c| c == 'é'));
    }
}
