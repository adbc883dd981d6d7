//! Verbatim provider responses, kept as a replay log.
//!
//! Records are unique on `(provider, endpoint_type, request_identifier)`,
//! updated in place on re-fetch and never expired. They are not part of the
//! `Word` aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::source::{EndpointType, ProviderSource};

/// Unique key of a cached provider response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: ProviderSource,
    pub endpoint_type: EndpointType,
    pub request_identifier: String,
}

impl CacheKey {
    pub fn new(
        provider: ProviderSource,
        endpoint_type: EndpointType,
        request_identifier: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            endpoint_type,
            request_identifier: request_identifier.into(),
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.provider, self.endpoint_type, self.request_identifier
        )
    }
}

/// A response about to be written to the cache store.
#[derive(Debug, Clone)]
pub struct NewRawResponse {
    pub key: CacheKey,
    pub raw_response: String,
    pub status_code: u16,
    pub latency_ms: i64,
}

impl NewRawResponse {
    pub fn response_size_bytes(&self) -> i64 {
        self.raw_response.len() as i64
    }
}

/// A stored response.
///
/// `provider` stays a plain string so rows written by sources that are no
/// longer supported can still be paged through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedRawResponse {
    /// Time-sortable id; also the pagination key
    pub id: Uuid,
    pub provider: String,
    pub endpoint_type: EndpointType,
    pub request_identifier: String,
    pub raw_response: String,
    pub response_size_bytes: i64,
    pub status_code: u16,
    pub latency_ms: i64,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRawResponse {
    /// Build a stored record from a new response.
    pub fn from_new(id: Uuid, response: NewRawResponse, fetched_at: DateTime<Utc>) -> Self {
        let response_size_bytes = response.response_size_bytes();
        Self {
            id,
            provider: response.key.provider.as_str().to_string(),
            endpoint_type: response.key.endpoint_type,
            request_identifier: response.key.request_identifier,
            raw_response: response.raw_response,
            response_size_bytes,
            status_code: response.status_code,
            latency_ms: response.latency_ms,
            fetched_at,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Parse the stored body as JSON.
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.raw_response)
    }
}
