//! Outbound HTTP for dictionary providers.
//!
//! - `transport` — the `HttpTransport` seam and its reqwest implementation
//! - `cached_client` — cache-aside client persisting every raw response
//! - `fetch` — burst and rate-limited batch fetch helpers

pub mod cached_client;
pub mod fetch;
pub mod transport;

pub use cached_client::CachedHttpClient;
pub use fetch::{fetch_batched, fetch_parallel};
pub use transport::{HttpTransport, ReqwestTransport, TransportResponse};

use url::Url;

use crate::error::ProviderError;

/// Join path segments (percent-encoded) and query pairs onto a base URL.
pub fn endpoint_url(
    base: &str,
    segments: &[&str],
    query: &[(&str, &str)],
) -> Result<Url, ProviderError> {
    let mut url = Url::parse(base).map_err(|e| ProviderError::InvalidUrl(format!("{base}: {e}")))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ProviderError::InvalidUrl(format!("{base}: cannot be a base")))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}
