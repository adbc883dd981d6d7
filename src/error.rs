//! Error types for provider calls and the lookup/import pipeline.

use lexicon_core::{DomainError, ProviderSource, RepositoryError, UnknownSource};
use thiserror::Error;

/// Failure of a single call to an external dictionary provider.
///
/// Not-found answers are not errors: provider calls return `Ok(None)` or an
/// empty list for them.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("rate limited by provider")]
    RateLimited,

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(error.to_string())
        }
    }
}

/// Errors surfaced by lookups, imports and backfills.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{source_id} provider error: {error}")]
    Provider {
        source_id: ProviderSource,
        #[source]
        error: ProviderError,
    },

    #[error("adapter error: {0}")]
    Adapter(String),

    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("persistence error: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("dictionary source '{0}' is not supported")]
    UnsupportedSource(String),

    #[error("{source_id} does not serve language '{language}'")]
    UnsupportedLanguage {
        source_id: ProviderSource,
        language: String,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl LexiconError {
    pub fn provider(source_id: ProviderSource, error: ProviderError) -> Self {
        Self::Provider { source_id, error }
    }

    /// Not-found and unadaptable payloads both read as "no such word".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Adapter(_))
    }
}

impl From<UnknownSource> for LexiconError {
    fn from(error: UnknownSource) -> Self {
        Self::UnsupportedSource(error.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_provider_error() {
        let e = LexiconError::provider(
            ProviderSource::Oxford,
            ProviderError::Upstream {
                status: 503,
                body: "maintenance".into(),
            },
        );
        assert_eq!(
            e.to_string(),
            "oxford provider error: upstream error 503: maintenance"
        );
    }

    #[test]
    fn display_unsupported_source() {
        let e: LexiconError = "webster".parse::<ProviderSource>().unwrap_err().into();
        assert_eq!(e.to_string(), "dictionary source 'webster' is not supported");
    }

    #[test]
    fn not_found_predicate() {
        assert!(LexiconError::NotFound("run".into()).is_not_found());
        assert!(LexiconError::Adapter("bad".into()).is_not_found());
    }
}
