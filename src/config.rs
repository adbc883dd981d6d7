//! Runtime configuration, read from the environment.

use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_LOOKUP_MAX_DETAILS: usize = 6;
pub const DEFAULT_IMPORT_BATCH_SIZE: usize = 3;
pub const DEFAULT_IMPORT_BATCH_DELAY_MS: u64 = 1000;
pub const DEFAULT_BACKFILL_BATCH_SIZE: usize = 100;

/// Connection settings for one provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub app_id: Option<String>,
    pub api_key: Option<String>,
}

impl ProviderEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// How many provider calls the orchestrator makes, and how fast.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Detail entries fetched in one burst by a fast lookup
    pub lookup_max_details: usize,
    /// Concurrent detail fetches per group during an import
    pub import_batch_size: usize,
    /// Pause between import groups
    pub import_batch_delay: Duration,
    /// Launch a background import after every successful fast lookup
    pub background_enrichment: bool,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            lookup_max_details: DEFAULT_LOOKUP_MAX_DETAILS,
            import_batch_size: DEFAULT_IMPORT_BATCH_SIZE,
            import_batch_delay: Duration::from_millis(DEFAULT_IMPORT_BATCH_DELAY_MS),
            background_enrichment: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LexiconConfig {
    pub azvocab: ProviderEndpoint,
    pub oxford: ProviderEndpoint,
    /// Oxford's regional language segment, e.g. "en-gb"
    pub oxford_region: String,
    pub free_dictionary: ProviderEndpoint,
    pub default_language: String,
    pub http_timeout: Duration,
    pub fetch: FetchPolicy,
    pub backfill_batch_size: usize,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            azvocab: ProviderEndpoint::new("https://api.azvocab.ai/v1"),
            oxford: ProviderEndpoint::new("https://od-api.oxforddictionaries.com/api/v2"),
            oxford_region: "en-gb".to_string(),
            free_dictionary: ProviderEndpoint::new("https://api.dictionaryapi.dev/api/v2"),
            default_language: DEFAULT_LANGUAGE.to_string(),
            http_timeout: Duration::from_secs(30),
            fetch: FetchPolicy::default(),
            backfill_batch_size: DEFAULT_BACKFILL_BATCH_SIZE,
        }
    }
}

impl LexiconConfig {
    /// Build from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            azvocab: ProviderEndpoint {
                base_url: env_string("AZVOCAB_BASE_URL").unwrap_or(defaults.azvocab.base_url),
                app_id: None,
                api_key: env_string("AZVOCAB_API_KEY"),
            },
            oxford: ProviderEndpoint {
                base_url: env_string("OXFORD_BASE_URL").unwrap_or(defaults.oxford.base_url),
                app_id: env_string("OXFORD_APP_ID"),
                api_key: env_string("OXFORD_APP_KEY"),
            },
            oxford_region: env_string("OXFORD_REGION").unwrap_or(defaults.oxford_region),
            free_dictionary: ProviderEndpoint {
                base_url: env_string("FREE_DICTIONARY_BASE_URL")
                    .unwrap_or(defaults.free_dictionary.base_url),
                app_id: None,
                api_key: None,
            },
            default_language: env_string("LEXICON_DEFAULT_LANGUAGE")
                .unwrap_or(defaults.default_language),
            http_timeout: Duration::from_secs(env_parse("LEXICON_HTTP_TIMEOUT_SECS", 30)),
            fetch: FetchPolicy {
                lookup_max_details: env_parse(
                    "LEXICON_LOOKUP_MAX_DETAILS",
                    DEFAULT_LOOKUP_MAX_DETAILS,
                ),
                import_batch_size: env_parse("LEXICON_IMPORT_BATCH_SIZE", DEFAULT_IMPORT_BATCH_SIZE),
                import_batch_delay: Duration::from_millis(env_parse(
                    "LEXICON_IMPORT_BATCH_DELAY_MS",
                    DEFAULT_IMPORT_BATCH_DELAY_MS,
                )),
                background_enrichment: env_parse("LEXICON_BACKGROUND_ENRICHMENT", true),
            },
            backfill_batch_size: env_parse(
                "LEXICON_BACKFILL_BATCH_SIZE",
                DEFAULT_BACKFILL_BATCH_SIZE,
            ),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr + std::fmt::Debug>(key: &str, default: T) -> T {
    match env_string(key) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, ?default, "Invalid configuration value, using default");
            default
        }),
    }
}
