//! Shared fixtures for integration tests: a scripted transport, provider
//! payload builders, and a factory wired to in-memory stores.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lexicon::config::{FetchPolicy, LexiconConfig, ProviderEndpoint};
use lexicon::error::ProviderError;
use lexicon::http::{HttpTransport, TransportResponse};
use lexicon::persistence::{InMemoryRawResponseStore, InMemoryWordRepository};
use lexicon::LookupFactory;

pub const AZVOCAB: &str = "https://azvocab.test/v1";
pub const OXFORD: &str = "https://oxford.test/api/v2";
pub const FREE_DICTIONARY: &str = "https://freedict.test/api/v2";

/// Transport answering from a fixed URL → response table.
///
/// Unscripted URLs answer 404. Every call is recorded.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, Result<TransportResponse, u16>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.into(), Ok(TransportResponse::new(status, body)));
        self
    }

    pub fn json(self, url: impl Into<String>, body: Value) -> Self {
        self.respond(url, 200, body.to_string())
    }

    /// Make a URL fail below HTTP (connection refused).
    pub fn fail(self, url: impl Into<String>) -> Self {
        self.responses.lock().unwrap().insert(url.into(), Err(0));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        _headers: &[(String, String)],
    ) -> Result<TransportResponse, ProviderError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.responses.lock().unwrap().get(url) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(_)) => Err(ProviderError::Transport("connection refused".into())),
            None => Ok(TransportResponse::new(404, r#"{"error":"not found"}"#)),
        }
    }
}

// ── Config and wiring ─────────────────────────────────────────

pub fn test_config() -> LexiconConfig {
    LexiconConfig {
        azvocab: ProviderEndpoint::new(AZVOCAB),
        oxford: ProviderEndpoint {
            base_url: OXFORD.to_string(),
            app_id: Some("app".into()),
            api_key: Some("key".into()),
        },
        free_dictionary: ProviderEndpoint::new(FREE_DICTIONARY),
        fetch: FetchPolicy {
            import_batch_delay: Duration::ZERO,
            background_enrichment: false,
            ..FetchPolicy::default()
        },
        ..LexiconConfig::default()
    }
}

pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub cache: InMemoryRawResponseStore,
    pub repository: InMemoryWordRepository,
    pub factory: LookupFactory,
}

pub fn harness(transport: ScriptedTransport) -> Harness {
    harness_with(transport, test_config())
}

pub fn harness_with(transport: ScriptedTransport, config: LexiconConfig) -> Harness {
    let transport = Arc::new(transport);
    let cache = InMemoryRawResponseStore::new();
    let repository = InMemoryWordRepository::new();
    let factory = LookupFactory::from_config(
        &config,
        transport.clone(),
        Arc::new(cache.clone()),
        Arc::new(repository.clone()),
    );
    Harness {
        transport,
        cache,
        repository,
        factory,
    }
}

// ── AzVocab payloads ──────────────────────────────────────────

pub fn az_search_url(term: &str) -> String {
    format!("{AZVOCAB}/search?q={term}")
}

pub fn az_entry_url(id: &str) -> String {
    format!("{AZVOCAB}/entries/{id}")
}

pub fn az_search(hits: &[(&str, &[&str])]) -> Value {
    json!({
        "data": hits
            .iter()
            .map(|(headword, ids)| json!({ "headword": headword, "entryIds": ids }))
            .collect::<Vec<_>>()
    })
}

/// Entry with one sense per `(sense_id, definition)`, each with one example.
pub fn az_entry(id: &str, headword: &str, senses: &[(&str, &str)]) -> Value {
    json!({
        "id": id,
        "headword": headword,
        "pronunciations": [
            { "ipa": "/rʌn/", "audio": "https://cdn.azvocab.test/audio/run-uk.mp3" },
            { "ipa": "/rʌn/", "audio": "https://cdn.azvocab.test/audio/run-us.mp3" }
        ],
        "senses": senses
            .iter()
            .map(|(sense_id, definition)| json!({
                "id": sense_id,
                "pos": "verb",
                "definition": definition,
                "examples": [{ "id": format!("{sense_id}-e1"), "text": format!("Example for {sense_id}.") }]
            }))
            .collect::<Vec<_>>()
    })
}

/// Entry carrying the derived fields the backfill fills in.
pub fn az_entry_with_derived(id: &str, headword: &str) -> Value {
    let mut entry = az_entry(id, headword, &[("s1", "move fast on foot")]);
    entry["wordFamily"] = json!({ "noun": ["runner"], "adjective": ["runny"] });
    entry["inflections"] = json!(["runs", "ran", "running"]);
    entry["rank"] = json!(512);
    entry["frequency"] = json!(90210);
    entry
}
