//! Source selection for lookup and import requests.
//!
//! Sources form a closed set. A name that does not parse to a
//! `ProviderSource` fails with `UnsupportedSource`; there is no fallback
//! provider.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use lexicon_core::{ProviderSource, RawResponseStore, Word, WordRepository};

use super::orchestrator::{ImportResult, ProviderOrchestrator};
use crate::config::LexiconConfig;
use crate::error::LexiconError;
use crate::http::HttpTransport;
use crate::providers::{AzVocabClient, DictionaryProvider, FreeDictionaryClient, OxfordClient};

pub struct LookupFactory {
    orchestrators: HashMap<ProviderSource, ProviderOrchestrator>,
    default_language: String,
}

impl LookupFactory {
    pub fn new(default_language: impl Into<String>) -> Self {
        Self {
            orchestrators: HashMap::new(),
            default_language: default_language.into(),
        }
    }

    /// Build every configured provider over one transport, cache and repository.
    ///
    /// Oxford is left out when its credentials are missing; requests for it
    /// then fail with a configuration error.
    pub fn from_config(
        config: &LexiconConfig,
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn RawResponseStore>,
        repository: Arc<dyn WordRepository>,
    ) -> Self {
        let mut factory = Self::new(config.default_language.clone());
        let mut providers: Vec<Arc<dyn DictionaryProvider>> = vec![
            Arc::new(AzVocabClient::new(
                &config.azvocab,
                transport.clone(),
                cache.clone(),
            )),
            Arc::new(FreeDictionaryClient::new(
                &config.free_dictionary,
                transport.clone(),
                cache.clone(),
            )),
        ];

        if config.oxford.app_id.is_some() && config.oxford.api_key.is_some() {
            providers.push(Arc::new(OxfordClient::new(
                &config.oxford,
                config.oxford_region.clone(),
                transport,
                cache,
            )));
        } else {
            warn!("OXFORD_APP_ID / OXFORD_APP_KEY not set, Oxford source disabled");
        }

        for provider in providers {
            factory.register(ProviderOrchestrator::new(
                provider,
                repository.clone(),
                config.fetch.clone(),
            ));
        }
        factory
    }

    pub fn register(&mut self, orchestrator: ProviderOrchestrator) {
        let source = orchestrator.provider().source();
        info!(provider = %source, name = orchestrator.provider().source_name(), "Registered dictionary source");
        self.orchestrators.insert(source, orchestrator);
    }

    pub fn sources(&self) -> Vec<ProviderSource> {
        ProviderSource::ALL
            .into_iter()
            .filter(|s| self.orchestrators.contains_key(s))
            .collect()
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Orchestrator for a source name.
    pub fn orchestrator(&self, source: &str) -> Result<&ProviderOrchestrator, LexiconError> {
        let source: ProviderSource = source.parse()?;
        self.orchestrators
            .get(&source)
            .ok_or_else(|| LexiconError::Config(format!("dictionary source '{source}' is not configured")))
    }

    /// Fast lookup. Not-found is `Ok(None)`.
    pub async fn lookup(
        &self,
        term: &str,
        source: &str,
        language: Option<&str>,
    ) -> Result<Option<Word>, LexiconError> {
        let orchestrator = self.orchestrator(source)?;
        let language = language.unwrap_or(self.default_language.as_str());
        let provider = orchestrator.provider();
        if !provider.supports_language(language) {
            return Err(LexiconError::UnsupportedLanguage {
                source_id: provider.source(),
                language: language.to_string(),
            });
        }

        match orchestrator.lookup(term, language).await {
            Ok(word) => Ok(Some(word)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Full import in the default language.
    pub async fn import(&self, term: &str, source: &str) -> Result<Vec<ImportResult>, LexiconError> {
        let orchestrator = self.orchestrator(source)?;
        orchestrator.import(term, &self.default_language).await
    }
}
