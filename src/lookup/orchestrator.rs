//! Provider Orchestrator
//!
//! Drives one provider through the two request shapes:
//!
//! - **lookup**: best search candidate only, a bounded burst of detail
//!   fetches, answer immediately, then enrich in the background
//! - **import**: every candidate and every detail, fetched in rate-limited
//!   groups, merged per headword and persisted

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use lexicon_core::{Word, WordRepository};

use super::merge::{fill_root_fields, merge_details};
use crate::config::FetchPolicy;
use crate::error::{LexiconError, ProviderError};
use crate::http::{fetch_batched, fetch_parallel};
use crate::providers::DictionaryProvider;

/// Per-word outcome of an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub word_id: Uuid,
    pub text: String,
    pub normalized_text: String,
    /// False when an existing word was updated
    pub created: bool,
    pub senses_created: usize,
    pub pronunciations_created: usize,
    pub examples_created: usize,
    /// Detail payloads folded into this word
    pub details_merged: usize,
}

#[derive(Clone)]
pub struct ProviderOrchestrator {
    provider: Arc<dyn DictionaryProvider>,
    repository: Arc<dyn WordRepository>,
    policy: FetchPolicy,
}

impl ProviderOrchestrator {
    pub fn new(
        provider: Arc<dyn DictionaryProvider>,
        repository: Arc<dyn WordRepository>,
        policy: FetchPolicy,
    ) -> Self {
        Self {
            provider,
            repository,
            policy,
        }
    }

    pub fn provider(&self) -> &dyn DictionaryProvider {
        self.provider.as_ref()
    }

    // =========================================================================
    // Fast lookup
    // =========================================================================

    /// Best-match lookup for interactive use.
    ///
    /// Fails with `NotFound` when search finds nothing and with `Adapter`
    /// when details were fetched but none could be adapted. When every detail
    /// fetch failed outright the first provider error is returned instead. On success a full import of the same term
    /// is launched in the background; the returned word is not persisted by
    /// this call.
    pub async fn lookup(&self, term: &str, language: &str) -> Result<Word, LexiconError> {
        let source = self.provider.source();
        let term = term.trim();

        let candidates = self
            .provider
            .search(term, language)
            .await
            .map_err(|e| LexiconError::provider(source, e))?;
        let Some(best) = candidates.into_iter().next() else {
            debug!(provider = %source, term, "Lookup: no search candidates");
            return Err(LexiconError::NotFound(term.to_string()));
        };

        let fetched = fetch_parallel(&best.detail_ids, self.policy.lookup_max_details, |id| {
            self.provider.definition(id, language)
        })
        .await;

        let (words, first_error, unadapted) = self.adapt_all(&best.detail_ids, fetched, language);
        let merged = merge_details(words)?;

        let Some(word) = merged else {
            return Err(match first_error {
                Some(error) => LexiconError::provider(source, error),
                None if unadapted > 0 => LexiconError::Adapter(format!(
                    "{unadapted} {source} detail(s) for '{term}' could not be adapted"
                )),
                None => LexiconError::NotFound(term.to_string()),
            });
        };

        info!(
            provider = %source,
            term,
            senses = word.senses().len(),
            "Lookup resolved"
        );

        if self.policy.background_enrichment {
            self.spawn_import(term.to_string(), language.to_string());
        }
        Ok(word)
    }

    /// Fire-and-forget import. Failures are logged, never surfaced.
    fn spawn_import(&self, term: String, language: String) {
        let this = self.clone();
        tokio::spawn(async move {
            match this.import(&term, &language).await {
                Ok(results) => {
                    debug!(provider = %this.provider.source(), term = %term, words = results.len(), "Background import finished")
                }
                Err(e) => {
                    warn!(provider = %this.provider.source(), term = %term, error = %e, "Background import failed")
                }
            }
        });
    }

    // =========================================================================
    // Full import
    // =========================================================================

    /// Fetch every candidate's details, merge per headword and persist.
    ///
    /// Single-detail failures (fetch or adapt) and single-word persistence
    /// failures are logged and skipped. Only a search failure, or every
    /// detail fetch failing, fails the whole call.
    pub async fn import(&self, term: &str, language: &str) -> Result<Vec<ImportResult>, LexiconError> {
        let source = self.provider.source();
        let term = term.trim();

        let candidates = self
            .provider
            .search(term, language)
            .await
            .map_err(|e| LexiconError::provider(source, e))?;

        let mut seen = HashSet::new();
        let detail_ids: Vec<String> = candidates
            .into_iter()
            .flat_map(|c| c.detail_ids)
            .filter(|id| seen.insert(id.clone()))
            .collect();
        if detail_ids.is_empty() {
            info!(provider = %source, term, "Import: nothing to fetch");
            return Ok(Vec::new());
        }

        info!(
            provider = %source,
            term,
            details = detail_ids.len(),
            group_size = self.policy.import_batch_size,
            "Import started"
        );

        let fetched = fetch_batched(
            &detail_ids,
            self.policy.import_batch_size,
            self.policy.import_batch_delay,
            |id| self.provider.definition(id, language),
        )
        .await;

        let all_failed = fetched.iter().all(Result::is_err);
        let (words, first_error, _) = self.adapt_all(&detail_ids, fetched, language);
        if all_failed {
            if let Some(error) = first_error {
                return Err(LexiconError::provider(source, error));
            }
        }

        let mut results = Vec::new();
        for (normalized, group) in group_by_headword(words) {
            let details_merged = group.len();
            let Some(word) = merge_details(group)? else {
                continue;
            };
            match self.persist(word, details_merged).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!(provider = %source, word = %normalized, error = %e, "Failed to persist imported word");
                }
            }
        }

        info!(provider = %source, term, words = results.len(), "Import finished");
        Ok(results)
    }

    async fn persist(&self, mut word: Word, details_merged: usize) -> Result<ImportResult, LexiconError> {
        let existing = self
            .repository
            .find_by_normalized_text(word.normalized_text(), word.language())
            .await?;

        if let Some(existing) = &existing {
            word.adopt_identity(existing);
            fill_root_fields(&mut word, existing);
        }
        self.repository.save(&word).await?;

        let result = import_counts(&word, existing.as_ref(), details_merged);
        debug!(
            word_id = %result.word_id,
            word = %result.normalized_text,
            created = result.created,
            senses_created = result.senses_created,
            "Persisted imported word"
        );
        Ok(result)
    }

    /// Adapt fetched payloads in request order.
    ///
    /// Returns the adapted words, the first fetch error and how many fetched
    /// payloads could not be adapted.
    fn adapt_all(
        &self,
        detail_ids: &[String],
        fetched: Vec<Result<Option<String>, ProviderError>>,
        language: &str,
    ) -> (Vec<Word>, Option<ProviderError>, usize) {
        let source = self.provider.source();
        let mut words = Vec::new();
        let mut first_error = None;
        let mut unadapted = 0;

        for (detail_id, outcome) in detail_ids.iter().zip(fetched) {
            match outcome {
                Ok(Some(raw)) => match self.provider.to_word_aggregate(&raw, language) {
                    Some(word) => words.push(word),
                    None => {
                        warn!(provider = %source, detail_id = %detail_id, "Detail could not be adapted, skipping");
                        unadapted += 1;
                    }
                },
                Ok(None) => debug!(provider = %source, detail_id = %detail_id, "Detail not found"),
                Err(e) => {
                    warn!(provider = %source, detail_id = %detail_id, error = %e, "Detail fetch failed, skipping");
                    first_error.get_or_insert(e);
                }
            }
        }
        (words, first_error, unadapted)
    }
}

/// Group words by normalized text, keeping first-seen order of groups and
/// of words within a group.
fn group_by_headword(words: Vec<Word>) -> Vec<(String, Vec<Word>)> {
    let mut groups: Vec<(String, Vec<Word>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for word in words {
        let key = word.normalized_text().to_string();
        match index.get(&key) {
            Some(&i) => groups[i].1.push(word),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![word]));
            }
        }
    }
    groups
}

fn import_counts(word: &Word, existing: Option<&Word>, details_merged: usize) -> ImportResult {
    let known: HashSet<Uuid> = existing
        .map(|w| {
            w.pronunciations()
                .iter()
                .map(|p| p.id())
                .chain(w.senses().iter().map(|s| s.id()))
                .chain(
                    w.senses()
                        .iter()
                        .flat_map(|s| s.examples().iter().map(|e| e.id())),
                )
                .collect()
        })
        .unwrap_or_default();

    ImportResult {
        word_id: word.id(),
        text: word.text().to_string(),
        normalized_text: word.normalized_text().to_string(),
        created: existing.is_none(),
        senses_created: word
            .senses()
            .iter()
            .filter(|s| !known.contains(&s.id()))
            .count(),
        pronunciations_created: word
            .pronunciations()
            .iter()
            .filter(|p| !known.contains(&p.id()))
            .count(),
        examples_created: word
            .senses()
            .iter()
            .flat_map(|s| s.examples())
            .filter(|e| !known.contains(&e.id()))
            .count(),
        details_merged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexicon_core::{SenseData, WordData};

    fn word(text: &str, senses: usize) -> Word {
        let mut w = Word::new(WordData::new(text, "en", "azvocab"));
        for i in 0..senses {
            w.add_sense(SenseData {
                part_of_speech: "verb".into(),
                definition: format!("{text} {i}"),
                ..Default::default()
            })
            .unwrap();
        }
        w
    }

    #[test]
    fn test_group_by_headword_keeps_order() {
        let groups = group_by_headword(vec![
            word("Run", 1),
            word("runner", 1),
            word("run", 2),
        ]);
        let shape: Vec<_> = groups.iter().map(|(k, g)| (k.as_str(), g.len())).collect();
        assert_eq!(shape, vec![("run", 2), ("runner", 1)]);
    }

    #[test]
    fn test_import_counts_for_new_word() {
        let w = word("run", 3);
        let result = import_counts(&w, None, 2);
        assert!(result.created);
        assert_eq!(result.senses_created, 3);
        assert_eq!(result.details_merged, 2);
    }

    #[test]
    fn test_import_counts_after_identity_adoption() {
        let persisted = word("run", 2);
        let mut fresh = Word::restore(
            Uuid::now_v7(),
            persisted.to_data(),
            Vec::new(),
            persisted.senses().to_vec(),
        );
        fresh
            .add_sense(SenseData {
                part_of_speech: "noun".into(),
                definition: "a spell of running".into(),
                ..Default::default()
            })
            .unwrap();
        fresh.adopt_identity(&persisted);

        let result = import_counts(&fresh, Some(&persisted), 1);
        assert!(!result.created);
        assert_eq!(result.word_id, persisted.id());
        assert_eq!(result.senses_created, 1);
    }
}
