//! In-memory adapters for the storage ports.
//!
//! Used by tests and by the CLI when no database is configured. The word
//! store keeps the same entity graph the PostgreSQL adapter stores and goes
//! through the same mapper, so change detection behaves identically.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use lexicon_core::ports::Result;
use lexicon_core::{
    new_id, normalize_text, CacheKey, CachedRawResponse, EndpointType, NewRawResponse,
    RawResponseStore, RepositoryError, Word, WordRepository,
};

use super::entity::WordEntity;
use super::mapper::{to_domain, to_entity};
use crate::backfill::{BackfillSession, BackfillStore, BackfillTarget, DerivedFields};

// =============================================================================
// Words
// =============================================================================

#[derive(Clone, Default)]
pub struct InMemoryWordRepository {
    words: Arc<RwLock<HashMap<Uuid, WordEntity>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryWordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored graph of one word.
    pub async fn entity(&self, id: Uuid) -> Option<WordEntity> {
        self.words.read().await.get(&id).cloned()
    }

    /// Row writes performed so far (one per entity insert, update or delete).
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.words.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.words.read().await.is_empty()
    }
}

fn find_entity<'a>(
    words: &'a HashMap<Uuid, WordEntity>,
    normalized: &str,
    language: &str,
) -> Option<&'a WordEntity> {
    words
        .values()
        .find(|w| w.normalized_text == normalized && w.language == language)
}

#[async_trait]
impl WordRepository for InMemoryWordRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Word>> {
        Ok(self.words.read().await.get(&id).map(to_domain))
    }

    async fn find_by_normalized_text(&self, text: &str, language: &str) -> Result<Option<Word>> {
        let normalized = normalize_text(text);
        let words = self.words.read().await;
        Ok(find_entity(&words, &normalized, language).map(to_domain))
    }

    async fn find_by_prefix(
        &self,
        prefix: &str,
        language: &str,
        limit: usize,
    ) -> Result<Vec<Word>> {
        let prefix = normalize_text(prefix);
        let words = self.words.read().await;
        let mut matches: Vec<&WordEntity> = words
            .values()
            .filter(|w| w.language == language && w.normalized_text.starts_with(&prefix))
            .collect();
        matches.sort_by(|a, b| a.normalized_text.cmp(&b.normalized_text));
        Ok(matches.into_iter().take(limit).map(to_domain).collect())
    }

    async fn save(&self, word: &Word) -> Result<()> {
        let mut words = self.words.write().await;

        if let Some(other) = find_entity(&words, word.normalized_text(), word.language()) {
            if other.id != word.id() {
                return Err(RepositoryError::Conflict(format!(
                    "{}/{}",
                    word.normalized_text(),
                    word.language()
                )));
            }
        }

        let existing = words.get(&word.id()).cloned();
        let (entity, changes) = to_entity(word, existing, Utc::now());
        self.writes.fetch_add(changes.len(), Ordering::SeqCst);
        words.insert(entity.id, entity);
        Ok(())
    }

    async fn delete(&self, word: &Word) -> Result<bool> {
        Ok(self.words.write().await.remove(&word.id()).is_some())
    }

    async fn exists(&self, text: &str, language: &str) -> Result<bool> {
        let normalized = normalize_text(text);
        let words = self.words.read().await;
        Ok(find_entity(&words, &normalized, language).is_some())
    }
}

#[async_trait]
impl BackfillStore for InMemoryWordRepository {
    async fn open_session(&self) -> Result<Box<dyn BackfillSession>> {
        Ok(Box::new(InMemoryBackfillSession {
            words: self.words.clone(),
            writes: self.writes.clone(),
        }))
    }
}

struct InMemoryBackfillSession {
    words: Arc<RwLock<HashMap<Uuid, WordEntity>>>,
    writes: Arc<AtomicUsize>,
}

#[async_trait]
impl BackfillSession for InMemoryBackfillSession {
    async fn find_target(
        &mut self,
        normalized_text: &str,
        language: &str,
    ) -> Result<Option<BackfillTarget>> {
        let words = self.words.read().await;
        Ok(
            find_entity(&words, normalized_text, language).map(|w| BackfillTarget {
                word_id: w.id,
                normalized_text: w.normalized_text.clone(),
                language: w.language.clone(),
                has_word_family: w.word_family.is_some(),
            }),
        )
    }

    async fn apply(
        &mut self,
        target: &BackfillTarget,
        fields: &DerivedFields,
        provenance: &str,
    ) -> Result<()> {
        let mut words = self.words.write().await;
        let entity = words
            .get_mut(&target.word_id)
            .ok_or_else(|| RepositoryError::NotFound(target.word_id.to_string()))?;

        entity.word_family = Some(fields.word_family.clone().unwrap_or_default());
        if let Some(inflections) = &fields.inflections {
            entity.inflections = Some(inflections.clone());
        }
        if let Some(rank) = fields.frequency_rank {
            entity.frequency_rank = Some(rank);
        }
        if let Some(count) = fields.frequency_count {
            entity.frequency_count = Some(count);
        }
        entity.provenance = Some(provenance.to_string());
        entity.updated_at = Utc::now();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// Raw responses
// =============================================================================

type KeyIndex = HashMap<(String, EndpointType, String), Uuid>;

#[derive(Default)]
struct RawResponses {
    by_id: BTreeMap<Uuid, CachedRawResponse>,
    by_key: KeyIndex,
}

#[derive(Clone, Default)]
pub struct InMemoryRawResponseStore {
    inner: Arc<RwLock<RawResponses>>,
}

impl InMemoryRawResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record as-is, replacing any record with the same key.
    pub async fn insert_record(&self, record: CachedRawResponse) {
        let mut inner = self.inner.write().await;
        let key = (
            record.provider.clone(),
            record.endpoint_type,
            record.request_identifier.clone(),
        );
        if let Some(old) = inner.by_key.insert(key, record.id) {
            inner.by_id.remove(&old);
        }
        inner.by_id.insert(record.id, record);
    }

    pub async fn records(&self) -> Vec<CachedRawResponse> {
        self.inner.read().await.by_id.values().cloned().collect()
    }
}

fn index_key(key: &CacheKey) -> (String, EndpointType, String) {
    (
        key.provider.as_str().to_string(),
        key.endpoint_type,
        key.request_identifier.clone(),
    )
}

#[async_trait]
impl RawResponseStore for InMemoryRawResponseStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedRawResponse>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_key
            .get(&index_key(key))
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    async fn upsert(&self, response: NewRawResponse) -> Result<CachedRawResponse> {
        let mut inner = self.inner.write().await;
        let key = index_key(&response.key);
        let id = inner.by_key.get(&key).copied().unwrap_or_else(new_id);
        let record = CachedRawResponse::from_new(id, response, Utc::now());
        inner.by_key.insert(key, id);
        inner.by_id.insert(id, record.clone());
        Ok(record)
    }

    async fn page_after(
        &self,
        endpoint_type: EndpointType,
        after: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<CachedRawResponse>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_id
            .values()
            .filter(|r| r.endpoint_type == endpoint_type)
            .filter(|r| after.map_or(true, |a| r.id > a))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.inner.read().await.by_id.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexicon_core::{ProviderSource, SenseData, WordData};

    fn word(text: &str) -> Word {
        let mut word = Word::new(WordData::new(text, "en", "azvocab"));
        word.add_sense(SenseData {
            part_of_speech: "verb".into(),
            definition: format!("to {}", text),
            ..Default::default()
        })
        .unwrap();
        word
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = InMemoryWordRepository::new();
        let run = word("Run");
        repo.save(&run).await.unwrap();

        let found = repo.find_by_normalized_text("  RUN ", "en").await.unwrap();
        assert_eq!(found, Some(run.clone()));
        assert!(repo.exists("run", "en").await.unwrap());
        assert!(!repo.exists("run", "vi").await.unwrap());
        assert_eq!(repo.find_by_id(run.id()).await.unwrap(), Some(run));
    }

    #[tokio::test]
    async fn test_second_save_without_changes_writes_nothing() {
        let repo = InMemoryWordRepository::new();
        let run = word("run");
        repo.save(&run).await.unwrap();
        let after_insert = repo.write_count();
        assert_eq!(after_insert, 2);

        repo.save(&run).await.unwrap();
        assert_eq!(repo.write_count(), after_insert);
    }

    #[tokio::test]
    async fn test_conflicting_normalized_text_is_rejected() {
        let repo = InMemoryWordRepository::new();
        repo.save(&word("run")).await.unwrap();

        let err = repo.save(&word("RUN")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_find_by_prefix_is_sorted_and_limited() {
        let repo = InMemoryWordRepository::new();
        for text in ["runner", "run", "rung", "walk"] {
            repo.save(&word(text)).await.unwrap();
        }

        let found = repo.find_by_prefix("Ru", "en", 2).await.unwrap();
        let texts: Vec<&str> = found.iter().map(|w| w.normalized_text()).collect();
        assert_eq!(texts, vec!["run", "rung"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryWordRepository::new();
        let run = word("run");
        repo.save(&run).await.unwrap();
        assert!(repo.delete(&run).await.unwrap());
        assert!(!repo.delete(&run).await.unwrap());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_upsert_keeps_id_and_replaces_body() {
        let store = InMemoryRawResponseStore::new();
        let key = CacheKey::new(ProviderSource::AzVocab, EndpointType::Definition, "d1");

        let first = store
            .upsert(NewRawResponse {
                key: key.clone(),
                raw_response: "{}".into(),
                status_code: 200,
                latency_ms: 10,
            })
            .await
            .unwrap();
        let second = store
            .upsert(NewRawResponse {
                key: key.clone(),
                raw_response: r#"{"id":"d1"}"#.into(),
                status_code: 200,
                latency_ms: 12,
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.count().await.unwrap(), 1);
        let cached = store.get(&key).await.unwrap().unwrap();
        assert_eq!(cached.raw_response, r#"{"id":"d1"}"#);
        assert_eq!(cached.response_size_bytes, 11);
    }

    #[tokio::test]
    async fn test_page_after_filters_endpoint_and_resumes() {
        let store = InMemoryRawResponseStore::new();
        for (endpoint, id) in [
            (EndpointType::Definition, "a"),
            (EndpointType::Search, "s"),
            (EndpointType::Definition, "b"),
            (EndpointType::Definition, "c"),
        ] {
            store
                .upsert(NewRawResponse {
                    key: CacheKey::new(ProviderSource::AzVocab, endpoint, id),
                    raw_response: "{}".into(),
                    status_code: 200,
                    latency_ms: 1,
                })
                .await
                .unwrap();
        }

        let first = store
            .page_after(EndpointType::Definition, None, 2)
            .await
            .unwrap();
        assert_eq!(first.len(), 2);
        let rest = store
            .page_after(EndpointType::Definition, Some(first[1].id), 2)
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
        let mut ids: Vec<&str> = first
            .iter()
            .chain(rest.iter())
            .map(|r| r.request_identifier.as_str())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
