//! Storage port traits.
//! Implemented by the in-memory and PostgreSQL adapters; core logic depends only on these traits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::raw_response::{CacheKey, CachedRawResponse, NewRawResponse};
use crate::source::EndpointType;
use crate::word::Word;

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// The only persistence contract for the `Word` aggregate.
///
/// Implementations must make `save` atomic: either every child change of the
/// aggregate becomes visible, or none does.
#[async_trait]
pub trait WordRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Word>>;

    /// Look up by normalized text; the argument is normalized before matching.
    async fn find_by_normalized_text(&self, text: &str, language: &str) -> Result<Option<Word>>;

    /// Words whose normalized text starts with `prefix`, ordered by normalized text.
    async fn find_by_prefix(&self, prefix: &str, language: &str, limit: usize)
        -> Result<Vec<Word>>;

    /// Insert or update the aggregate, reconciling all child collections.
    ///
    /// Fails with `RepositoryError::Conflict` when another word already owns
    /// the same `(normalized_text, language)`.
    async fn save(&self, word: &Word) -> Result<()>;

    /// Remove the aggregate and all of its children. Returns false if it did not exist.
    async fn delete(&self, word: &Word) -> Result<bool>;

    async fn exists(&self, text: &str, language: &str) -> Result<bool>;
}

/// Durable store of verbatim provider responses.
#[async_trait]
pub trait RawResponseStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedRawResponse>>;

    /// Insert, or update in place when the key already exists (keeping the id).
    async fn upsert(&self, response: NewRawResponse) -> Result<CachedRawResponse>;

    /// Records of one endpoint type with id greater than `after`, ordered by id.
    async fn page_after(
        &self,
        endpoint_type: EndpointType,
        after: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<CachedRawResponse>>;

    async fn count(&self) -> Result<u64>;
}
