//! Backfill Pipeline
//!
//! Replays cached definition responses to fill word-level fields that were
//! added after the words were imported. No provider is called.
//!
//! The cache is paged by id (time-sortable, so stable across runs). For
//! each cached response: pick the provider's extractor, read the headword
//! and derived fields, find the word, and write the fields unless the word
//! already has a word family (the "already backfilled" marker). One bad
//! item is counted and logged; it never stops the run.

pub mod extractor;

pub use extractor::{DerivedFieldExtractor, DerivedFields, ExtractorRegistry};

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use lexicon_core::{
    normalize_text, CachedRawResponse, EndpointType, RawResponseStore, RepositoryError,
};

use crate::config::{DEFAULT_BACKFILL_BATCH_SIZE, DEFAULT_LANGUAGE};
use crate::error::LexiconError;

// =============================================================================
// Options and report
// =============================================================================

#[derive(Debug, Clone)]
pub struct BackfillOptions {
    /// Do everything except the final write
    pub dry_run: bool,
    pub batch_size: usize,
    /// Language of the target words; cached payloads do not record it
    pub language: String,
}

impl Default for BackfillOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            batch_size: DEFAULT_BACKFILL_BATCH_SIZE,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl BackfillOptions {
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillReport {
    pub total_processed: usize,
    pub updated_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
}

// =============================================================================
// Storage seam
// =============================================================================

/// The part of a stored word the backfill needs to decide and to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillTarget {
    pub word_id: Uuid,
    pub normalized_text: String,
    pub language: String,
    pub has_word_family: bool,
}

/// Opens isolated sessions for backfill runs.
#[async_trait]
pub trait BackfillStore: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn BackfillSession>, RepositoryError>;
}

/// One run's private view of the word store.
#[async_trait]
pub trait BackfillSession: Send {
    async fn find_target(
        &mut self,
        normalized_text: &str,
        language: &str,
    ) -> Result<Option<BackfillTarget>, RepositoryError>;

    /// Write derived fields straight onto the stored word.
    ///
    /// A missing word family is stored as an empty map so the word counts
    /// as backfilled from now on.
    async fn apply(
        &mut self,
        target: &BackfillTarget,
        fields: &DerivedFields,
        provenance: &str,
    ) -> Result<(), RepositoryError>;
}

// =============================================================================
// Pipeline
// =============================================================================

#[derive(Debug, Error)]
enum ItemError {
    #[error("no extractor for provider '{0}'")]
    UnknownProvider(String),

    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Updated,
    Skipped(&'static str),
}

type WorkingSet = HashMap<(String, String), BackfillTarget>;

pub struct BackfillPipeline {
    cache: Arc<dyn RawResponseStore>,
    store: Arc<dyn BackfillStore>,
    extractors: ExtractorRegistry,
}

impl BackfillPipeline {
    pub fn new(cache: Arc<dyn RawResponseStore>, store: Arc<dyn BackfillStore>) -> Self {
        Self::with_extractors(cache, store, ExtractorRegistry::standard())
    }

    pub fn with_extractors(
        cache: Arc<dyn RawResponseStore>,
        store: Arc<dyn BackfillStore>,
        extractors: ExtractorRegistry,
    ) -> Self {
        Self {
            cache,
            store,
            extractors,
        }
    }

    pub async fn run(&self, options: &BackfillOptions) -> Result<BackfillReport, LexiconError> {
        let batch_size = options.batch_size.max(1);
        let mut session = self.store.open_session().await?;
        let mut report = BackfillReport::default();
        let mut after: Option<Uuid> = None;
        let mut batch_no = 0usize;

        info!(dry_run = options.dry_run, batch_size, "Backfill started");

        loop {
            let page = self
                .cache
                .page_after(EndpointType::Definition, after, batch_size)
                .await?;
            let Some(last) = page.last() else {
                break;
            };
            after = Some(last.id);
            batch_no += 1;

            let mut working = WorkingSet::new();
            for record in &page {
                report.total_processed += 1;
                match self
                    .process(record, session.as_mut(), &mut working, options)
                    .await
                {
                    Ok(Outcome::Updated) => report.updated_count += 1,
                    Ok(Outcome::Skipped(reason)) => {
                        debug!(record_id = %record.id, request = %record.request_identifier, reason, "Backfill skipped");
                        report.skipped_count += 1;
                    }
                    Err(e) => {
                        warn!(record_id = %record.id, provider = %record.provider, request = %record.request_identifier, error = %e, "Backfill item failed");
                        report.error_count += 1;
                    }
                }
            }
            working.clear();

            info!(
                batch = batch_no,
                processed = report.total_processed,
                updated = report.updated_count,
                skipped = report.skipped_count,
                errors = report.error_count,
                "Backfill batch done"
            );

            if page.len() < batch_size {
                break;
            }
        }

        info!(
            dry_run = options.dry_run,
            processed = report.total_processed,
            updated = report.updated_count,
            skipped = report.skipped_count,
            errors = report.error_count,
            "Backfill finished"
        );
        Ok(report)
    }

    async fn process(
        &self,
        record: &CachedRawResponse,
        session: &mut dyn BackfillSession,
        working: &mut WorkingSet,
        options: &BackfillOptions,
    ) -> Result<Outcome, ItemError> {
        if !record.is_success() {
            return Ok(Outcome::Skipped("cached not-found response"));
        }
        let extractor = self
            .extractors
            .get(&record.provider)
            .ok_or_else(|| ItemError::UnknownProvider(record.provider.clone()))?;

        let payload = record.payload()?;
        let Some(headword) = extractor.headword(&payload)? else {
            return Ok(Outcome::Skipped("payload has no headword"));
        };
        let fields = extractor.extract(&payload)?;
        if fields.is_empty() {
            return Ok(Outcome::Skipped("no derived fields"));
        }

        let key = (normalize_text(&headword), options.language.clone());
        let target = match working.get(&key) {
            Some(target) => target.clone(),
            None => match session.find_target(&key.0, &key.1).await? {
                Some(target) => target,
                None => return Ok(Outcome::Skipped("word not found")),
            },
        };
        if target.has_word_family {
            working.insert(key, target);
            return Ok(Outcome::Skipped("already backfilled"));
        }

        if !options.dry_run {
            let provenance = format!("backfill:{}", extractor.provider());
            session.apply(&target, &fields, &provenance).await?;
        }
        working.insert(
            key,
            BackfillTarget {
                has_word_family: true,
                ..target
            },
        );
        Ok(Outcome::Updated)
    }
}
