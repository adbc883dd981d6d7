use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};

use lexicon_core::ports::Result;
use lexicon_core::RepositoryError;

use crate::backfill::{BackfillSession, BackfillStore, BackfillTarget, DerivedFields};

/// Backfill sessions over a dedicated pooled connection.
pub struct PgBackfillStore {
    pool: PgPool,
}

impl PgBackfillStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BackfillStore for PgBackfillStore {
    async fn open_session(&self) -> Result<Box<dyn BackfillSession>> {
        let conn = self.pool.acquire().await.map_err(|e| anyhow!(e))?;
        Ok(Box::new(PgBackfillSession { conn }))
    }
}

struct PgBackfillSession {
    conn: PoolConnection<Postgres>,
}

#[derive(sqlx::FromRow)]
struct TargetRow {
    id: uuid::Uuid,
    normalized_text: String,
    language: String,
    has_word_family: bool,
}

#[async_trait]
impl BackfillSession for PgBackfillSession {
    async fn find_target(
        &mut self,
        normalized_text: &str,
        language: &str,
    ) -> Result<Option<BackfillTarget>> {
        let row = sqlx::query_as::<_, TargetRow>(
            r#"
            SELECT id, normalized_text, language, word_family IS NOT NULL AS has_word_family
            FROM lexicon.words
            WHERE normalized_text = $1 AND language = $2
            "#,
        )
        .bind(normalized_text)
        .bind(language)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(|e| anyhow!(e))?;

        Ok(row.map(|r| BackfillTarget {
            word_id: r.id,
            normalized_text: r.normalized_text,
            language: r.language,
            has_word_family: r.has_word_family,
        }))
    }

    async fn apply(
        &mut self,
        target: &BackfillTarget,
        fields: &DerivedFields,
        provenance: &str,
    ) -> Result<()> {
        let word_family = fields.word_family.clone().unwrap_or_default();
        let result = sqlx::query(
            r#"
            UPDATE lexicon.words
            SET word_family = $2,
                inflections = COALESCE($3, inflections),
                frequency_rank = COALESCE($4, frequency_rank),
                frequency_count = COALESCE($5, frequency_count),
                provenance = $6,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(target.word_id)
        .bind(Json(&word_family))
        .bind(fields.inflections.as_ref().map(Json))
        .bind(fields.frequency_rank)
        .bind(fields.frequency_count)
        .bind(provenance)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| anyhow!(e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(target.word_id.to_string()));
        }
        Ok(())
    }
}
