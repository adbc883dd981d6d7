use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use lexicon_core::ports::Result;
use lexicon_core::{
    new_id, CacheKey, CachedRawResponse, EndpointType, NewRawResponse, RawResponseStore,
    RepositoryError,
};

use super::rows::RawResponseRow;

const COLUMNS: &str = r#"
    id, provider, endpoint_type, request_identifier, raw_response,
    response_size_bytes, status_code, latency_ms, fetched_at
"#;

/// Postgres-backed raw response log.
pub struct PgRawResponseStore {
    pool: PgPool,
}

impl PgRawResponseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_record(row: RawResponseRow) -> Result<CachedRawResponse> {
    row.try_into().map_err(RepositoryError::Storage)
}

#[async_trait]
impl RawResponseStore for PgRawResponseStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedRawResponse>> {
        let query = format!(
            r#"
            SELECT {COLUMNS}
            FROM lexicon.cached_raw_responses
            WHERE provider = $1 AND endpoint_type = $2 AND request_identifier = $3
            "#
        );
        let row = sqlx::query_as::<_, RawResponseRow>(&query)
            .bind(key.provider.as_str())
            .bind(key.endpoint_type.as_str())
            .bind(&key.request_identifier)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        row.map(into_record).transpose()
    }

    async fn upsert(&self, response: NewRawResponse) -> Result<CachedRawResponse> {
        let size = response.response_size_bytes();
        let query = format!(
            r#"
            INSERT INTO lexicon.cached_raw_responses (
                id, provider, endpoint_type, request_identifier, raw_response,
                response_size_bytes, status_code, latency_ms, fetched_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (provider, endpoint_type, request_identifier) DO UPDATE
            SET raw_response = EXCLUDED.raw_response,
                response_size_bytes = EXCLUDED.response_size_bytes,
                status_code = EXCLUDED.status_code,
                latency_ms = EXCLUDED.latency_ms,
                fetched_at = EXCLUDED.fetched_at
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, RawResponseRow>(&query)
            .bind(new_id())
            .bind(response.key.provider.as_str())
            .bind(response.key.endpoint_type.as_str())
            .bind(&response.key.request_identifier)
            .bind(&response.raw_response)
            .bind(size)
            .bind(i32::from(response.status_code))
            .bind(response.latency_ms)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        into_record(row)
    }

    async fn page_after(
        &self,
        endpoint_type: EndpointType,
        after: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<CachedRawResponse>> {
        let query = format!(
            r#"
            SELECT {COLUMNS}
            FROM lexicon.cached_raw_responses
            WHERE endpoint_type = $1
              AND ($2::uuid IS NULL OR id > $2)
            ORDER BY id
            LIMIT $3
            "#
        );
        let rows = sqlx::query_as::<_, RawResponseRow>(&query)
            .bind(endpoint_type.as_str())
            .bind(after)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        rows.into_iter().map(into_record).collect()
    }

    async fn count(&self) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lexicon.cached_raw_responses")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
