//! `WordRepository` over the `lexicon` schema.
//!
//! `save` loads the stored graph under `FOR UPDATE`, runs the mapper to get
//! the exact change set, and applies it inside one transaction: deletes
//! first (examples, senses, pronunciations), then the word row, then child
//! inserts and updates. The `(word_id, sense_index)` constraint is deferred
//! so renumbered senses may be written in any order.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use lexicon_core::ports::Result;
use lexicon_core::{normalize_text, RepositoryError, Word, WordRepository};

use super::is_unique_violation;
use super::rows::{ExampleRow, PronunciationRow, SenseRow, WordRow};
use crate::persistence::entity::{ExampleEntity, PronunciationEntity, SenseEntity, WordEntity};
use crate::persistence::mapper::{to_domain, to_entity};
use crate::persistence::sync::{ChangeSet, EntityKind, WriteOp};

const WORD_COLUMNS: &str = r#"
    id, text, normalized_text, language, source,
    frequency_rank, frequency_count, inflections, word_family, provenance,
    created_at, updated_at
"#;

pub struct PgWordRepository {
    pool: PgPool,
}

impl PgWordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn storage(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(anyhow!(e))
}

/// Load every child row of a word and assemble the graph.
async fn load_graph(conn: &mut PgConnection, row: WordRow) -> Result<WordEntity> {
    let pronunciations = sqlx::query_as::<_, PronunciationRow>(
        r#"
        SELECT id, ipa, audio_url, region
        FROM lexicon.pronunciations
        WHERE word_id = $1
        ORDER BY id
        "#,
    )
    .bind(row.id)
    .fetch_all(&mut *conn)
    .await
    .map_err(storage)?;

    let senses = sqlx::query_as::<_, SenseRow>(
        r#"
        SELECT id, part_of_speech, definition, short_definition, localized_definition,
               sense_index, source, cefr_level, relations, external_id
        FROM lexicon.word_senses
        WHERE word_id = $1
        ORDER BY sense_index, id
        "#,
    )
    .bind(row.id)
    .fetch_all(&mut *conn)
    .await
    .map_err(storage)?;

    let examples = sqlx::query_as::<_, ExampleRow>(
        r#"
        SELECT e.id, e.sense_id, e.text, e.translation, e.display_order, e.external_id
        FROM lexicon.examples e
        JOIN lexicon.word_senses s ON s.id = e.sense_id
        WHERE s.word_id = $1
        ORDER BY e.display_order, e.id
        "#,
    )
    .bind(row.id)
    .fetch_all(&mut *conn)
    .await
    .map_err(storage)?;

    Ok(row.into_entity(pronunciations, senses, examples))
}

async fn find_row_by_id(conn: &mut PgConnection, id: Uuid, lock: bool) -> Result<Option<WordRow>> {
    let query = format!(
        "SELECT {WORD_COLUMNS} FROM lexicon.words WHERE id = $1{}",
        if lock { " FOR UPDATE" } else { "" }
    );
    sqlx::query_as::<_, WordRow>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage)
}

async fn find_row_by_text(
    conn: &mut PgConnection,
    normalized: &str,
    language: &str,
) -> Result<Option<WordRow>> {
    let query = format!(
        "SELECT {WORD_COLUMNS} FROM lexicon.words WHERE normalized_text = $1 AND language = $2"
    );
    sqlx::query_as::<_, WordRow>(&query)
        .bind(normalized)
        .bind(language)
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage)
}

/// Escape LIKE wildcards so a prefix matches literally.
fn like_prefix(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl WordRepository for PgWordRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Word>> {
        let mut conn = self.pool.acquire().await.map_err(storage)?;
        let Some(row) = find_row_by_id(&mut conn, id, false).await? else {
            return Ok(None);
        };
        let entity = load_graph(&mut conn, row).await?;
        Ok(Some(to_domain(&entity)))
    }

    async fn find_by_normalized_text(&self, text: &str, language: &str) -> Result<Option<Word>> {
        let mut conn = self.pool.acquire().await.map_err(storage)?;
        let normalized = normalize_text(text);
        let Some(row) = find_row_by_text(&mut conn, &normalized, language).await? else {
            return Ok(None);
        };
        let entity = load_graph(&mut conn, row).await?;
        Ok(Some(to_domain(&entity)))
    }

    async fn find_by_prefix(
        &self,
        prefix: &str,
        language: &str,
        limit: usize,
    ) -> Result<Vec<Word>> {
        let mut conn = self.pool.acquire().await.map_err(storage)?;
        let query = format!(
            r#"
            SELECT {WORD_COLUMNS}
            FROM lexicon.words
            WHERE language = $1 AND normalized_text LIKE $2 ESCAPE '\'
            ORDER BY normalized_text
            LIMIT $3
            "#
        );
        let rows = sqlx::query_as::<_, WordRow>(&query)
            .bind(language)
            .bind(like_prefix(&normalize_text(prefix)))
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&mut *conn)
            .await
            .map_err(storage)?;

        let mut words = Vec::with_capacity(rows.len());
        for row in rows {
            let entity = load_graph(&mut conn, row).await?;
            words.push(to_domain(&entity));
        }
        Ok(words)
    }

    async fn save(&self, word: &Word) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let existing = match find_row_by_id(&mut tx, word.id(), true).await? {
            Some(row) => Some(load_graph(&mut tx, row).await?),
            None => None,
        };
        let (entity, changes) = to_entity(word, existing, Utc::now());

        if changes.is_empty() {
            debug!(word_id = %word.id(), "Word unchanged, nothing to write");
            tx.rollback().await.map_err(storage)?;
            return Ok(());
        }

        let conflict = |e: sqlx::Error| {
            if is_unique_violation(&e) {
                RepositoryError::Conflict(format!("{}/{}", entity.normalized_text, entity.language))
            } else {
                storage(e)
            }
        };

        apply_changes(&mut tx, &entity, &changes)
            .await
            .map_err(conflict)?;
        tx.commit().await.map_err(conflict)?;

        debug!(word_id = %entity.id, writes = changes.len(), "Word saved");
        Ok(())
    }

    async fn delete(&self, word: &Word) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lexicon.words WHERE id = $1")
            .bind(word.id())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, text: &str, language: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM lexicon.words
                WHERE normalized_text = $1 AND language = $2
            )
            "#,
        )
        .bind(normalize_text(text))
        .bind(language)
        .fetch_one(&self.pool)
        .await
        .map_err(storage)
    }
}

// ── Change application ────────────────────────────────────────

async fn apply_changes(
    conn: &mut PgConnection,
    entity: &WordEntity,
    changes: &ChangeSet,
) -> std::result::Result<(), sqlx::Error> {
    for (kind, table) in [
        (EntityKind::Example, "lexicon.examples"),
        (EntityKind::Sense, "lexicon.word_senses"),
        (EntityKind::Pronunciation, "lexicon.pronunciations"),
    ] {
        let ids = changes.deletes(kind);
        if ids.is_empty() {
            continue;
        }
        sqlx::query(&format!("DELETE FROM {table} WHERE id = ANY($1)"))
            .bind(&ids)
            .execute(&mut *conn)
            .await?;
    }

    if changes.contains(WriteOp::Insert(EntityKind::Word, entity.id)) {
        insert_word(conn, entity).await?;
    } else if changes.contains(WriteOp::Update(EntityKind::Word, entity.id)) {
        update_word(conn, entity).await?;
    }

    let pronunciations: HashMap<Uuid, &PronunciationEntity> =
        entity.pronunciations.iter().map(|p| (p.id, p)).collect();
    let senses: HashMap<Uuid, &SenseEntity> = entity.senses.iter().map(|s| (s.id, s)).collect();
    let examples: HashMap<Uuid, (Uuid, &ExampleEntity)> = entity
        .senses
        .iter()
        .flat_map(|s| s.examples.iter().map(move |e| (e.id, (s.id, e))))
        .collect();

    for op in changes.ops() {
        match *op {
            WriteOp::Insert(EntityKind::Pronunciation, id)
            | WriteOp::Update(EntityKind::Pronunciation, id) => {
                if let Some(p) = pronunciations.get(&id) {
                    upsert_pronunciation(conn, entity.id, p).await?;
                }
            }
            WriteOp::Insert(EntityKind::Sense, id) | WriteOp::Update(EntityKind::Sense, id) => {
                if let Some(s) = senses.get(&id) {
                    upsert_sense(conn, entity.id, s).await?;
                }
            }
            WriteOp::Insert(EntityKind::Example, id) | WriteOp::Update(EntityKind::Example, id) => {
                if let Some((sense_id, e)) = examples.get(&id) {
                    upsert_example(conn, *sense_id, e).await?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

async fn insert_word(conn: &mut PgConnection, w: &WordEntity) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO lexicon.words (
            id, text, normalized_text, language, source,
            frequency_rank, frequency_count, inflections, word_family, provenance,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(w.id)
    .bind(&w.text)
    .bind(&w.normalized_text)
    .bind(&w.language)
    .bind(&w.source)
    .bind(w.frequency_rank)
    .bind(w.frequency_count)
    .bind(w.inflections.as_ref().map(Json))
    .bind(w.word_family.as_ref().map(Json))
    .bind(&w.provenance)
    .bind(w.created_at)
    .bind(w.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn update_word(conn: &mut PgConnection, w: &WordEntity) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE lexicon.words
        SET text = $2, normalized_text = $3, source = $4,
            frequency_rank = $5, frequency_count = $6,
            inflections = $7, word_family = $8, provenance = $9,
            updated_at = $10
        WHERE id = $1
        "#,
    )
    .bind(w.id)
    .bind(&w.text)
    .bind(&w.normalized_text)
    .bind(&w.source)
    .bind(w.frequency_rank)
    .bind(w.frequency_count)
    .bind(w.inflections.as_ref().map(Json))
    .bind(w.word_family.as_ref().map(Json))
    .bind(&w.provenance)
    .bind(w.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn upsert_pronunciation(
    conn: &mut PgConnection,
    word_id: Uuid,
    p: &PronunciationEntity,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO lexicon.pronunciations (id, word_id, ipa, audio_url, region)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE
        SET ipa = EXCLUDED.ipa, audio_url = EXCLUDED.audio_url, region = EXCLUDED.region
        "#,
    )
    .bind(p.id)
    .bind(word_id)
    .bind(&p.ipa)
    .bind(&p.audio_url)
    .bind(&p.region)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn upsert_sense(
    conn: &mut PgConnection,
    word_id: Uuid,
    s: &SenseEntity,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO lexicon.word_senses (
            id, word_id, part_of_speech, definition, short_definition,
            localized_definition, sense_index, source, cefr_level, relations, external_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (id) DO UPDATE
        SET part_of_speech = EXCLUDED.part_of_speech,
            definition = EXCLUDED.definition,
            short_definition = EXCLUDED.short_definition,
            localized_definition = EXCLUDED.localized_definition,
            sense_index = EXCLUDED.sense_index,
            source = EXCLUDED.source,
            cefr_level = EXCLUDED.cefr_level,
            relations = EXCLUDED.relations,
            external_id = EXCLUDED.external_id
        "#,
    )
    .bind(s.id)
    .bind(word_id)
    .bind(&s.part_of_speech)
    .bind(&s.definition)
    .bind(&s.short_definition)
    .bind(&s.localized_definition)
    .bind(s.sense_index)
    .bind(&s.source)
    .bind(&s.cefr_level)
    .bind(Json(&s.relations))
    .bind(&s.external_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn upsert_example(
    conn: &mut PgConnection,
    sense_id: Uuid,
    e: &ExampleEntity,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO lexicon.examples (id, sense_id, text, translation, display_order, external_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO UPDATE
        SET text = EXCLUDED.text,
            translation = EXCLUDED.translation,
            display_order = EXCLUDED.display_order,
            external_id = EXCLUDED.external_id
        "#,
    )
    .bind(e.id)
    .bind(sense_id)
    .bind(&e.text)
    .bind(&e.translation)
    .bind(e.display_order)
    .bind(&e.external_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
