//! PostgreSQL adapter round trips.
//!
//! Requires a reachable database:
//!   TEST_DATABASE_URL=postgresql://localhost:5432/lexicon_test \
//!     cargo test --features database --test postgres_repository -- --ignored

#![cfg(feature = "database")]

use uuid::Uuid;

use lexicon::backfill::{BackfillSession, BackfillStore, DerivedFields};
use lexicon::core::{
    CacheKey, EndpointType, ExampleData, NewRawResponse, ProviderSource, PronunciationData,
    RawResponseStore, RepositoryError, SenseData, Word, WordData, WordRepository,
};
use lexicon::persistence::{DatabaseConfig, DatabaseManager};

async fn get_test_db() -> DatabaseManager {
    let config = DatabaseConfig {
        database_url: std::env::var("TEST_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .unwrap_or_else(|_| "postgresql:///lexicon_test".into()),
        max_connections: 4,
        ..DatabaseConfig::default()
    };
    let db = DatabaseManager::new(config)
        .await
        .expect("Failed to connect to database");
    db.run_migrations().await.expect("migrations");
    db
}

/// Headword no other test run will use.
fn unique_text() -> String {
    format!("zz{}", Uuid::now_v7().simple())
}

fn sample_word(text: &str) -> Word {
    let mut word = Word::new(WordData::new(text, "en", "azvocab"));
    word.add_pronunciation(PronunciationData {
        ipa: Some("/rʌn/".into()),
        audio_url: Some("https://cdn.azvocab.test/audio/run-uk.mp3".into()),
        region: Some("UK".into()),
    });
    let sense_id = word
        .add_sense(SenseData {
            part_of_speech: "verb".into(),
            definition: "move fast on foot".into(),
            source: "azvocab".into(),
            external_id: Some("s1".into()),
            ..Default::default()
        })
        .unwrap()
        .id();
    word.add_example(sense_id, ExampleData::new("She runs every day."))
        .unwrap();
    word.add_sense(SenseData {
        part_of_speech: "noun".into(),
        definition: "an act of running".into(),
        source: "azvocab".into(),
        ..Default::default()
    })
    .unwrap();
    word
}

async fn cleanup(db: &DatabaseManager, word: &Word) {
    db.word_repository().delete(word).await.ok();
}

#[tokio::test]
#[ignore]
async fn test_save_and_load_full_graph() {
    let db = get_test_db().await;
    let repo = db.word_repository();
    let text = unique_text();
    let word = sample_word(&text);

    repo.save(&word).await.unwrap();
    let loaded = repo
        .find_by_normalized_text(&text.to_uppercase(), "en")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(loaded.id(), word.id());
    assert_eq!(loaded.pronunciations().len(), 1);
    assert_eq!(loaded.pronunciations()[0].region(), Some("UK"));
    let senses = loaded.senses_in_display_order();
    assert_eq!(senses.len(), 2);
    assert_eq!(senses[0].sense_index(), 0);
    assert_eq!(senses[0].external_id(), Some("s1"));
    assert_eq!(senses[0].examples().len(), 1);
    assert_eq!(senses[1].sense_index(), 1);
    assert!(repo.exists(&text, "en").await.unwrap());

    cleanup(&db, &word).await;
    assert!(!repo.exists(&text, "en").await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_removed_children_are_deleted() {
    let db = get_test_db().await;
    let repo = db.word_repository();
    let text = unique_text();
    let word = sample_word(&text);
    repo.save(&word).await.unwrap();

    let mut loaded = repo.find_by_id(word.id()).await.unwrap().unwrap();
    let first = loaded.senses_in_display_order()[0].id();
    assert!(loaded.remove_sense(first));
    repo.save(&loaded).await.unwrap();

    let reloaded = repo.find_by_id(word.id()).await.unwrap().unwrap();
    assert_eq!(reloaded.senses().len(), 1);
    assert_eq!(reloaded.example_count(), 0);

    cleanup(&db, &word).await;
}

#[tokio::test]
#[ignore]
async fn test_second_identity_for_same_text_conflicts() {
    let db = get_test_db().await;
    let repo = db.word_repository();
    let text = unique_text();
    let word = sample_word(&text);
    repo.save(&word).await.unwrap();

    let twin = Word::new(WordData::new(&text, "en", "oxford"));
    let err = repo.save(&twin).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    cleanup(&db, &word).await;
}

#[tokio::test]
#[ignore]
async fn test_find_by_prefix_escapes_wildcards() {
    let db = get_test_db().await;
    let repo = db.word_repository();
    let stem = unique_text();
    let words: Vec<Word> = ["a", "b", "c"]
        .iter()
        .map(|suffix| Word::new(WordData::new(format!("{stem}{suffix}"), "en", "azvocab")))
        .collect();
    for word in &words {
        repo.save(word).await.unwrap();
    }

    let found = repo.find_by_prefix(&stem, "en", 2).await.unwrap();
    let texts: Vec<&str> = found.iter().map(|w| w.normalized_text()).collect();
    assert_eq!(texts, vec![format!("{stem}a"), format!("{stem}b")]);
    assert!(repo
        .find_by_prefix(&format!("{stem}%"), "en", 10)
        .await
        .unwrap()
        .is_empty());

    for word in &words {
        cleanup(&db, word).await;
    }
}

#[tokio::test]
#[ignore]
async fn test_cache_upsert_keeps_identity() {
    let db = get_test_db().await;
    let cache = db.raw_response_store();
    let key = CacheKey::new(ProviderSource::AzVocab, EndpointType::Definition, unique_text());

    let first = cache
        .upsert(NewRawResponse {
            key: key.clone(),
            raw_response: "{}".into(),
            status_code: 404,
            latency_ms: 12,
        })
        .await
        .unwrap();
    let second = cache
        .upsert(NewRawResponse {
            key: key.clone(),
            raw_response: r#"{"headword":"run"}"#.into(),
            status_code: 200,
            latency_ms: 30,
        })
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    let stored = cache.get(&key).await.unwrap().unwrap();
    assert_eq!(stored.status_code, 200);
    assert_eq!(stored.response_size_bytes, 18);

    sqlx::query("DELETE FROM lexicon.cached_raw_responses WHERE id = $1")
        .bind(first.id)
        .execute(db.pool())
        .await
        .ok();
}

#[tokio::test]
#[ignore]
async fn test_backfill_session_writes_derived_fields() {
    let db = get_test_db().await;
    let repo = db.word_repository();
    let text = unique_text();
    let word = sample_word(&text);
    repo.save(&word).await.unwrap();

    let mut session = db.backfill_store().open_session().await.unwrap();
    let target = session.find_target(&text, "en").await.unwrap().unwrap();
    assert!(!target.has_word_family);

    let fields = DerivedFields {
        inflections: Some(vec![format!("{text}s")]),
        frequency_rank: Some(7),
        ..Default::default()
    };
    session
        .apply(&target, &fields, "backfill:azvocab")
        .await
        .unwrap();

    let target = session.find_target(&text, "en").await.unwrap().unwrap();
    assert!(target.has_word_family);
    drop(session);

    let loaded = repo.find_by_id(word.id()).await.unwrap().unwrap();
    assert_eq!(loaded.word_family().map(|f| f.is_empty()), Some(true));
    assert_eq!(loaded.frequency_rank(), Some(7));
    assert_eq!(loaded.provenance(), Some("backfill:azvocab"));
    assert_eq!(loaded.senses().len(), 2);

    cleanup(&db, &word).await;
}
