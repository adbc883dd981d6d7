//! Cache-aside behaviour of `CachedHttpClient` against a scripted transport.

mod support;

use std::sync::Arc;

use chrono::Utc;

use lexicon::core::{
    new_id, CacheKey, CachedRawResponse, EndpointType, ProviderSource, RawResponseStore,
};
use lexicon::error::ProviderError;
use lexicon::http::CachedHttpClient;
use lexicon::persistence::InMemoryRawResponseStore;
use support::ScriptedTransport;

const URL: &str = "https://azvocab.test/v1/entries/d1";

fn client(
    transport: ScriptedTransport,
) -> (CachedHttpClient, Arc<ScriptedTransport>, InMemoryRawResponseStore) {
    let transport = Arc::new(transport);
    let cache = InMemoryRawResponseStore::new();
    let client = CachedHttpClient::new(
        ProviderSource::AzVocab,
        transport.clone(),
        Arc::new(cache.clone()),
    );
    (client, transport, cache)
}

fn key() -> CacheKey {
    CacheKey::new(ProviderSource::AzVocab, EndpointType::Definition, "d1")
}

#[tokio::test]
async fn test_miss_stores_and_hit_makes_no_call() {
    let (client, transport, cache) =
        client(ScriptedTransport::new().respond(URL, 200, r#"{"headword":"run"}"#));

    let first = client.definition("d1", URL).await.unwrap();
    let second = client.definition("d1", URL).await.unwrap();

    assert_eq!(first.as_deref(), Some(r#"{"headword":"run"}"#));
    assert_eq!(second, first);
    assert_eq!(transport.total_calls(), 1);

    let record = cache.get(&key()).await.unwrap().unwrap();
    assert_eq!(record.provider, "azvocab");
    assert_eq!(record.status_code, 200);
    assert_eq!(record.response_size_bytes, 18);
}

#[tokio::test]
async fn test_not_found_is_cached_as_none() {
    let (client, transport, cache) = client(ScriptedTransport::new());

    assert_eq!(client.definition("d1", URL).await.unwrap(), None);
    assert_eq!(client.definition("d1", URL).await.unwrap(), None);

    assert_eq!(transport.total_calls(), 1);
    assert_eq!(cache.get(&key()).await.unwrap().unwrap().status_code, 404);
}

#[tokio::test]
async fn test_server_error_is_not_cached() {
    let (client, transport, cache) =
        client(ScriptedTransport::new().respond(URL, 503, "maintenance"));

    let err = client.definition("d1", URL).await.unwrap_err();
    assert!(matches!(err, ProviderError::Upstream { status: 503, .. }));

    client.definition("d1", URL).await.unwrap_err();
    assert_eq!(transport.total_calls(), 2);
    assert_eq!(cache.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_rate_limit_is_not_cached() {
    let (client, _transport, cache) =
        client(ScriptedTransport::new().respond(URL, 429, "slow down"));

    let err = client.definition("d1", URL).await.unwrap_err();
    assert!(matches!(err, ProviderError::RateLimited));
    assert_eq!(cache.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_transport_failure_is_not_cached() {
    let (client, _transport, cache) = client(ScriptedTransport::new().fail(URL));

    let err = client.definition("d1", URL).await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
    assert_eq!(cache.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_seeded_not_found_record_short_circuits() {
    let (client, transport, cache) =
        client(ScriptedTransport::new().respond(URL, 200, r#"{"headword":"run"}"#));
    cache
        .insert_record(CachedRawResponse {
            id: new_id(),
            provider: "azvocab".into(),
            endpoint_type: EndpointType::Definition,
            request_identifier: "d1".into(),
            raw_response: r#"{"error":"gone"}"#.into(),
            response_size_bytes: 16,
            status_code: 410,
            latency_ms: 5,
            fetched_at: Utc::now(),
        })
        .await;

    assert_eq!(client.definition("d1", URL).await.unwrap(), None);
    assert_eq!(transport.total_calls(), 0);
}

#[tokio::test]
async fn test_search_and_definition_are_keyed_separately() {
    let (client, transport, cache) = client(
        ScriptedTransport::new()
            .respond("https://azvocab.test/v1/search?q=run", 200, r#"{"data":[]}"#)
            .respond("https://azvocab.test/v1/entries/run", 200, r#"{"headword":"run"}"#),
    );

    client
        .search("run", "https://azvocab.test/v1/search?q=run")
        .await
        .unwrap();
    client
        .definition("run", "https://azvocab.test/v1/entries/run")
        .await
        .unwrap();

    assert_eq!(transport.total_calls(), 2);
    assert_eq!(cache.count().await.unwrap(), 2);
}
