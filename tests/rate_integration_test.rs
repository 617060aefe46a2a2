use httpmock::prelude::*;
use small_calc::core::{ConversionData, ConversionMode, RateOrigin, RateStore, StoredRate};
use small_calc::{
    CalcError, CalculatorSession, FileRateStore, FrankfurterClient, RateFeed, RateRepository,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_test::assert_ok;

const TIMEOUT: Duration = Duration::from_secs(2);

fn repository(
    server: &MockServer,
    temp_dir: &TempDir,
) -> RateRepository<FrankfurterClient, FileRateStore> {
    let client = FrankfurterClient::new(&server.base_url(), TIMEOUT).unwrap();
    let store = FileRateStore::new(temp_dir.path().join("cache/exchange_rate.json"));
    RateRepository::new(client, store, "EUR", "JPY", TIMEOUT)
}

#[tokio::test]
async fn test_live_rate_is_fetched_and_cached() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start_async().await;

    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/latest")
                .query_param("from", "EUR")
                .query_param("to", "JPY");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "amount": 1.0,
                    "base": "EUR",
                    "date": "2024-05-17",
                    "rates": { "JPY": 169.42 }
                }));
        })
        .await;

    let repository = repository(&server, &temp_dir);
    let data = assert_ok!(repository.get_current_rate().await);

    api_mock.assert_async().await;
    assert_eq!(data.origin, RateOrigin::Live);
    assert_eq!(data.rate.value(), 169.42);
    assert_eq!(data.rate.date(), "2024-05-17");

    let store = FileRateStore::new(temp_dir.path().join("cache/exchange_rate.json"));
    let stored = store.load_last().await.unwrap().unwrap();
    assert_eq!(stored.rate, 169.42);
    assert_eq!(stored.date, "2024-05-17");
}

#[tokio::test]
async fn test_server_error_falls_back_to_cached_rate() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/latest");
            then.status(503);
        })
        .await;

    let store = FileRateStore::new(temp_dir.path().join("cache/exchange_rate.json"));
    let cached = StoredRate {
        rate: 158.5,
        date: "2024-05-10".to_string(),
        saved_at: chrono::Utc::now(),
    };
    assert_ok!(store.save(&cached).await);

    let data = repository(&server, &temp_dir)
        .get_current_rate()
        .await
        .unwrap();

    assert_eq!(data.origin, RateOrigin::Cached);
    assert_eq!(data.rate.value(), 158.5);
    assert_eq!(data.rate.date(), "2024-05-10");
}

#[tokio::test]
async fn test_no_live_and_no_cache_is_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/latest");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "amount": 1.0,
                    "base": "EUR",
                    "date": "2024-05-17",
                    "rates": { "USD": 1.08 }
                }));
        })
        .await;

    let err = repository(&server, &temp_dir)
        .get_current_rate()
        .await
        .unwrap_err();

    assert!(matches!(err, CalcError::RateUnavailableError { .. }));
}

#[tokio::test]
async fn test_feed_updates_session_overlay() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/latest");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "amount": 1.0,
                    "base": "EUR",
                    "date": "2024-05-17",
                    "rates": { "JPY": 160.0 }
                }));
        })
        .await;

    let mut feed = RateFeed::spawn(
        Arc::new(repository(&server, &temp_dir)),
        ConversionData::fallback(170.0),
        None,
    );

    let mut session = CalculatorSession::new(
        "EUR",
        "JPY",
        feed.subscribe(),
        ConversionMode::SourceToTarget,
    );
    assert_ok!(session.enter("2 + 3 ="));
    assert_eq!(session.display(), "5");

    assert!(feed.changed().await);
    assert_eq!(session.rate().origin, RateOrigin::Live);
    assert_eq!(session.converted().as_deref(), Some("800"));
    assert_eq!(session.rate_banner(), "1 EUR = 160 JPY");

    session.cycle_mode();
    assert_eq!(session.converted().as_deref(), Some("0.03"));
    assert_eq!(session.display(), "5");
}
