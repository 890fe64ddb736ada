//! End-to-end ingestion against a mock provider and the in-memory store.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use serde_json::json;
use top_movers_core::{IngestionConfig, PacingConfig, ProviderConfig};
use top_movers_data::{InMemoryWinnerStore, WinnerStore};
use top_movers_ingestion::{IngestionError, IngestionOrchestrator};
use top_movers_market_data::{DailyQuoteFetcher, FetchError, PacedClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// 2025-03-07T21:00:00Z
const CLOSE_MS: i64 = 1_741_381_200_000;

const BARS: [(&str, f64, f64); 6] = [
    ("AAPL", 230.0, 232.3),
    ("MSFT", 400.0, 394.0),
    ("GOOGL", 170.0, 171.7),
    ("AMZN", 200.0, 203.0),
    ("TSLA", 300.0, 312.45),
    ("NVDA", 110.0, 107.8),
];

async fn mount_prev(server: &MockServer, ticker: &str, open: f64, close: f64) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/aggs/ticker/{ticker}/prev")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ticker": ticker,
            "status": "OK",
            "resultsCount": 1,
            "results": [{"o": open, "c": close, "t": CLOSE_MS}]
        })))
        .mount(server)
        .await;
}

fn orchestrator(server: &MockServer, store: Arc<InMemoryWinnerStore>) -> IngestionOrchestrator {
    let provider = ProviderConfig {
        base_url: server.uri(),
        api_key: Some(SecretString::from("integration-key")),
        ..ProviderConfig::default()
    };
    let client = PacedClient::new(&provider, &PacingConfig::immediate()).unwrap();
    let fetcher = Arc::new(DailyQuoteFetcher::new(client));
    IngestionOrchestrator::new(fetcher, store, &IngestionConfig::default()).unwrap()
}

#[tokio::test]
async fn test_ingest_then_short_circuit() {
    let server = MockServer::start().await;
    for (ticker, open, close) in BARS {
        mount_prev(&server, ticker, open, close).await;
    }
    let store = Arc::new(InMemoryWinnerStore::new());
    let orchestrator = orchestrator(&server, store.clone());

    let first = orchestrator.run().await.unwrap();
    assert!(first.stored);
    assert_eq!(first.success_count, 6);
    let item = first.item.as_ref().unwrap();
    assert_eq!(item.ticker, "TSLA");
    assert_eq!(item.percent_change, dec!(4.15));
    assert_eq!(item.closing_price, dec!(312.45));
    assert_eq!(server.received_requests().await.unwrap().len(), 6);

    let second = orchestrator.run().await.unwrap();
    assert!(second.cached);
    assert_eq!(second.message.as_deref(), Some("already_stored"));
    assert_eq!(server.received_requests().await.unwrap().len(), 7);

    let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
    let stored = store.get("MOVERS", date).await.unwrap().unwrap();
    assert_eq!(stored.ticker, "TSLA");
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_provider_outage_on_one_ticker_writes_nothing() {
    let server = MockServer::start().await;
    for (ticker, open, close) in BARS {
        if ticker == "AMZN" {
            Mock::given(method("GET"))
                .and(path("/v2/aggs/ticker/AMZN/prev"))
                .respond_with(ResponseTemplate::new(503))
                .mount(&server)
                .await;
        } else {
            mount_prev(&server, ticker, open, close).await;
        }
    }
    let store = Arc::new(InMemoryWinnerStore::new());

    let err = orchestrator(&server, store.clone()).run().await.unwrap_err();

    assert!(matches!(err, IngestionError::Fetch(_)));
    assert!(store.is_empty());
    // three tickers once each, AMZN four times, TSLA and NVDA never
    assert_eq!(server.received_requests().await.unwrap().len(), 7);
}

#[tokio::test]
async fn test_unrepresentable_percent_change_fails_without_panicking() {
    let server = MockServer::start().await;
    for (ticker, open, close) in BARS {
        if ticker == "MSFT" {
            mount_prev(&server, ticker, 1e-20, 1e9).await;
        } else {
            mount_prev(&server, ticker, open, close).await;
        }
    }
    let store = Arc::new(InMemoryWinnerStore::new());

    let err = orchestrator(&server, store.clone()).run().await.unwrap_err();

    assert!(matches!(
        err,
        IngestionError::Fetch(FetchError::MalformedQuote { ref ticker, .. }) if ticker == "MSFT"
    ));
    assert!(store.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_report_json_shape() {
    let server = MockServer::start().await;
    for (ticker, open, close) in BARS {
        mount_prev(&server, ticker, open, close).await;
    }
    let report = orchestrator(&server, Arc::new(InMemoryWinnerStore::new()))
        .run()
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["stored"], true);
    assert_eq!(json["tradingDate"], "2025-03-07");
    assert_eq!(json["item"]["Ticker"], "TSLA");
    assert_eq!(json["item"]["Date"], "2025-03-07");
    assert!((json["item"]["PercentChange"].as_f64().unwrap() - 4.15).abs() < 1e-9);
    assert!(json["item"].get("partition").is_none());
}
