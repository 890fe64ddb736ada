use crate::handlers;
use crate::projector::RetrievalProjector;
use axum::{http::Method, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct ApiServer {
    projector: Arc<RetrievalProjector>,
}

impl ApiServer {
    #[must_use]
    pub const fn new(projector: Arc<RetrievalProjector>) -> Self {
        Self { projector }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(Any);

        Router::new()
            .route("/movers", get(handlers::list_movers))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.projector.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Web API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::Value;
    use top_movers_data::{InMemoryWinnerStore, WinnerRecord};
    use tower::ServiceExt;

    fn record(day: u32, ticker: &str) -> WinnerRecord {
        WinnerRecord {
            partition: "MOVERS".to_string(),
            trade_date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            ticker: ticker.to_string(),
            percent_change: dec!(4.15),
            closing_price: dec!(312.45),
        }
    }

    fn router(store: Arc<InMemoryWinnerStore>) -> Router {
        let projector = RetrievalProjector::new(store, "MOVERS", 7);
        ApiServer::new(Arc::new(projector)).router()
    }

    async fn get_movers(router: Router) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::get("/movers").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_array() {
        let (status, body) = get_movers(router(Arc::new(InMemoryWinnerStore::new()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Array(vec![]));
    }

    #[tokio::test]
    async fn test_returns_seven_newest_descending() {
        let store = InMemoryWinnerStore::with_records((1..=9).map(|day| record(day, "TSLA")));
        let (status, body) = get_movers(router(Arc::new(store))).await;

        assert_eq!(status, StatusCode::OK);
        let dates: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["Date"].as_str().unwrap())
            .collect();
        assert_eq!(
            dates,
            vec![
                "2025-03-09",
                "2025-03-08",
                "2025-03-07",
                "2025-03-06",
                "2025-03-05",
                "2025-03-04",
                "2025-03-03",
            ]
        );
    }

    #[tokio::test]
    async fn test_items_expose_only_public_fields() {
        let store = InMemoryWinnerStore::with_records([record(7, "TSLA")]);
        let (_, body) = get_movers(router(Arc::new(store))).await;

        let item = body[0].as_object().unwrap();
        let mut keys: Vec<&str> = item.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["ClosingPrice", "Date", "PercentChange", "Ticker"]);
        assert_eq!(item["Ticker"], "TSLA");
        assert!((item["PercentChange"].as_f64().unwrap() - 4.15).abs() < 1e-9);
        assert!((item["ClosingPrice"].as_f64().unwrap() - 312.45).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_store_failure_returns_generic_500() {
        let store = Arc::new(InMemoryWinnerStore::new());
        store.set_fail_reads(true);

        let (status, body) = get_movers(router(store)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "Internal server error"}));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let response = router(Arc::new(InMemoryWinnerStore::new()))
            .oneshot(
                Request::get("/movers")
                    .header(header::ORIGIN, "https://example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let response = router(Arc::new(InMemoryWinnerStore::new()))
            .oneshot(
                Request::options("/movers")
                    .header(header::ORIGIN, "https://example.org")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .unwrap();
        assert!(methods.contains("GET"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = router(Arc::new(InMemoryWinnerStore::new()))
            .oneshot(Request::get("/movers/latest").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
