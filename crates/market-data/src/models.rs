//! Wire types for the provider's daily aggregates endpoints.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

/// Status value reported by a complete aggregates response.
pub const STATUS_OK: &str = "OK";

/// Response body of `/v2/aggs/ticker/{ticker}/prev` and `/range/...`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregatesResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub results_count: Option<u64>,
    #[serde(default)]
    pub results: Option<Vec<AggregateBar>>,
}

impl AggregatesResponse {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some(STATUS_OK)
    }

    /// Bars in provider order, empty when the field is missing.
    #[must_use]
    pub fn bars(&self) -> &[AggregateBar] {
        self.results.as_deref().unwrap_or_default()
    }
}

/// One daily bar. Only the fields the service consumes are modelled.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AggregateBar {
    #[serde(rename = "o", default)]
    pub open: Option<f64>,
    #[serde(rename = "c", default)]
    pub close: Option<f64>,
    /// Bar start, milliseconds since the Unix epoch.
    #[serde(rename = "t", default)]
    pub timestamp_ms: Option<i64>,
}

impl AggregateBar {
    /// UTC calendar date of the bar start.
    #[must_use]
    pub fn trading_date(&self) -> Option<NaiveDate> {
        self.timestamp_ms
            .and_then(DateTime::from_timestamp_millis)
            .map(|ts| ts.date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_prev_response() {
        let body = r#"{
            "ticker": "TSLA",
            "queryCount": 1,
            "resultsCount": 1,
            "adjusted": true,
            "results": [{"T": "TSLA", "v": 1.0, "o": 240.0, "c": 249.96, "h": 251.0, "l": 239.5, "t": 1741377600000}],
            "status": "OK",
            "request_id": "abc"
        }"#;

        let response: AggregatesResponse = serde_json::from_str(body).unwrap();
        assert!(response.is_ok());
        assert_eq!(response.results_count, Some(1));
        let bar = &response.bars()[0];
        assert_eq!(bar.open, Some(240.0));
        assert_eq!(bar.close, Some(249.96));
        assert_eq!(
            bar.trading_date(),
            NaiveDate::from_ymd_opt(2025, 3, 7)
        );
    }

    #[test]
    fn test_missing_fields_are_tolerated() {
        let response: AggregatesResponse =
            serde_json::from_str(r#"{"status": "ERROR"}"#).unwrap();
        assert!(!response.is_ok());
        assert!(response.bars().is_empty());

        let bar: AggregateBar = serde_json::from_str(r#"{"o": 1.0}"#).unwrap();
        assert_eq!(bar.close, None);
        assert_eq!(bar.trading_date(), None);
    }

    #[test]
    fn test_trading_date_uses_utc() {
        // 2025-03-07T23:30:00Z
        let bar = AggregateBar {
            open: None,
            close: None,
            timestamp_ms: Some(1_741_390_200_000),
        };
        assert_eq!(bar.trading_date(), NaiveDate::from_ymd_opt(2025, 3, 7));
    }
}
