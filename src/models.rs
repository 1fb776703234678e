// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub user_id: String,
    pub symbol: String,
    pub company: String,
    pub added_at: DateTime<Utc>,
}

// Transient per-request quote data; None fields mean the fetch failed or the
// provider is not configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSnapshot {
    pub symbol: String,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
}

impl QuoteSnapshot {
    pub fn empty(symbol: String) -> Self {
        Self {
            symbol,
            price: None,
            change: None,
            change_percent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistStockCard {
    pub symbol: String,
    pub company: String,
    pub added_at: DateTime<Utc>,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
}

impl WatchlistStockCard {
    pub fn with_quote(entry: WatchlistEntry, quote: &QuoteSnapshot) -> Self {
        Self {
            symbol: entry.symbol,
            company: entry.company,
            added_at: entry.added_at,
            price: quote.price,
            change: quote.change,
            change_percent: quote.change_percent,
        }
    }

    pub fn without_quote(entry: WatchlistEntry) -> Self {
        Self {
            symbol: entry.symbol,
            company: entry.company,
            added_at: entry.added_at,
            price: None,
            change: None,
            change_percent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_has_no_quote_fields() {
        let snapshot = QuoteSnapshot::empty("AAPL".to_string());
        assert_eq!(snapshot.symbol, "AAPL");
        assert!(snapshot.price.is_none());
        assert!(snapshot.change.is_none());
        assert!(snapshot.change_percent.is_none());
    }

    #[test]
    fn action_result_serializes_without_error_on_success() {
        let json = serde_json::to_string(&ActionResult::ok()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);

        let json = serde_json::to_string(&ActionResult::failure("User not found")).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"User not found"}"#);
    }

    #[test]
    fn card_fields_use_camel_case_on_the_wire() {
        let card = WatchlistStockCard {
            symbol: "AAPL".to_string(),
            company: "Apple Inc.".to_string(),
            added_at: Utc::now(),
            price: Some(150.25),
            change: Some(1.5),
            change_percent: Some(1.0),
        };
        let json = serde_json::to_string(&card).unwrap();
        assert!(json.contains(r#""changePercent":1.0"#));
        assert!(json.contains(r#""addedAt""#));
    }
}
