// src/quotes.rs
use crate::error::BoxError;
use crate::models::QuoteSnapshot;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CACHE_TTL: Duration = Duration::from_secs(120);

// Wire format of the provider's /quote endpoint. Every field is optional:
// unknown symbols come back as a structurally valid body with missing values.
#[derive(Deserialize)]
struct QuoteResponse {
    c: Option<f64>,
    d: Option<f64>,
    dp: Option<f64>,
}

// Short-lived per-process cache so repeated views inside the TTL window do
// not re-hit the provider.
struct QuoteCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, QuoteSnapshot)>>,
}

impl QuoteCache {
    fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn get(&self, symbol: &str) -> Option<QuoteSnapshot> {
        let entries = self.entries.lock().ok()?;
        let (stored_at, snapshot) = entries.get(symbol)?;
        if stored_at.elapsed() < self.ttl {
            Some(snapshot.clone())
        } else {
            None
        }
    }

    fn put(&self, snapshot: QuoteSnapshot) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(snapshot.symbol.clone(), (Instant::now(), snapshot));
        }
    }
}

pub struct QuoteClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    cache: QuoteCache,
}

impl QuoteClient {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url,
            token,
            cache: QuoteCache::new(CACHE_TTL),
        }
    }

    // Missing credential is degraded mode, decided by the aggregator before
    // any fetch is attempted.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub async fn quote(&self, symbol: &str) -> Result<QuoteSnapshot, BoxError> {
        if let Some(hit) = self.cache.get(symbol) {
            debug!("Quote cache hit for {}", symbol);
            return Ok(hit);
        }

        let token = self
            .token
            .as_deref()
            .ok_or("quote provider credential not configured")?;
        let url = format!("{}/quote", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol), ("token", token)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("quote fetch for {} failed: HTTP {}", symbol, status).into());
        }

        let body: QuoteResponse = response.json().await?;
        let snapshot = QuoteSnapshot {
            symbol: symbol.to_string(),
            price: body.c,
            change: body.d,
            change_percent: body.dp,
        };
        self.cache.put(snapshot.clone());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_quote_body() {
        let body: QuoteResponse =
            serde_json::from_str(r#"{"c":150.25,"d":1.5,"dp":1.01,"h":152.0,"t":1704067200}"#)
                .unwrap();
        assert_eq!(body.c, Some(150.25));
        assert_eq!(body.d, Some(1.5));
        assert_eq!(body.dp, Some(1.01));
    }

    #[test]
    fn parses_partial_quote_body_as_missing_fields() {
        let body: QuoteResponse = serde_json::from_str(r#"{"c":150.25}"#).unwrap();
        assert_eq!(body.c, Some(150.25));
        assert!(body.d.is_none());
        assert!(body.dp.is_none());

        let body: QuoteResponse = serde_json::from_str("{}").unwrap();
        assert!(body.c.is_none());
    }

    #[test]
    fn malformed_quote_body_is_an_error() {
        assert!(serde_json::from_str::<QuoteResponse>(r#"{"c":"not a number"}"#).is_err());
        assert!(serde_json::from_str::<QuoteResponse>("<html>").is_err());
    }

    #[test]
    fn cache_returns_fresh_entries() {
        let cache = QuoteCache::new(Duration::from_secs(120));
        let snapshot = QuoteSnapshot {
            symbol: "AAPL".to_string(),
            price: Some(150.0),
            change: Some(1.5),
            change_percent: Some(1.0),
        };
        cache.put(snapshot.clone());
        assert_eq!(cache.get("AAPL"), Some(snapshot));
        assert_eq!(cache.get("MSFT"), None);
    }

    #[test]
    fn cache_expires_stale_entries() {
        let cache = QuoteCache::new(Duration::ZERO);
        cache.put(QuoteSnapshot::empty("AAPL".to_string()));
        assert_eq!(cache.get("AAPL"), None);
    }

    #[test]
    fn missing_token_reports_no_credential() {
        let client = QuoteClient::new(DEFAULT_BASE_URL.to_string(), None);
        assert!(!client.has_token());

        let client = QuoteClient::new(DEFAULT_BASE_URL.to_string(), Some("key".to_string()));
        assert!(client.has_token());
    }
}
