// src/db.rs
use crate::error::BoxError;
use crate::models::WatchlistEntry;
use chrono::{DateTime, Utc};
use log::{error, info};
use scylla::frame::response::result::CqlValue;
use scylla::query::Query;
use scylla::{Session, SessionBuilder};
use std::sync::Arc;
use tokio::sync::OnceCell;

static SESSION: OnceCell<Arc<Session>> = OnceCell::const_new();

// Process-wide session, established once and reused for every request. The
// node address is only read on the first call.
pub async fn session(node: &str) -> Result<Arc<Session>, BoxError> {
    let session = SESSION
        .get_or_try_init(|| async {
            let session = init(node).await?;
            Ok::<_, BoxError>(Arc::new(session))
        })
        .await?;
    Ok(session.clone())
}

async fn init(node: &str) -> Result<Session, BoxError> {
    let session = SessionBuilder::new().known_node(node).build().await?;

    // Create keyspace and tables if they don't exist
    session.query("CREATE KEYSPACE IF NOT EXISTS stock_watchlist WITH REPLICATION = {'class': 'SimpleStrategy', 'replication_factor': 1}", &[]).await?;
    session.query("CREATE TABLE IF NOT EXISTS stock_watchlist.users (email TEXT PRIMARY KEY, user_id TEXT, name TEXT)", &[]).await?;
    session.query("CREATE TABLE IF NOT EXISTS stock_watchlist.watchlist (user_id TEXT, symbol TEXT, company TEXT, added_at TIMESTAMP, PRIMARY KEY (user_id, symbol))", &[]).await?;

    info!("Successfully connected to ScyllaDB.");
    Ok(session)
}

pub async fn resolve_identity(session: &Session, email: &str) -> Result<Option<String>, BoxError> {
    let query = Query::new("SELECT user_id FROM stock_watchlist.users WHERE email = ?");
    let result = session.query(query, (email,)).await?;

    let user_id = result
        .rows
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|row| {
            row.columns[0]
                .as_ref()
                .and_then(|v| v.as_text())
                .map(|s| s.to_string())
        });
    Ok(user_id)
}

pub async fn ensure_user(session: &Session, email: &str, name: &str) -> Result<String, BoxError> {
    if let Some(user_id) = resolve_identity(session, email).await? {
        return Ok(user_id);
    }

    let user_id = format!("{:x}", md5::compute(email.trim().to_lowercase()));
    let query =
        Query::new("INSERT INTO stock_watchlist.users (email, user_id, name) VALUES (?, ?, ?)");
    session
        .query(query, (email, user_id.as_str(), name))
        .await?;
    info!("Created user record for {}", email);
    Ok(user_id)
}

pub async fn list_entries(
    session: &Session,
    user_id: &str,
) -> Result<Vec<WatchlistEntry>, BoxError> {
    let query = Query::new(
        "SELECT symbol, company, added_at FROM stock_watchlist.watchlist WHERE user_id = ?",
    );
    let result = session.query(query, (user_id,)).await?;

    let mut entries = Vec::new();
    if let Some(rows) = result.rows {
        for row in rows {
            let symbol = row.columns[0]
                .as_ref()
                .and_then(|v| v.as_text())
                .map(|s| s.to_string());
            let company = row.columns[1]
                .as_ref()
                .and_then(|v| v.as_text())
                .map(|s| s.to_string());
            let added_at = row.columns[2].as_ref().and_then(|v| match v {
                CqlValue::Timestamp(ts) => {
                    DateTime::<Utc>::from_timestamp_millis(ts.num_milliseconds())
                }
                _ => None,
            });
            match (symbol, company, added_at) {
                (Some(symbol), Some(company), Some(added_at)) => entries.push(WatchlistEntry {
                    user_id: user_id.to_string(),
                    symbol,
                    company,
                    added_at,
                }),
                _ => error!("Skipping malformed watchlist row for user {}", user_id),
            }
        }
    }

    // The partition clusters by symbol; the contract orders by added_at desc.
    entries.sort_by(|a, b| b.added_at.cmp(&a.added_at));
    Ok(entries)
}

// Symbols are keyed uppercase/trimmed; the store owns that normalization.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

// Re-adding a symbol overwrites the company name but keeps the original
// added_at, so an upsert on an existing row must not re-stamp the timestamp.
pub async fn upsert_entry(
    session: &Session,
    user_id: &str,
    symbol: &str,
    company: &str,
) -> Result<(), BoxError> {
    let symbol = normalize_symbol(symbol);
    let company = company.trim();

    let existing = Query::new(
        "SELECT added_at FROM stock_watchlist.watchlist WHERE user_id = ? AND symbol = ?",
    );
    let result = session.query(existing, (user_id, symbol.as_str())).await?;
    let exists = result.rows.map_or(false, |rows| !rows.is_empty());

    if exists {
        let update = Query::new(
            "UPDATE stock_watchlist.watchlist SET company = ? WHERE user_id = ? AND symbol = ?",
        );
        session
            .query(update, (company, user_id, symbol.as_str()))
            .await?;
    } else {
        let insert = Query::new("INSERT INTO stock_watchlist.watchlist (user_id, symbol, company, added_at) VALUES (?, ?, ?, ?)");
        session
            .query(
                insert,
                (
                    user_id,
                    symbol.as_str(),
                    company,
                    Utc::now().timestamp_millis(),
                ),
            )
            .await?;
    }
    Ok(())
}

// CQL DELETE succeeds whether or not the row exists, which is exactly the
// idempotent remove the contract asks for.
pub async fn delete_entry(session: &Session, user_id: &str, symbol: &str) -> Result<(), BoxError> {
    let symbol = normalize_symbol(symbol);
    let query =
        Query::new("DELETE FROM stock_watchlist.watchlist WHERE user_id = ? AND symbol = ?");
    session.query(query, (user_id, symbol.as_str())).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_normalize_to_uppercase_trimmed() {
        assert_eq!(normalize_symbol("aapl"), "AAPL");
        assert_eq!(normalize_symbol("  msft "), "MSFT");
        assert_eq!(normalize_symbol("BRK.B"), "BRK.B");
    }
}
