// src/watchlist.rs
use crate::db;
use crate::error::BoxError;
use crate::models::{ActionResult, QuoteSnapshot, WatchlistEntry, WatchlistStockCard};
use crate::quotes::QuoteClient;
use futures::future::join_all;
use log::{error, info};
use scylla::Session;
use std::future::Future;

pub async fn add_to_watchlist(
    session: &Session,
    email: &str,
    symbol: &str,
    company: &str,
) -> ActionResult {
    if email.trim().is_empty() || symbol.trim().is_empty() || company.trim().is_empty() {
        return ActionResult::failure("Missing required fields");
    }

    let user_id = match db::resolve_identity(session, email).await {
        Ok(Some(user_id)) => user_id,
        Ok(None) => return ActionResult::failure("User not found"),
        Err(e) => {
            error!("add_to_watchlist identity lookup failed: {}", e);
            return ActionResult::failure("Failed to add to watchlist");
        }
    };

    match db::upsert_entry(session, &user_id, symbol, company).await {
        Ok(()) => {
            info!(
                "Added {} to watchlist for {}",
                db::normalize_symbol(symbol),
                email
            );
            ActionResult::ok()
        }
        Err(e) => {
            error!("add_to_watchlist error: {}", e);
            ActionResult::failure("Failed to add to watchlist")
        }
    }
}

pub async fn remove_from_watchlist(session: &Session, email: &str, symbol: &str) -> ActionResult {
    if email.trim().is_empty() || symbol.trim().is_empty() {
        return ActionResult::failure("Missing required fields");
    }

    let user_id = match db::resolve_identity(session, email).await {
        Ok(Some(user_id)) => user_id,
        Ok(None) => return ActionResult::failure("User not found"),
        Err(e) => {
            error!("remove_from_watchlist identity lookup failed: {}", e);
            return ActionResult::failure("Failed to remove from watchlist");
        }
    };

    match db::delete_entry(session, &user_id, symbol).await {
        Ok(()) => {
            info!(
                "Removed {} from watchlist for {}",
                db::normalize_symbol(symbol),
                email
            );
            ActionResult::ok()
        }
        Err(e) => {
            error!("remove_from_watchlist error: {}", e);
            ActionResult::failure("Failed to remove from watchlist")
        }
    }
}

// Read path: persisted entries merged with best-effort live quotes. Identity
// and storage failures degrade to an empty list; quote failures degrade to
// null fields on their own row only.
pub async fn get_watchlist_with_quotes(
    session: &Session,
    quotes: &QuoteClient,
    email: &str,
) -> Vec<WatchlistStockCard> {
    let user_id = match db::resolve_identity(session, email).await {
        Ok(Some(user_id)) => user_id,
        Ok(None) => return Vec::new(),
        Err(e) => {
            error!("get_watchlist_with_quotes identity lookup failed: {}", e);
            return Vec::new();
        }
    };

    let entries = match db::list_entries(session, &user_id).await {
        Ok(entries) => entries,
        Err(e) => {
            error!("get_watchlist_with_quotes error: {}", e);
            return Vec::new();
        }
    };

    if !quotes.has_token() {
        error!("Quote provider credential is not configured");
    }

    build_stock_cards(entries, quotes.has_token(), |symbol| async move {
        quotes.quote(&symbol).await
    })
    .await
}

// Aggregation core, generic over the fetch so the fan-out properties are
// testable without a provider.
pub async fn build_stock_cards<F, Fut>(
    entries: Vec<WatchlistEntry>,
    token_configured: bool,
    fetch: F,
) -> Vec<WatchlistStockCard>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<QuoteSnapshot, BoxError>>,
{
    if entries.is_empty() {
        return Vec::new();
    }

    // Degraded mode: no credential means structurally complete cards with
    // null quote fields, not an error.
    if !token_configured {
        return entries
            .into_iter()
            .map(WatchlistStockCard::without_quote)
            .collect();
    }

    // One independent fetch per symbol; each carries its own failure boundary
    // so one bad symbol never touches the others.
    let fetches: Vec<_> = entries
        .iter()
        .map(|entry| {
            let symbol = entry.symbol.clone();
            let fut = fetch(symbol.clone());
            async move {
                match fut.await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        error!("Quote fetch failed for {}: {}", symbol, e);
                        QuoteSnapshot::empty(symbol)
                    }
                }
            }
        })
        .collect();
    let snapshots = join_all(fetches).await;

    // Merge by exact symbol match, not position: fetches may complete out of
    // order. Output keeps the persisted entry order.
    entries
        .into_iter()
        .map(|entry| {
            match snapshots.iter().find(|quote| quote.symbol == entry.symbol) {
                Some(quote) => WatchlistStockCard::with_quote(entry, quote),
                None => WatchlistStockCard::without_quote(entry),
            }
        })
        .collect()
}
