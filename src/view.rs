// src/view.rs
use crate::models::{ActionResult, WatchlistStockCard};
use serde::Serialize;

const PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

// A missing change renders as flat, same as zero.
pub fn direction(change: Option<f64>) -> Direction {
    match change {
        Some(v) if v > 0.0 => Direction::Up,
        Some(v) if v < 0.0 => Direction::Down,
        _ => Direction::Flat,
    }
}

pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("${:.2}", p),
        None => PLACEHOLDER.to_string(),
    }
}

// Positive values carry an explicit plus sign; negatives already have theirs.
pub fn format_change(value: Option<f64>) -> String {
    match value {
        Some(v) if v > 0.0 => format!("+{:.2}", v),
        Some(v) => format!("{:.2}", v),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn format_change_percent(value: Option<f64>) -> String {
    match value {
        Some(_) => format!("{}%", format_change(value)),
        None => PLACEHOLDER.to_string(),
    }
}

// Card plus the display strings clients render directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCardView {
    #[serde(flatten)]
    pub card: WatchlistStockCard,
    pub price_display: String,
    pub change_display: String,
    pub change_percent_display: String,
    pub direction: Direction,
}

impl From<WatchlistStockCard> for StockCardView {
    fn from(card: WatchlistStockCard) -> Self {
        Self {
            price_display: format_price(card.price),
            change_display: format_change(card.change),
            change_percent_display: format_change_percent(card.change_percent),
            direction: direction(card.change),
            card,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

// Rendered list state with optimistic removal: the card disappears before the
// delete request settles, and the whole previous list comes back if it fails.
#[derive(Debug, Clone)]
pub struct WatchlistView {
    cards: Vec<StockCardView>,
}

impl WatchlistView {
    pub fn new(cards: Vec<StockCardView>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[StockCardView] {
        &self.cards
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    // Drops the card and hands back the pre-removal snapshot for
    // finish_remove to restore on failure.
    pub fn begin_remove(&mut self, symbol: &str) -> Vec<StockCardView> {
        let snapshot = self.cards.clone();
        self.cards.retain(|view| view.card.symbol != symbol);
        snapshot
    }

    pub fn finish_remove(
        &mut self,
        symbol: &str,
        snapshot: Vec<StockCardView>,
        result: &ActionResult,
    ) -> Notice {
        if result.success {
            Notice {
                kind: NoticeKind::Success,
                message: format!("{} removed from watchlist", symbol),
            }
        } else {
            self.cards = snapshot;
            Notice {
                kind: NoticeKind::Error,
                message: result
                    .error
                    .clone()
                    .unwrap_or_else(|| "Failed to remove from watchlist".to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card(symbol: &str, price: Option<f64>, change: Option<f64>) -> WatchlistStockCard {
        WatchlistStockCard {
            symbol: symbol.to_string(),
            company: format!("{} Co.", symbol),
            added_at: Utc::now(),
            price,
            change,
            change_percent: change,
        }
    }

    #[test]
    fn price_formats_as_currency_or_placeholder() {
        assert_eq!(format_price(Some(150.0)), "$150.00");
        assert_eq!(format_price(Some(0.5)), "$0.50");
        assert_eq!(format_price(None), "—");
    }

    #[test]
    fn change_carries_explicit_sign_or_placeholder() {
        assert_eq!(format_change(Some(1.5)), "+1.50");
        assert_eq!(format_change(Some(-0.32)), "-0.32");
        assert_eq!(format_change(Some(0.0)), "0.00");
        assert_eq!(format_change(None), "—");
        assert_eq!(format_change_percent(Some(1.0)), "+1.00%");
        assert_eq!(format_change_percent(None), "—");
    }

    #[test]
    fn direction_classifies_by_sign() {
        assert_eq!(direction(Some(1.5)), Direction::Up);
        assert_eq!(direction(Some(-0.1)), Direction::Down);
        assert_eq!(direction(Some(0.0)), Direction::Flat);
        assert_eq!(direction(None), Direction::Flat);
    }

    #[test]
    fn view_carries_display_fields() {
        let view = StockCardView::from(card("AAPL", Some(150.25), Some(1.5)));
        assert_eq!(view.price_display, "$150.25");
        assert_eq!(view.change_display, "+1.50");
        assert_eq!(view.change_percent_display, "+1.50%");
        assert_eq!(view.direction, Direction::Up);

        let view = StockCardView::from(card("MSFT", None, None));
        assert_eq!(view.price_display, "—");
        assert_eq!(view.change_display, "—");
        assert_eq!(view.direction, Direction::Flat);
    }

    #[test]
    fn successful_remove_keeps_the_optimistic_state() {
        let cards = vec![
            StockCardView::from(card("AAPL", Some(150.0), Some(1.0))),
            StockCardView::from(card("MSFT", Some(300.0), Some(-1.0))),
        ];
        let mut view = WatchlistView::new(cards);

        let snapshot = view.begin_remove("AAPL");
        assert_eq!(view.cards().len(), 1);
        assert_eq!(view.cards()[0].card.symbol, "MSFT");

        let notice = view.finish_remove("AAPL", snapshot, &ActionResult::ok());
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.message, "AAPL removed from watchlist");
        assert_eq!(view.cards().len(), 1);
    }

    #[test]
    fn failed_remove_restores_the_previous_state() {
        let cards = vec![
            StockCardView::from(card("AAPL", Some(150.0), Some(1.0))),
            StockCardView::from(card("MSFT", Some(300.0), Some(-1.0))),
        ];
        let mut view = WatchlistView::new(cards.clone());

        let snapshot = view.begin_remove("MSFT");
        assert_eq!(view.cards().len(), 1);

        let notice = view.finish_remove(
            "MSFT",
            snapshot,
            &ActionResult::failure("User not found"),
        );
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "User not found");
        assert_eq!(view.cards(), cards.as_slice());
    }

    #[test]
    fn removing_an_absent_symbol_changes_nothing() {
        let cards = vec![StockCardView::from(card("AAPL", Some(150.0), Some(1.0)))];
        let mut view = WatchlistView::new(cards.clone());
        let _snapshot = view.begin_remove("TSLA");
        assert_eq!(view.cards(), cards.as_slice());
    }
}
