use serde::{Deserialize, Serialize};

use crate::entities::PriceLevel;

/// A flat order book: bid and ask levels in the order the feed sent them
///
/// This is the payload carried by depth deltas and snapshots. The sync layer
/// moves it around without looking inside; the accessors here exist for
/// consumers of the synchronized feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceOrderBook {
    pub symbol: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl SliceOrderBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        SliceOrderBook {
            symbol: symbol.into(),
            bids: Vec::new(),
            asks: Vec::new(),
        }
    }

    pub fn with_levels(
        symbol: impl Into<String>,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
    ) -> Self {
        SliceOrderBook {
            symbol: symbol.into(),
            bids,
            asks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Highest bid, if any
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.iter().max_by_key(|level| level.price)
    }

    /// Lowest ask, if any
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.iter().min_by_key(|level| level.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_best_levels() {
        let book = SliceOrderBook::with_levels(
            "BTCUSDT",
            vec![
                PriceLevel::new(dec!(49999), dec!(2.0)),
                PriceLevel::new(dec!(50000), dec!(1.0)),
            ],
            vec![
                PriceLevel::new(dec!(50001), dec!(1.5)),
                PriceLevel::new(dec!(50002), dec!(3.0)),
            ],
        );

        assert_eq!(book.best_bid().unwrap().price, dec!(50000));
        assert_eq!(book.best_ask().unwrap().price, dec!(50001));
        assert!(!book.is_empty());
    }

    #[test]
    fn test_empty_book() {
        let book = SliceOrderBook::new("BTCUSDT");
        assert!(book.is_empty());
        assert!(book.best_bid().is_none());
        assert!(book.best_ask().is_none());
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{
            "symbol": "BTCUSDT",
            "bids": [{"price": "50000", "quantity": "1.0"}],
            "asks": [{"price": "50001", "quantity": "1.5"}]
        }"#;

        let book: SliceOrderBook = serde_json::from_str(json).unwrap();
        assert_eq!(book.symbol, "BTCUSDT");
        assert_eq!(book.bids.len(), 1);
        assert_eq!(book.best_ask().unwrap().quantity, dec!(1.5));
    }
}
