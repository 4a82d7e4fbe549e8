use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single price level: a price and the quantity resting at it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub quantity: Decimal,
}

impl PriceLevel {
    pub fn new(price: Decimal, quantity: Decimal) -> Self {
        PriceLevel { price, quantity }
    }

    /// A level with zero quantity marks a removal in delta feeds
    pub fn is_removal(&self) -> bool {
        self.quantity.is_zero()
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.quantity, self.price)
    }
}
