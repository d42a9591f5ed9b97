//! Cart lines and cart arithmetic.

use serde::{Deserialize, Serialize};

use crate::types::{CartItemId, Price, ProductId};

/// Product fields joined onto a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    /// Current catalog price (not a snapshot).
    pub price: Price,
    pub image_url: String,
    pub stock: i32,
}

/// One cart row: a user's pending quantity of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub quantity: i32,
    pub product: CartProduct,
}

impl CartLine {
    /// Current price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }

    /// Whether one more unit fits within the product's stock.
    #[must_use]
    pub const fn can_increment(&self) -> bool {
        self.quantity < self.product.stock
    }
}

/// Sum of every line's price × quantity.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Price {
    lines.iter().map(CartLine::line_total).sum()
}

/// Total number of units across all lines.
#[must_use]
pub fn unit_count(lines: &[CartLine]) -> i64 {
    lines.iter().map(|line| i64::from(line.quantity)).sum()
}

/// Outcome of interpreting a requested quantity for an existing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Store this quantity.
    Set(i32),
    /// Requested quantity was below 1; leave the line untouched.
    ///
    /// Going below 1 does not remove the line; removal is its own action.
    Ignored,
}

impl QuantityChange {
    /// Interpret a requested quantity.
    #[must_use]
    pub const fn from_requested(requested: i32) -> Self {
        if requested < 1 {
            Self::Ignored
        } else {
            Self::Set(requested)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price_cents: i64, quantity: i32, stock: i32) -> CartLine {
        CartLine {
            id: CartItemId::random(),
            quantity,
            product: CartProduct {
                id: ProductId::random(),
                name: "Widget".to_owned(),
                price: Price::from_cents(price_cents),
                image_url: String::new(),
                stock,
            },
        }
    }

    #[test]
    fn test_cart_total() {
        let lines = [line(1000, 2, 10), line(500, 1, 10)];
        assert_eq!(cart_total(&lines), Price::from_cents(2500));
        assert_eq!(cart_total(&lines).display(), "$25.00");
        assert_eq!(unit_count(&lines), 3);
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        assert_eq!(cart_total(&[]), Price::ZERO);
        assert_eq!(unit_count(&[]), 0);
    }

    #[test]
    fn test_line_total_uses_decimal_arithmetic() {
        // 0.1 * 3 is exactly 0.30, not 0.30000000000000004
        assert_eq!(line(10, 3, 5).line_total(), Price::from_cents(30));
    }

    #[test]
    fn test_can_increment_is_capped_at_stock() {
        assert!(line(100, 1, 2).can_increment());
        assert!(!line(100, 2, 2).can_increment());
        assert!(!line(100, 1, 0).can_increment());
    }

    #[test]
    fn test_quantity_below_one_is_ignored() {
        assert_eq!(QuantityChange::from_requested(0), QuantityChange::Ignored);
        assert_eq!(QuantityChange::from_requested(-4), QuantityChange::Ignored);
        assert_eq!(QuantityChange::from_requested(1), QuantityChange::Set(1));
        assert_eq!(QuantityChange::from_requested(7), QuantityChange::Set(7));
    }
}
