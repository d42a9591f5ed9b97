//! Orders, order item snapshots and checkout planning.
//!
//! Checkout turns the current cart into a [`CheckoutPlan`]: the total and one
//! [`OrderItemDraft`] per line, each carrying the price at that moment. Once
//! written, order items never follow later catalog price changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{CartLine, cart_total};
use crate::types::{OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Sum of item snapshot price × quantity at checkout time.
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// `None` once the product has been deleted from the catalog.
    pub product_id: Option<ProductId>,
    /// Product name at checkout time.
    pub product_name: String,
    pub quantity: i32,
    /// Unit price at checkout time.
    pub price: Price,
}

impl OrderItem {
    /// Snapshot price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// An order item about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemDraft {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub price: Price,
}

/// Everything checkout writes, computed from the cart before any write happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    pub total: Price,
    pub items: Vec<OrderItemDraft>,
}

impl CheckoutPlan {
    /// Plan an order from the given cart lines.
    ///
    /// Returns `None` for an empty cart: checkout of nothing writes nothing.
    #[must_use]
    pub fn from_cart(lines: &[CartLine]) -> Option<Self> {
        if lines.is_empty() {
            return None;
        }

        let items = lines
            .iter()
            .map(|line| OrderItemDraft {
                product_id: line.product.id,
                product_name: line.product.name.clone(),
                quantity: line.quantity,
                price: line.product.price,
            })
            .collect();

        Some(Self {
            total: cart_total(lines),
            items,
        })
    }

    /// Number of units across all items.
    #[must_use]
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.quantity)).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::cart::CartProduct;
    use crate::types::CartItemId;

    fn line(name: &str, price_cents: i64, quantity: i32) -> CartLine {
        CartLine {
            id: CartItemId::random(),
            quantity,
            product: CartProduct {
                id: ProductId::random(),
                name: name.to_owned(),
                price: Price::from_cents(price_cents),
                image_url: String::new(),
                stock: 100,
            },
        }
    }

    #[test]
    fn test_plan_total_and_snapshots() {
        let lines = vec![line("A", 1000, 2), line("B", 500, 1)];
        let plan = CheckoutPlan::from_cart(&lines).unwrap();

        assert_eq!(plan.total, Price::from_cents(2500));
        assert_eq!(plan.total.display(), "$25.00");
        assert_eq!(plan.items.len(), 2);
        assert_eq!(plan.unit_count(), 3);

        assert_eq!(plan.items[0].product_id, lines[0].product.id);
        assert_eq!(plan.items[0].product_name, "A");
        assert_eq!(plan.items[0].quantity, 2);
        assert_eq!(plan.items[0].price, Price::from_cents(1000));
        assert_eq!(plan.items[1].price, Price::from_cents(500));
    }

    #[test]
    fn test_empty_cart_plans_nothing() {
        assert!(CheckoutPlan::from_cart(&[]).is_none());
    }

    #[test]
    fn test_plan_is_detached_from_later_price_changes() {
        let mut lines = vec![line("A", 1000, 2)];
        let plan = CheckoutPlan::from_cart(&lines).unwrap();

        lines[0].product.price = Price::from_cents(9999);

        assert_eq!(plan.items[0].price, Price::from_cents(1000));
        assert_eq!(plan.total, Price::from_cents(2000));
    }

    #[test]
    fn test_order_item_line_total() {
        let item = OrderItem {
            id: OrderItemId::random(),
            order_id: OrderId::random(),
            product_id: None,
            product_name: "Retired product".to_owned(),
            quantity: 4,
            price: Price::from_cents(250),
        };
        assert_eq!(item.line_total(), Price::from_cents(1000));
    }
}
