//! Checkout and customer order history.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopfront_core::{
    CheckoutPlan, Order, OrderId, OrderItem, OrderItemId, OrderStatus, Price, ProductId, UserId,
};

use super::RepositoryError;
use super::cart::fetch_lines;

/// Result of a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The order was written and the cart cleared.
    Placed(Order),
    /// The cart was empty. Nothing was written.
    EmptyCart,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    total: Price,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            total: row.total,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: Option<ProductId>,
    product_name: String,
    quantity: i32,
    price: Price,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

/// Repository for the signed-in customer's orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Turn the user's cart into an order.
    ///
    /// Runs in one transaction: the cart lines are locked and priced, the
    /// order and its item snapshots are inserted, and those lines are removed
    /// from the cart.
    /// If any statement fails the transaction is dropped without commit and
    /// both the cart and the order tables are left as they were.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn place_order(&self, user_id: UserId) -> Result<CheckoutOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let lines = fetch_lines(&mut *tx, user_id, true).await?;
        let Some(plan) = CheckoutPlan::from_cart(&lines) else {
            return Ok(CheckoutOutcome::EmptyCart);
        };

        let order = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO shop.orders (user_id, total, status)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, total, status, created_at
            ",
        )
        .bind(user_id)
        .bind(plan.total)
        .bind(OrderStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        for item in &plan.items {
            sqlx::query(
                r"
                INSERT INTO shop.order_items (order_id, product_id, product_name, quantity, price)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        // Only the priced lines. A line committed after the locking read is
        // not part of this order and stays in the cart.
        let line_ids: Vec<uuid::Uuid> = lines.iter().map(|line| line.id.as_uuid()).collect();
        sqlx::query("DELETE FROM shop.cart_items WHERE user_id = $1 AND id = ANY($2)")
            .bind(user_id)
            .bind(&line_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            total = %plan.total,
            items = plan.items.len(),
            "Order placed"
        );

        Ok(CheckoutOutcome::Placed(order.into()))
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total, status, created_at
            FROM shop.orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// One of the user's orders with its items.
    ///
    /// Returns `None` when the order does not exist or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<(Order, Vec<OrderItem>)>, RepositoryError> {
        let order = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total, status, created_at
            FROM shop.orders
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, product_id, product_name, quantity, price
            FROM shop.order_items
            WHERE order_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some((
            order.into(),
            items.into_iter().map(OrderItem::from).collect(),
        )))
    }
}
