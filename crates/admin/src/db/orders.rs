//! Order repository for the admin panel.
//!
//! Admins see every customer's orders. Totals and item prices are the
//! checkout snapshots and are never rewritten here; only the status changes.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopfront_core::{
    Order, OrderId, OrderItem, OrderItemId, OrderStatus, Price, ProductId, UserId,
};

use super::RepositoryError;

/// An order with the customer and item count, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderListing {
    pub order: Order,
    pub customer_email: String,
    pub item_count: i64,
}

/// An order with its item snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetail {
    pub listing: OrderListing,
    pub items: Vec<OrderItem>,
}

#[derive(sqlx::FromRow)]
struct OrderListingRow {
    id: OrderId,
    user_id: UserId,
    total: Price,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    customer_email: String,
    item_count: i64,
}

impl From<OrderListingRow> for OrderListing {
    fn from(row: OrderListingRow) -> Self {
        Self {
            order: Order {
                id: row.id,
                user_id: row.user_id,
                total: row.total,
                status: row.status,
                created_at: row.created_at,
            },
            customer_email: row.customer_email,
            item_count: row.item_count,
        }
    }
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

const LISTING_SELECT: &str = r"
    SELECT o.id, o.user_id, o.total, o.status, o.created_at,
           u.email AS customer_email,
           COALESCE((SELECT SUM(i.quantity) FROM shop.order_items i WHERE i.order_id = o.id), 0)::BIGINT
               AS item_count
    FROM shop.orders o
    JOIN shop.users u ON u.id = o.user_id
";

/// Repository for order reads and status changes.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All orders, newest first, optionally only those with `status`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderListing>, RepositoryError> {
        let sql = format!(
            "{LISTING_SELECT} WHERE ($1::shop.order_status IS NULL OR o.status = $1) \
             ORDER BY o.created_at DESC"
        );
        let rows = sqlx::query_as::<_, OrderListingRow>(&sql)
            .bind(status)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(OrderListing::from).collect())
    }

    /// One order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let sql = format!("{LISTING_SELECT} WHERE o.id = $1");
        let Some(row) = sqlx::query_as::<_, OrderListingRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
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
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail {
            listing: row.into(),
            items: items.into_iter().map(OrderItem::from).collect(),
        }))
    }

    /// Move an order to `status`.
    ///
    /// The current status is read under a row lock and checked with
    /// [`OrderStatus::allows_transition_to`]. Returns the previous status and
    /// the updated order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Invalid` if the transition is not allowed.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(OrderStatus, Order), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, OrderStatus>(
            "SELECT status FROM shop.orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if !current.allows_transition_to(status) {
            return Err(RepositoryError::Invalid(format!(
                "cannot move an order from {current} to {status}"
            )));
        }

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE shop.orders
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, total, status, created_at
            ",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((current, row.into()))
    }
}
