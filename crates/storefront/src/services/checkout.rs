//! Checkout: the signed-in customer's cart becomes an order.

use sqlx::PgPool;

use shopfront_core::UserId;

use crate::db::{CheckoutOutcome, OrderRepository, RepositoryError};

/// Checkout service for one request.
pub struct CheckoutService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order from the user's cart.
    ///
    /// An empty cart yields `CheckoutOutcome::EmptyCart` and writes nothing.
    /// Otherwise the order, its items and the cart clear commit together or
    /// not at all.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn checkout(&self, user_id: UserId) -> Result<CheckoutOutcome, RepositoryError> {
        let outcome = self.orders.place_order(user_id).await?;

        if outcome == CheckoutOutcome::EmptyCart {
            tracing::debug!(user_id = %user_id, "Checkout of empty cart");
        }

        Ok(outcome)
    }
}
