//! Cart operations for the signed-in customer.

use sqlx::PgPool;
use thiserror::Error;

use shopfront_core::cart::{cart_total, unit_count};
use shopfront_core::{CartItemId, CartLine, ProductId, QuantityChange, UserId};

use crate::db::{AddOutcome, CartRepository, RepositoryError, UpdateOutcome};

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// The line does not exist or belongs to another user.
    #[error("cart item not found")]
    LineNotFound,

    /// The requested quantity exceeds the product's stock.
    #[error("not enough stock")]
    StockExceeded,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One cart row as rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub id: String,
    pub product_name: String,
    pub image_url: String,
    pub unit_price: String,
    pub quantity: i32,
    pub line_total: String,
    /// Quantity the decrement button submits. Never below 1.
    pub decrement_to: i32,
    /// Quantity the increment button submits.
    pub increment_to: i32,
    /// False once the line holds the whole stock.
    pub can_increment: bool,
    pub can_decrement: bool,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.to_string(),
            product_name: line.product.name.clone(),
            image_url: line.product.image_url.clone(),
            unit_price: line.product.price.display(),
            quantity: line.quantity,
            line_total: line.line_total().display(),
            decrement_to: (line.quantity - 1).max(1),
            increment_to: line.quantity.saturating_add(1),
            can_increment: line.can_increment(),
            can_decrement: line.quantity > 1,
        }
    }
}

/// Snapshot of a cart, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub unit_count: i64,
}

impl CartView {
    /// Build the view from loaded lines.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        Self {
            lines: lines.iter().map(CartLineView::from).collect(),
            total: cart_total(lines).display(),
            unit_count: unit_count(lines),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Cart service for one request.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
        }
    }

    /// Load the user's cart as a view model.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn view(&self, user_id: UserId) -> Result<CartView, RepositoryError> {
        let lines = self.carts.lines(user_id).await?;
        Ok(CartView::from_lines(&lines))
    }

    /// Add one unit of a product. Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` for an unknown product and
    /// `CartError::StockExceeded` when the stock is already fully in the cart.
    pub async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<i32, CartError> {
        match self.carts.add(user_id, product_id).await? {
            AddOutcome::Added { quantity, .. } => Ok(quantity),
            AddOutcome::StockExceeded => Err(CartError::StockExceeded),
            AddOutcome::ProductNotFound => Err(CartError::ProductNotFound),
        }
    }

    /// Set a line's quantity. Requests below 1 are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` for a missing line and
    /// `CartError::StockExceeded` when the quantity exceeds stock.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        line_id: CartItemId,
        requested: i32,
    ) -> Result<(), CartError> {
        let change = QuantityChange::from_requested(requested);
        match self.carts.update_quantity(user_id, line_id, change).await? {
            UpdateOutcome::Updated | UpdateOutcome::Ignored => Ok(()),
            UpdateOutcome::StockExceeded => Err(CartError::StockExceeded),
            UpdateOutcome::LineNotFound => Err(CartError::LineNotFound),
        }
    }

    /// Remove a line. Removing a missing line succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn remove(&self, user_id: UserId, line_id: CartItemId) -> Result<(), CartError> {
        if !self.carts.remove(user_id, line_id).await? {
            tracing::debug!(line_id = %line_id, "Remove of missing cart line");
        }
        Ok(())
    }
}
