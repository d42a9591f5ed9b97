//! Cart line persistence.
//!
//! Every statement is scoped to the owning user, so a line id from another
//! account behaves exactly like a missing line.

use sqlx::{PgExecutor, PgPool};

use shopfront_core::{
    CartItemId, CartLine, CartProduct, Price, ProductId, QuantityChange, UserId,
};

use super::RepositoryError;

/// Result of an add-to-cart upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The line now holds `quantity` units.
    Added { line_id: CartItemId, quantity: i32 },
    /// One more unit would exceed the product's stock. Nothing was written.
    StockExceeded,
    /// No such product.
    ProductNotFound,
}

/// Result of a quantity update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// Requested quantity was below 1; the line is unchanged.
    Ignored,
    /// Requested quantity exceeds the product's stock; the line is unchanged.
    StockExceeded,
    /// No such line for this user.
    LineNotFound,
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: CartItemId,
    quantity: i32,
    product_id: ProductId,
    name: String,
    price: Price,
    image_url: String,
    stock: i32,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: row.id,
            quantity: row.quantity,
            product: CartProduct {
                id: row.product_id,
                name: row.name,
                price: row.price,
                image_url: row.image_url,
                stock: row.stock,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct UpsertRow {
    id: CartItemId,
    quantity: i32,
}

/// Load a user's cart lines joined with current product fields, oldest first.
///
/// With `for_update` the cart rows stay locked until the surrounding
/// transaction ends.
pub(crate) async fn fetch_lines<'e, E>(
    executor: E,
    user_id: UserId,
    for_update: bool,
) -> Result<Vec<CartLine>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    const SELECT: &str = r"
        SELECT c.id, c.quantity,
               p.id AS product_id, p.name, p.price, p.image_url, p.stock
        FROM shop.cart_items c
        JOIN shop.products p ON p.id = c.product_id
        WHERE c.user_id = $1
        ORDER BY c.created_at, c.id
    ";

    let sql = if for_update {
        format!("{SELECT} FOR UPDATE OF c")
    } else {
        SELECT.to_owned()
    };

    let rows = sqlx::query_as::<_, CartLineRow>(&sql)
        .bind(user_id)
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(CartLine::from).collect())
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's cart lines, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        fetch_lines(self.pool, user_id, false).await
    }

    /// Add one unit of a product to the user's cart.
    ///
    /// A single statement inserts the line with quantity 1 or increments the
    /// existing `(user, product)` line, and only when the result stays within
    /// the product's stock. Concurrent adds serialize on the line's row lock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<AddOutcome, RepositoryError> {
        let row = sqlx::query_as::<_, UpsertRow>(
            r"
            INSERT INTO shop.cart_items (user_id, product_id, quantity)
            SELECT $1, p.id, 1
            FROM shop.products p
            WHERE p.id = $2 AND p.stock >= 1
            ON CONFLICT (user_id, product_id) DO UPDATE
            SET quantity = shop.cart_items.quantity + 1,
                updated_at = now()
            WHERE shop.cart_items.quantity + 1 <= (
                SELECT stock FROM shop.products WHERE id = EXCLUDED.product_id
            )
            RETURNING id, quantity
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(AddOutcome::Added {
                line_id: row.id,
                quantity: row.quantity,
            });
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM shop.products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(self.pool)
                .await?;

        Ok(if exists {
            AddOutcome::StockExceeded
        } else {
            AddOutcome::ProductNotFound
        })
    }

    /// Overwrite a line's quantity.
    ///
    /// Increases are capped at the product's stock. A line may always be
    /// lowered, even when stock has since dropped below the new quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        line_id: CartItemId,
        change: QuantityChange,
    ) -> Result<UpdateOutcome, RepositoryError> {
        let QuantityChange::Set(quantity) = change else {
            return Ok(UpdateOutcome::Ignored);
        };

        let result = sqlx::query(
            r"
            UPDATE shop.cart_items c
            SET quantity = $3, updated_at = now()
            FROM shop.products p
            WHERE c.id = $1
              AND c.user_id = $2
              AND p.id = c.product_id
              AND ($3 <= p.stock OR $3 <= c.quantity)
            ",
        )
        .bind(line_id)
        .bind(user_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(UpdateOutcome::Updated);
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM shop.cart_items WHERE id = $1 AND user_id = $2)",
        )
        .bind(line_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(if exists {
            UpdateOutcome::StockExceeded
        } else {
            UpdateOutcome::LineNotFound
        })
    }

    /// Delete a line. Returns whether a line was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        line_id: CartItemId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_items WHERE id = $1 AND user_id = $2")
            .bind(line_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
