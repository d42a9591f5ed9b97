//! Database operations for the storefront.
//!
//! # Schema: `shop`
//!
//! The storefront and admin apps share one database. The storefront owns the
//! migrations.
//!
//! ## Tables
//!
//! - `users` / `user_passwords` - Customer and admin accounts
//! - `categories` / `products` - The catalog
//! - `cart_items` - One row per (user, product) pair
//! - `orders` / `order_items` - Placed orders with price snapshots
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p shopfront-cli -- migrate
//! ```

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart::{AddOutcome, CartRepository, UpdateOutcome};
pub use catalog::CatalogRepository;
pub use orders::{CheckoutOutcome, OrderRepository};
pub use users::UserRepository;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value failed validation when read back.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested row does not exist.
    #[error("not found")]
    NotFound,

    /// Write rejected by a uniqueness or check constraint.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique and check violations to `Conflict`, everything else to `Database`.
    pub(crate) fn from_write(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && (db_err.is_unique_violation() || db_err.is_check_violation())
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
