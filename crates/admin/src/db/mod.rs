//! Database operations for the admin panel.
//!
//! # Schema: `shop`
//!
//! The admin panel shares the storefront database. The storefront crate owns
//! the migrations; this crate only reads and writes:
//!
//! - `users` / `user_passwords` - Admin sign-in and account management
//! - `categories` / `products` - Catalog maintenance
//! - `orders` / `order_items` - Order listing and status changes
//!
//! # Migrations
//!
//! ```bash
//! cargo run -p shopfront-cli -- migrate
//! ```

pub mod admin_users;
pub mod categories;
pub mod orders;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use categories::CategoryRepository;
pub use orders::{OrderDetail, OrderListing, OrderRepository};
pub use products::ProductRepository;

/// `PostgreSQL` error code for `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation (e.g., duplicate email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Value rejected by a check, foreign key or range constraint.
    #[error("invalid value: {0}")]
    Invalid(String),
}

impl RepositoryError {
    /// Classify a failed insert or update.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        let sqlx::Error::Database(ref db_err) = err else {
            return Self::Database(err);
        };

        if db_err.is_unique_violation() {
            return Self::Conflict(db_err.message().to_owned());
        }
        if db_err.is_check_violation() {
            let message = match db_err.constraint() {
                Some("products_stock_non_negative") => "stock must not be negative".to_owned(),
                Some(name) => format!("{name} violated"),
                None => db_err.message().to_owned(),
            };
            return Self::Invalid(message);
        }
        if db_err.is_foreign_key_violation() {
            return Self::Invalid("unknown category".to_owned());
        }
        if db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) {
            return Self::Invalid("value out of range".to_owned());
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
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
