//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! # Database workflow tests (each test gets a fresh migrated database)
//! DATABASE_URL=postgres://localhost/shopfront_test \
//!     cargo test -p shopfront-integration-tests -- --ignored
//!
//! # HTTP smoke tests also need both servers running
//! cargo run -p shopfront-storefront &
//! cargo run -p shopfront-admin &
//! ```
//!
//! # Test Categories
//!
//! - `cart_workflow` - Add, update and remove against `PostgreSQL`
//! - `checkout_workflow` - Order placement, snapshots and rollback
//! - `admin_workflow` - Product maintenance, status changes, admin sign-in
//! - `smoke` - HTTP checks against running servers
//!
//! This module holds the fixtures they share.

use sqlx::PgPool;

use shopfront_admin::db::ProductRepository;
use shopfront_core::{CategoryId, Email, Price, ProductId, ProductInput, UserId};
use shopfront_storefront::db::UserRepository;

/// Not a real hash. Fixture users never sign in with a password.
const PLACEHOLDER_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$fixture$fixture";

/// Insert a customer and return their id.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn customer(pool: &PgPool, email: &str) -> UserId {
    let email = Email::parse(email).expect("fixture email is valid");
    UserRepository::new(pool)
        .create_with_password(&email, PLACEHOLDER_HASH)
        .await
        .expect("Failed to insert customer")
        .id
}

/// Product fields with sensible defaults.
#[must_use]
pub fn product_input(name: &str, cents: i64, stock: i32) -> ProductInput {
    ProductInput {
        name: name.to_owned(),
        description: String::new(),
        price: Price::from_cents(cents),
        category_id: None,
        image_url: String::new(),
        stock,
    }
}

/// Insert a product and return its id.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn product(pool: &PgPool, name: &str, cents: i64, stock: i32) -> ProductId {
    product_in(pool, name, cents, stock, None).await
}

/// Insert a product in a category and return its id.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn product_in(
    pool: &PgPool,
    name: &str,
    cents: i64,
    stock: i32,
    category_id: Option<CategoryId>,
) -> ProductId {
    let input = ProductInput {
        category_id,
        ..product_input(name, cents, stock)
    };
    ProductRepository::new(pool)
        .create(&input)
        .await
        .expect("Failed to insert product")
        .id
}

/// Count rows in a `shop` table for one user.
///
/// # Panics
///
/// Panics if the query fails.
pub async fn count_for_user(pool: &PgPool, table: &str, user_id: UserId) -> i64 {
    sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM shop.{table} WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_one(pool)
    .await
    .expect("Failed to count rows")
}

/// Total number of order items across every order.
///
/// # Panics
///
/// Panics if the query fails.
pub async fn order_item_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM shop.order_items")
        .fetch_one(pool)
        .await
        .expect("Failed to count order items")
}
