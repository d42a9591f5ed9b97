//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Catalog (?category=<id|all>&q=<text>)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Cart (requires auth)
//! GET  /cart                   - Cart tab
//! POST /cart/add               - Add one unit of a product
//! POST /cart/update            - Set a line's quantity
//! POST /cart/remove            - Remove a line
//! POST /cart/checkout          - Place an order from the cart
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Profile tab
//! GET  /account/orders         - Orders tab
//! GET  /account/orders/{id}    - Order detail
//! ```
//!
//! Every mutation is a form POST answered with a redirect; notices travel in
//! the `error` / `success` query parameters of the redirect target.

pub mod account;
pub mod auth;
pub mod cart;
pub mod catalog;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Query parameters for error/success display.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Redirect to `path` with an error notice.
#[must_use]
pub fn redirect_with_error(path: &str, message: &str) -> Redirect {
    Redirect::to(&with_notice(path, "error", message))
}

/// Redirect to `path` with a success notice.
#[must_use]
pub fn redirect_with_success(path: &str, message: &str) -> Redirect {
    Redirect::to(&with_notice(path, "success", message))
}

fn with_notice(path: &str, key: &str, message: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{key}={}", urlencoding::encode(message))
}

/// Create the auth routes router.
///
/// Only the form submissions are rate limited.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_rate_limiter())),
        )
        .route(
            "/register",
            get(auth::register_page).merge(post(auth::register).layer(auth_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/checkout", post(cart::checkout))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::profile))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .nest("/cart", cart_routes())
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_is_url_encoded() {
        assert_eq!(
            with_notice("/cart", "error", "Not enough stock"),
            "/cart?error=Not%20enough%20stock"
        );
    }

    #[test]
    fn test_notice_appends_to_existing_query() {
        assert_eq!(
            with_notice("/?category=all&q=tea", "success", "Added to cart"),
            "/?category=all&q=tea&success=Added%20to%20cart"
        );
    }
}
