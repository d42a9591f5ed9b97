//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (database)
//! GET  /                           - Redirect to orders
//!
//! # Auth (admin role required)
//! GET  /auth/login                 - Login page
//! POST /auth/login                 - Login action
//! POST /auth/logout                - Logout
//!
//! # Products
//! GET  /products                   - Product listing
//! GET  /products/new               - New product form
//! POST /products                   - Create product
//! GET  /products/{id}/edit         - Edit product form
//! POST /products/{id}              - Update product
//! GET  /products/{id}/delete       - Delete confirmation
//! POST /products/{id}/delete       - Delete product
//!
//! # Orders
//! GET  /orders                     - Order listing (?status=<status>)
//! GET  /orders/{id}                - Order detail
//! POST /orders/{id}/status         - Change order status
//! ```

pub mod auth;
pub mod orders;
pub mod products;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;

use crate::state::AppState;

/// Query parameters for error/success display.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl MessageQuery {
    /// Notices holding only an error.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            success: None,
        }
    }
}

/// Redirect to `path` with an error notice.
#[must_use]
pub fn redirect_with_error(path: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{path}?error={}", urlencoding::encode(message)))
}

/// Redirect to `path` with a success notice.
#[must_use]
pub fn redirect_with_success(path: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{path}?success={}", urlencoding::encode(message)))
}

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/orders") }))
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/edit", get(products::edit))
        .route(
            "/products/{id}/delete",
            get(products::confirm_delete).post(products::delete),
        )
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", post(orders::update_status))
}
