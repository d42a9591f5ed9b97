//! Shopfront Core - Shared domain types and pure storefront logic.
//!
//! This crate provides the types and rules used across all Shopfront components:
//! - `storefront` - Customer-facing catalog, cart and checkout
//! - `admin` - Product and order management panel
//! - `cli` - Command-line tools for migrations, seeding and admin accounts
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no database access,
//! no HTTP. Every rule the web binaries must agree on (catalog filtering, cart
//! arithmetic, checkout planning, order status transitions) lives here so it can
//! be unit tested without a running `PostgreSQL`.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`catalog`] - Products, categories and the catalog filter
//! - [`cart`] - Cart lines, totals and quantity rules
//! - [`order`] - Orders, order item snapshots and checkout planning
//! - [`password`] - Argon2 password hashing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod password;
pub mod types;

pub use cart::{CartLine, CartProduct, QuantityChange};
pub use catalog::{CatalogQuery, Category, CategoryFilter, Product, ProductInput};
pub use order::{CheckoutPlan, Order, OrderItem, OrderItemDraft};
pub use types::*;
