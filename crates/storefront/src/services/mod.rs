//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Email and password authentication
//! - `cart` - Cart mutations and the cart view model
//! - `checkout` - Turning a cart into an order

pub mod auth;
pub mod cart;
pub mod checkout;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService, CartView};
pub use checkout::CheckoutService;
