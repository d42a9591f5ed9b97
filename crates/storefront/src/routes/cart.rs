//! Cart route handlers.
//!
//! Every mutation answers with a redirect back to a page that re-reads the
//! cart, so the browser never holds cart state of its own.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::{CartItemId, ProductId};

use super::{MessageQuery, redirect_with_error, redirect_with_success};
use crate::db::CheckoutOutcome;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::auth::LOGIN_PATH;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::services::{CartError, CartService, CartView, CheckoutService};
use crate::state::AppState;

/// Notice shown when an anonymous visitor tries to add to cart.
pub const SIGN_IN_TO_ADD: &str = "Please sign in to add items to cart";

/// Notice shown after a successful checkout.
pub const ORDER_PLACED: &str = "Order placed successfully!";

/// Add to cart form data.
///
/// `category` and `q` carry the catalog filter so the redirect lands on the
/// same view.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub q: String,
}

impl AddToCartForm {
    fn return_path(&self) -> String {
        if self.category.is_empty() && self.q.is_empty() {
            return "/".to_string();
        }
        format!(
            "/?category={}&q={}",
            urlencoding::encode(&self.category),
            urlencoding::encode(&self.q)
        )
    }
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: CartItemId,
    pub quantity: i32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: CartItemId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub user: Option<CurrentUser>,
    pub messages: MessageQuery,
    pub cart: CartView,
}

/// Map a cart outcome to a redirect, propagating only database failures.
fn cart_redirect(result: std::result::Result<(), CartError>, path: &str) -> Result<Redirect> {
    match result {
        Ok(()) => Ok(Redirect::to(path)),
        Err(CartError::Repository(e)) => Err(e.into()),
        Err(e) => Ok(redirect_with_error(path, &cart_message(&e))),
    }
}

fn cart_message(err: &CartError) -> String {
    match err {
        CartError::StockExceeded => "Not enough stock".to_string(),
        CartError::ProductNotFound => "That product is no longer available".to_string(),
        CartError::LineNotFound => "That item is no longer in your cart".to_string(),
        CartError::Repository(_) => "Something went wrong".to_string(),
    }
}

/// Display the cart tab.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(messages): Query<MessageQuery>,
) -> Result<CartShowTemplate> {
    let cart = CartService::new(state.pool()).view(user.id).await?;

    Ok(CartShowTemplate {
        user: Some(user),
        messages,
        cart,
    })
}

/// Add one unit of a product to the cart.
///
/// Without a signed-in user nothing is read or written; the visitor is sent
/// to the sign-in page instead.
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let Some(user) = user else {
        return Ok(redirect_with_error(LOGIN_PATH, SIGN_IN_TO_ADD).into_response());
    };

    let return_path = form.return_path();
    let product_id = form.product_id.to_string();
    add_breadcrumb("cart", "Add to cart", Some(&[("product_id", product_id.as_str())]));

    match CartService::new(state.pool()).add(user.id, form.product_id).await {
        Ok(quantity) => {
            tracing::info!(product_id = %form.product_id, quantity, "Added to cart");
            Ok(redirect_with_success(&return_path, "Added to cart").into_response())
        }
        Err(e) => Ok(cart_redirect(Err(e), &return_path)?.into_response()),
    }
}

/// Set a line's quantity. Quantities below 1 leave the line unchanged.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    let result = CartService::new(state.pool())
        .update_quantity(user.id, form.line_id, form.quantity)
        .await;

    cart_redirect(result, "/cart")
}

/// Remove a line from the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect> {
    let result = CartService::new(state.pool())
        .remove(user.id, form.line_id)
        .await;

    cart_redirect(result, "/cart")
}

/// Place an order from the cart and switch to the orders tab.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Redirect> {
    add_breadcrumb("checkout", "Checkout started", None);

    match CheckoutService::new(state.pool()).checkout(user.id).await? {
        CheckoutOutcome::Placed(_) => Ok(redirect_with_success("/account/orders", ORDER_PLACED)),
        CheckoutOutcome::EmptyCart => Ok(redirect_with_error("/cart", "Your cart is empty")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_return_path_keeps_filter() {
        let form = AddToCartForm {
            product_id: ProductId::random(),
            category: "all".to_owned(),
            q: "green tea".to_owned(),
        };
        assert_eq!(form.return_path(), "/?category=all&q=green%20tea");

        let form = AddToCartForm {
            product_id: ProductId::random(),
            category: String::new(),
            q: String::new(),
        };
        assert_eq!(form.return_path(), "/");
    }

    #[test]
    fn test_expected_cart_errors_become_notices() {
        let response = cart_redirect(Err(CartError::StockExceeded), "/cart")
            .unwrap()
            .into_response();
        assert_eq!(
            response.headers()["location"],
            "/cart?error=Not%20enough%20stock"
        );
    }
}
