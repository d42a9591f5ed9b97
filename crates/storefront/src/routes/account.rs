//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use shopfront_core::{Order, OrderId, OrderItem};

use super::MessageQuery;
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Order row for the orders tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub id: String,
    /// First block of the UUID, shown as the order number.
    pub number: String,
    pub placed_on: String,
    pub status: String,
    pub status_label: &'static str,
    pub total: String,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        let id = order.id.to_string();
        let number = id.split('-').next().unwrap_or_default().to_uppercase();
        Self {
            number,
            id,
            placed_on: order.created_at.format("%b %-d, %Y").to_string(),
            status: order.status.as_str().to_string(),
            status_label: order.status.label(),
            total: order.total.display(),
        }
    }
}

/// One item snapshot on the order detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemView {
    pub product_name: String,
    pub quantity: i32,
    pub price: String,
    pub line_total: String,
    /// The product has since been deleted from the catalog.
    pub discontinued: bool,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            price: item.price.display(),
            line_total: item.line_total().display(),
            discontinued: item.product_id.is_none(),
        }
    }
}

/// Profile tab template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub user: Option<CurrentUser>,
    pub messages: MessageQuery,
    pub email: String,
}

/// Orders tab template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub user: Option<CurrentUser>,
    pub messages: MessageQuery,
    pub orders: Vec<OrderSummary>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderTemplate {
    pub user: Option<CurrentUser>,
    pub messages: MessageQuery,
    pub order: OrderSummary,
    pub items: Vec<OrderItemView>,
}

/// Display the profile tab.
#[instrument(skip(user))]
pub async fn profile(
    RequireAuth(user): RequireAuth,
    Query(messages): Query<MessageQuery>,
) -> ProfileTemplate {
    ProfileTemplate {
        email: user.email.to_string(),
        user: Some(user),
        messages,
    }
}

/// Display the orders tab, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(messages): Query<MessageQuery>,
) -> Result<OrdersTemplate> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(OrdersTemplate {
        user: Some(user),
        messages,
        orders: orders.iter().map(OrderSummary::from).collect(),
    })
}

/// Display one of the user's orders.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<OrderTemplate> {
    let (order, items) = OrderRepository::new(state.pool())
        .get_for_user(user.id, order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_string()))?;

    Ok(OrderTemplate {
        user: Some(user),
        messages: MessageQuery::default(),
        order: OrderSummary::from(&order),
        items: items.iter().map(OrderItemView::from).collect(),
    })
}
