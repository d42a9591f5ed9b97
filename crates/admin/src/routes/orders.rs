//! Order management route handlers.
//!
//! Admins list every order and move them between statuses. Any status may be
//! set from any other.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::{OrderId, OrderItem, OrderStatus};

use super::{MessageQuery, redirect_with_error, redirect_with_success};
use crate::db::{OrderListing, OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Order list query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilterQuery {
    /// A status name, or empty/`all` for every order.
    #[serde(default)]
    pub status: String,
}

impl OrderFilterQuery {
    /// Parse the status filter.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an unknown status name.
    pub fn status(&self) -> Result<Option<OrderStatus>> {
        match self.status.trim() {
            "" | "all" => Ok(None),
            name => name
                .parse::<OrderStatus>()
                .map(Some)
                .map_err(AppError::BadRequest),
        }
    }
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Order row for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderView {
    pub id: String,
    /// First block of the UUID, shown as the order number.
    pub number: String,
    pub customer_email: String,
    pub total: String,
    pub status: String,
    pub status_label: &'static str,
    pub created_at: String,
    pub item_count: i64,
}

impl From<&OrderListing> for OrderView {
    fn from(listing: &OrderListing) -> Self {
        let order = &listing.order;
        let id = order.id.to_string();
        Self {
            number: id.split('-').next().unwrap_or_default().to_uppercase(),
            id,
            customer_email: listing.customer_email.clone(),
            total: order.total.display(),
            status: order.status.as_str().to_string(),
            status_label: order.status.label(),
            created_at: order.created_at.format("%Y-%m-%d %H:%M").to_string(),
            item_count: listing.item_count,
        }
    }
}

/// Order item row for the detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemView {
    pub product_name: String,
    pub product_id: Option<String>,
    pub quantity: i32,
    pub price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            product_id: item.product_id.map(|id| id.to_string()),
            quantity: item.quantity,
            price: item.price.display(),
            line_total: item.line_total().display(),
        }
    }
}

/// One entry of a status selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn status_options(selected: Option<OrderStatus>) -> Vec<StatusOption> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| StatusOption {
            value: status.as_str(),
            label: status.label(),
            selected: selected == Some(status),
        })
        .collect()
}

/// Orders list page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub admin: Option<CurrentAdmin>,
    pub messages: MessageQuery,
    pub orders: Vec<OrderView>,
    pub filter: Vec<StatusOption>,
    pub all_selected: bool,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub admin: Option<CurrentAdmin>,
    pub messages: MessageQuery,
    pub order: OrderView,
    pub items: Vec<OrderItemView>,
    pub statuses: Vec<StatusOption>,
}

/// Orders list page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(filter): Query<OrderFilterQuery>,
    Query(messages): Query<MessageQuery>,
) -> Result<OrdersIndexTemplate> {
    let status = filter.status()?;
    let orders = OrderRepository::new(state.pool()).list(status).await?;

    Ok(OrdersIndexTemplate {
        admin: Some(admin),
        messages,
        orders: orders.iter().map(OrderView::from).collect(),
        filter: status_options(status),
        all_selected: status.is_none(),
    })
}

/// Order detail page handler.
#[instrument(skip(admin, state))]
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Query(messages): Query<MessageQuery>,
) -> Result<OrderShowTemplate> {
    let detail = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_string()))?;

    Ok(OrderShowTemplate {
        admin: Some(admin),
        messages,
        statuses: status_options(Some(detail.listing.order.status)),
        order: OrderView::from(&detail.listing),
        items: detail.items.iter().map(OrderItemView::from).collect(),
    })
}

/// Set an order's status.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let path = format!("/orders/{id}");

    let Ok(status) = form.status.parse::<OrderStatus>() else {
        return Ok(redirect_with_error(&path, "Unknown status"));
    };

    match OrderRepository::new(state.pool())
        .update_status(id, status)
        .await
    {
        Ok((previous, order)) => {
            tracing::info!(
                order_id = %order.id,
                from = %previous,
                to = %order.status,
                "Order status changed"
            );
            Ok(redirect_with_success(
                &path,
                &format!("Status changed to {}", order.status.label()),
            ))
        }
        Err(RepositoryError::Invalid(message)) => Ok(redirect_with_error(&path, &message)),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use shopfront_core::{Order, Price, UserId};

    use super::*;

    #[test]
    fn test_filter_parsing() {
        let query = |status: &str| OrderFilterQuery {
            status: status.to_owned(),
        };
        assert_eq!(query("").status().unwrap(), None);
        assert_eq!(query("all").status().unwrap(), None);
        assert_eq!(
            query("shipped").status().unwrap(),
            Some(OrderStatus::Shipped)
        );
        assert!(matches!(
            query("lost").status(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_status_options_cover_every_status() {
        let options = status_options(Some(OrderStatus::Completed));
        assert_eq!(options.len(), 5);
        assert_eq!(
            options.iter().filter(|o| o.selected).map(|o| o.value).collect::<Vec<_>>(),
            vec!["completed"]
        );
        assert!(status_options(None).iter().all(|o| !o.selected));
    }

    #[test]
    fn test_order_view() {
        let listing = OrderListing {
            order: Order {
                id: "9f8e7d6c-0000-4000-8000-000000000000".parse().unwrap(),
                user_id: UserId::random(),
                total: Price::from_cents(2500),
                status: OrderStatus::Processing,
                created_at: Utc.with_ymd_and_hms(2026, 3, 4, 9, 30, 0).unwrap(),
            },
            customer_email: "buyer@example.com".to_owned(),
            item_count: 3,
        };

        let view = OrderView::from(&listing);
        assert_eq!(view.number, "9F8E7D6C");
        assert_eq!(view.total, "$25.00");
        assert_eq!(view.status, "processing");
        assert_eq!(view.status_label, "Processing");
        assert_eq!(view.created_at, "2026-03-04 09:30");
    }
}
