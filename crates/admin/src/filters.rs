//! Custom Askama template filters.

use std::fmt::Display;

use shopfront_core::OrderStatus;

/// CSS class for an order status badge.
///
/// Usage in templates: `{{ order.status|status_class }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn status_class(value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(badge_class(&value.to_string()))
}

fn badge_class(status: &str) -> &'static str {
    match status.parse::<OrderStatus>() {
        Ok(OrderStatus::Pending) => "badge badge-pending",
        Ok(OrderStatus::Processing) => "badge badge-processing",
        Ok(OrderStatus::Shipped) => "badge badge-shipped",
        Ok(OrderStatus::Completed) => "badge badge-completed",
        Ok(OrderStatus::Cancelled) => "badge badge-cancelled",
        Err(_) => "badge",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_class() {
        assert_eq!(badge_class("shipped"), "badge badge-shipped");
        assert_eq!(badge_class("cancelled"), "badge badge-cancelled");
        assert_eq!(badge_class("unknown"), "badge");
    }
}
