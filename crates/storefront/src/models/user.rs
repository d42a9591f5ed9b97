//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use shopfront_core::{Email, UserId, UserRole};

/// A shop account (customer or admin).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Customer or admin.
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
