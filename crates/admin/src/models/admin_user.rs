//! Admin user domain types.

use chrono::{DateTime, Utc};

use shopfront_core::{Email, UserId, UserRole};

/// An account as seen by the admin panel.
///
/// Only accounts whose role is [`UserRole::Admin`] may sign in.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}
