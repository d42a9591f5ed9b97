//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use shopfront_core::{Email, UserId};

use super::admin_user::AdminUser;

/// Session-stored admin identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's user ID.
    pub id: UserId,
    /// Admin's email address.
    pub email: Email,
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(admin: &AdminUser) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
