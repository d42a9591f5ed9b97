//! Admin account commands.
//!
//! The admin panel has no sign-up page, so accounts are made here.

use shopfront_admin::services::{AdminAuthError, AdminAuthService};
use thiserror::Error;

use super::CommandError;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Auth(#[from] AdminAuthError),
}

/// Create a new admin account.
///
/// # Errors
///
/// Returns an error if the email is taken, the password is too short or long,
/// or the database is unreachable.
pub async fn create(email: &str, password: &str) -> Result<(), AdminError> {
    let pool = super::connect().await?;

    let admin = AdminAuthService::new(&pool)
        .create_admin(email, password)
        .await?;

    tracing::info!(
        "Admin account created! ID: {}, Email: {}",
        admin.id,
        admin.email
    );
    Ok(())
}

/// Give an existing account the admin role.
///
/// # Errors
///
/// Returns an error if no account has this email or the database is
/// unreachable.
pub async fn promote(email: &str) -> Result<(), AdminError> {
    let pool = super::connect().await?;

    let admin = AdminAuthService::new(&pool).promote(email).await?;

    tracing::info!("{} is now an admin", admin.email);
    Ok(())
}
