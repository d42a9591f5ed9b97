//! Admin authentication.
//!
//! Admins sign in with the same email and password as their storefront
//! account; the account must carry the `admin` role.

use sqlx::PgPool;
use thiserror::Error;

use shopfront_core::password::{PasswordError, hash_password, validate_password, verify_password};
use shopfront_core::{Email, EmailError};

use crate::db::{AdminUserRepository, RepositoryError};
use crate::models::AdminUser;

/// Errors that can occur during admin authentication.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Wrong password, unknown account, or an account without the admin role.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password validation failed: {0}")]
    WeakPassword(String),

    #[error("account already exists")]
    AlreadyExists,

    #[error("no account with this email")]
    UnknownAccount,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing error")]
    PasswordHash,
}

impl From<PasswordError> for AdminAuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::InvalidLength => Self::WeakPassword(err.to_string()),
            PasswordError::Mismatch => Self::InvalidCredentials,
            PasswordError::Hash => Self::PasswordHash,
        }
    }
}

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    admins: AdminUserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            admins: AdminUserRepository::new(pool),
        }
    }

    /// Sign in with email and password.
    ///
    /// Customers get the same `InvalidCredentials` as a wrong password.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` if the email/password is
    /// wrong or the account is not an admin.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, AdminAuthError> {
        let email = Email::parse(email)?;

        let (admin, password_hash) = self
            .admins
            .get_credentials(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !admin.role.is_admin() {
            tracing::warn!(user_id = %admin.id, "Non-admin account attempted admin sign-in");
            return Err(AdminAuthError::InvalidCredentials);
        }

        Ok(admin)
    }

    /// Create a new admin account.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::AlreadyExists` if the email is registered.
    /// Returns `AdminAuthError::WeakPassword` if the password is too short or long.
    pub async fn create_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AdminUser, AdminAuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.admins
            .create_admin(&email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AdminAuthError::AlreadyExists,
                other => AdminAuthError::Repository(other),
            })
    }

    /// Give an existing account the admin role.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::UnknownAccount` if no account has this email.
    pub async fn promote(&self, email: &str) -> Result<AdminUser, AdminAuthError> {
        let email = Email::parse(email)?;

        self.admins.promote(&email).await.map_err(|e| match e {
            RepositoryError::NotFound => AdminAuthError::UnknownAccount,
            other => AdminAuthError::Repository(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_errors_map_to_admin_auth_errors() {
        assert!(matches!(
            AdminAuthError::from(PasswordError::InvalidLength),
            AdminAuthError::WeakPassword(_)
        ));
        assert!(matches!(
            AdminAuthError::from(PasswordError::Mismatch),
            AdminAuthError::InvalidCredentials
        ));
        assert!(matches!(
            AdminAuthError::from(PasswordError::Hash),
            AdminAuthError::PasswordHash
        ));
    }
}
