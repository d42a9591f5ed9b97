//! Customer accounts: registration and password sign-in.
//!
//! New accounts always get the `customer` role. Passwords are stored as
//! argon2 PHC strings in `shop.user_passwords`.

use sqlx::PgPool;
use thiserror::Error;

use shopfront_core::password::{PasswordError, hash_password, validate_password, verify_password};
use shopfront_core::{Email, EmailError};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Unknown email or wrong password. The two are not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The registration form's two password fields differ.
    #[error("passwords do not match")]
    ConfirmationMismatch,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing error")]
    PasswordHash,
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::InvalidLength => Self::WeakPassword(err.to_string()),
            PasswordError::Mismatch => Self::InvalidCredentials,
            PasswordError::Hash => Self::PasswordHash,
        }
    }
}

impl AuthError {
    /// Whether the failure is ours rather than the customer's.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::PasswordHash)
    }
}

pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// `ConfirmationMismatch`, `InvalidEmail` and `WeakPassword` are checked
    /// in that order before anything is hashed. `UserAlreadyExists` if the
    /// email is taken.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<User, AuthError> {
        if password != confirmation {
            return Err(AuthError::ConfirmationMismatch);
        }
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create_with_password(&email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "Customer registered");
        Ok(user)
    }

    /// Check an email and password pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email, an
    /// account without a password, or a wrong password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let Some((user, password_hash)) = self.users.get_password_hash(&email).await? else {
            tracing::debug!("Sign-in for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    #[test]
    fn test_password_errors_map_to_auth_errors() {
        assert!(matches!(
            AuthError::from(PasswordError::InvalidLength),
            AuthError::WeakPassword(_)
        ));
        assert!(matches!(
            AuthError::from(PasswordError::Mismatch),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::from(PasswordError::Hash),
            AuthError::PasswordHash
        ));
    }

    #[test]
    fn test_internal_errors() {
        assert!(AuthError::PasswordHash.is_internal());
        assert!(!AuthError::InvalidCredentials.is_internal());
        assert!(!AuthError::ConfirmationMismatch.is_internal());
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input_before_touching_the_database() {
        #[allow(clippy::unwrap_used)]
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        let auth = AuthService::new(&pool);

        assert!(matches!(
            auth.register("a@example.com", "long enough pw", "different pw").await,
            Err(AuthError::ConfirmationMismatch)
        ));
        assert!(matches!(
            auth.register("not-an-email", "long enough pw", "long enough pw").await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            auth.register("a@example.com", "short", "short").await,
            Err(AuthError::WeakPassword(_))
        ));
    }
}
