//! Admin account repository.
//!
//! Admins are ordinary rows in `shop.users` with role `admin`. Accounts are
//! created and promoted from the CLI; the panel itself only signs them in.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopfront_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::admin_user::AdminUser;

#[derive(sqlx::FromRow)]
struct AdminUserRow {
    id: UserId,
    email: String,
    role: UserRole,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            email,
            role: row.role,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: AdminUserRow,
    password_hash: Option<String>,
}

/// Repository for admin accounts.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an account and its password hash by email, whatever its role.
    ///
    /// Returns `None` if the account doesn't exist or has no password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(AdminUser, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r"
            SELECT u.id, u.email, u.role, u.created_at, p.password_hash
            FROM shop.users u
            LEFT JOIN shop.user_passwords p ON u.id = p.user_id
            WHERE u.email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(CredentialsRow {
                user,
                password_hash: Some(hash),
            }) => Ok(Some((AdminUser::try_from(user)?, hash))),
            _ => Ok(None),
        }
    }

    /// Create a new account with role `admin`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn create_admin(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            INSERT INTO shop.users (email, role)
            VALUES ($1, 'admin')
            RETURNING id, email, role, created_at
            ",
        )
        .bind(email.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from_write)?;

        sqlx::query(
            r"
            INSERT INTO shop.user_passwords (user_id, password_hash)
            VALUES ($1, $2)
            ",
        )
        .bind(row.id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        AdminUser::try_from(row)
    }

    /// Grant the `admin` role to an existing account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this email.
    pub async fn promote(&self, email: &Email) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            UPDATE shop.users
            SET role = 'admin', updated_at = now()
            WHERE email = $1
            RETURNING id, email, role, created_at
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        AdminUser::try_from(row)
    }
}
