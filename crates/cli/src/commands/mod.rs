//! Command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by every command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read the database URL, preferring `DATABASE_URL`.
fn database_url(var: impl Fn(&str) -> Option<String>) -> Result<SecretString, CommandError> {
    var("DATABASE_URL")
        .or_else(|| var("STOREFRONT_DATABASE_URL"))
        .map(SecretString::from)
        .ok_or(CommandError::MissingEnvVar("DATABASE_URL"))
}

/// Load `.env` and connect to the shop database.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();
    let url = database_url(|key| std::env::var(key).ok())?;

    tracing::info!("Connecting to database...");
    Ok(shopfront_admin::db::create_pool(&url).await?)
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_database_url_fallback() {
        let url = database_url(|key| {
            (key == "STOREFRONT_DATABASE_URL").then(|| "postgres://shop".to_owned())
        });
        assert!(matches!(url, Ok(ref u) if u.expose_secret() == "postgres://shop"));

        let url = database_url(|key| match key {
            "DATABASE_URL" => Some("postgres://main".to_owned()),
            _ => Some("postgres://other".to_owned()),
        });
        assert!(matches!(url, Ok(ref u) if u.expose_secret() == "postgres://main"));

        assert!(matches!(
            database_url(|_| None),
            Err(CommandError::MissingEnvVar("DATABASE_URL"))
        ));
    }
}
