//! Request-level errors for the storefront.
//!
//! Handlers return [`Result`]. Expected failures (bad form input, stock
//! limits) never get here: they are turned into redirects with a notice by
//! the handlers themselves. What is left is either a missing resource or a
//! server fault, and server faults are reported to Sentry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// A page for something that doesn't exist or isn't the customer's.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::Database(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::UserAlreadyExists) => StatusCode::CONFLICT,
            Self::Auth(
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::ConfirmationMismatch,
            ) => {
                StatusCode::BAD_REQUEST
            }
            Self::Database(_)
            | Self::Session(_)
            | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Request failed");
            return (status, "Internal server error").into_response();
        }

        let message = match &self {
            Self::Auth(err) => auth_message(err),
            Self::NotFound(what) => format!("No such {what}"),
            _ => "Not found".to_string(),
        };
        (status, message).into_response()
    }
}

/// Customer-facing text for an auth failure.
///
/// Also used for the notices shown on the sign-in and registration forms.
#[must_use]
pub fn auth_message(err: &AuthError) -> String {
    match err {
        AuthError::InvalidCredentials => "Invalid email or password".to_string(),
        AuthError::UserAlreadyExists => "An account with this email already exists".to_string(),
        AuthError::WeakPassword(msg) => msg.clone(),
        AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
        AuthError::ConfirmationMismatch => "Passwords do not match".to_string(),
        AuthError::Repository(_) | AuthError::PasswordHash => "Authentication error".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Tag Sentry events from this request scope with the signed-in customer.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| scope.set_user(None));
}

/// Record a cart or checkout step so it shows up in the trail of any later
/// Sentry event.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let data = data
        .unwrap_or_default()
        .iter()
        .map(|(key, value)| ((*key).to_string(), serde_json::Value::from(*value)))
        .collect();

    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        data,
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_things_are_404() {
        assert_eq!(
            AppError::NotFound("order".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Database(RepositoryError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_faults_are_500() {
        assert_eq!(
            AppError::Database(RepositoryError::DataCorruption("bad".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Auth(AuthError::PasswordHash).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let response = AppError::Database(RepositoryError::DataCorruption(
            "price column held text".to_string(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_auth_failures_map_to_client_errors() {
        assert_eq!(
            AppError::Auth(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Auth(AuthError::UserAlreadyExists).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Auth(AuthError::WeakPassword("short".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_auth_messages_hide_internals() {
        let err = AuthError::Repository(RepositoryError::DataCorruption(
            "invalid email in database".to_string(),
        ));
        assert_eq!(auth_message(&err), "Authentication error");
        assert_eq!(
            auth_message(&AuthError::InvalidCredentials),
            "Invalid email or password"
        );
    }
}
