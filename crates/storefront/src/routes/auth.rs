//! Authentication route handlers.
//!
//! Handles email/password login, registration and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{MessageQuery, redirect_with_error, redirect_with_success};
use crate::error::{Result, auth_message, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::AuthService;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<CurrentUser>,
    pub messages: MessageQuery,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub user: Option<CurrentUser>,
    pub messages: MessageQuery,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(messages): Query<MessageQuery>,
) -> LoginTemplate {
    LoginTemplate { user, messages }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match AuthService::new(state.pool())
        .sign_in(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            sign_in(&session, &user).await?;
            tracing::info!(user_id = %user.id, "User signed in");
            Ok(Redirect::to("/").into_response())
        }
        Err(err) if err.is_internal() => Err(err.into()),
        Err(err) => {
            tracing::warn!(error = %err, "Login failed");
            Ok(redirect_with_error("/auth/login", &auth_message(&err)).into_response())
        }
    }
}

/// Display the registration page.
pub async fn register_page(
    OptionalAuth(user): OptionalAuth,
    Query(messages): Query<MessageQuery>,
) -> RegisterTemplate {
    RegisterTemplate { user, messages }
}

/// Handle registration form submission.
///
/// A new account is signed in straight away.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    match AuthService::new(state.pool())
        .register(&form.email, &form.password, &form.password_confirm)
        .await
    {
        Ok(user) => {
            sign_in(&session, &user).await?;
            Ok(redirect_with_success("/", "Welcome! Your account is ready.").into_response())
        }
        Err(err) if err.is_internal() => Err(err.into()),
        Err(err) => {
            Ok(redirect_with_error("/auth/register", &auth_message(&err)).into_response())
        }
    }
}

/// Log out and return to the catalog.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

async fn sign_in(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}
