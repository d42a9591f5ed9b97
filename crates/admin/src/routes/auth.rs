//! Admin sign-in and sign-out.

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

use super::{MessageQuery, redirect_with_error};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub admin: Option<CurrentAdmin>,
    pub messages: MessageQuery,
}

/// Display the login page, or skip it when already signed in.
pub async fn login_page(
    OptionalAdminAuth(admin): OptionalAdminAuth,
    Query(messages): Query<MessageQuery>,
) -> Response {
    if admin.is_some() {
        return Redirect::to("/orders").into_response();
    }
    LoginTemplate { admin, messages }.into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match AdminAuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(admin) => {
            set_current_admin(&session, &CurrentAdmin::from(&admin)).await?;
            set_sentry_user(&admin.id, Some(admin.email.as_str()));
            tracing::info!(admin_id = %admin.id, "Admin signed in");
            Ok(Redirect::to("/orders").into_response())
        }
        Err(err @ (AdminAuthError::Repository(_) | AdminAuthError::PasswordHash)) => {
            Err(err.into())
        }
        Err(err) => {
            tracing::warn!(error = %err, "Admin login failed");
            Ok(redirect_with_error("/auth/login", "Invalid email or password").into_response())
        }
    }
}

/// Log out.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/auth/login"))
}
