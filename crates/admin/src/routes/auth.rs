//! Authentication route handlers for admin.
//!
//! Credentials are checked by the backend. Only accounts with an admin
//! role get a console session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum::extract::State;
use freshfold_core::Email;
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAdminAuth, clear_current_admin, push_flash, set_current_admin, take_flash};
use crate::models::{CurrentAdmin, Flash};
use crate::state::AppState;

/// Shown when a non-admin account signs in here.
pub const ADMIN_REQUIRED: &str = "Admin access required";

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub error: Option<String>,
}

/// Render the login page.
///
/// GET /auth/login
#[instrument(skip(session, admin))]
pub async fn login_page(
    session: Session,
    OptionalAdminAuth(admin): OptionalAdminAuth,
) -> Result<Response, AppError> {
    if admin.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(LoginTemplate {
        layout: Layout {
            flash: take_flash(&session).await?,
            ..Layout::default()
        },
        email: String::new(),
        error: None,
    }
    .into_response())
}

/// Log in with backend credentials.
///
/// POST /auth/login
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => return Ok(rejected(form.email, e.to_string())),
    };

    let auth = match state.api().login(&email, &form.password).await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::info!("Admin login rejected: {e}");
            return Ok(rejected(email.into_inner(), e.user_message("Login failed")));
        }
    };

    let Some(admin) = CurrentAdmin::from_user(&auth.user) else {
        tracing::warn!(user_id = %auth.user.id, role = %auth.user.role, "Non-admin refused");
        return Ok(rejected(email.into_inner(), ADMIN_REQUIRED.to_string()));
    };

    set_current_admin(&session, &admin, &auth).await?;
    push_flash(&session, Flash::success("Login successful!")).await?;
    set_sentry_user(&admin.id, Some(&admin.email));
    tracing::info!(user_id = %admin.id, role = %admin.role, "Admin signed in");

    Ok(Redirect::to("/").into_response())
}

/// Logout and clear session.
///
/// POST /auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/auth/login"))
}

fn rejected(email: String, error: String) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        LoginTemplate {
            layout: Layout::default(),
            email,
            error: Some(error),
        },
    )
        .into_response()
}
