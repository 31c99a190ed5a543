//! Authentication route handlers.
//!
//! Credentials are checked by the backend; the storefront only keeps the
//! returned account and token in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use freshfold_core::Email;
use freshfold_core::client::Registration;
use freshfold_core::models::AuthResponse;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use super::Layout;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{SessionContext, safe_next};
use crate::models::Flash;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
    #[serde(default)]
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password: SecretString,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub next: Option<String>,
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
#[instrument(skip(state, ctx))]
pub async fn login_page(
    State(state): State<AppState>,
    ctx: SessionContext,
    Query(query): Query<LoginQuery>,
) -> Result<LoginTemplate, AppError> {
    Ok(LoginTemplate {
        layout: Layout::load(&state, &ctx).await?,
        email: String::new(),
        next: safe_next(query.next.as_deref()).map(String::from),
        error: None,
    })
}

/// Log in with email and password.
///
/// Admins go to the admin console when one is configured; customers go
/// back to where they were headed, or the catalog.
#[instrument(skip(state, ctx, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    ctx: SessionContext,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = safe_next(form.next.as_deref()).map(String::from);

    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => return login_failed(&state, &ctx, form.email, next, e.to_string()).await,
    };

    match state.api().login(&email, &form.password).await {
        Ok(auth) => {
            signed_in(&ctx, &auth, "Login successful!").await?;

            let destination = if auth.user.role.is_admin() {
                state
                    .config()
                    .admin_console_url
                    .clone()
                    .unwrap_or_else(|| "/services".to_string())
            } else {
                next.unwrap_or_else(|| "/services".to_string())
            };
            Ok(Redirect::to(&destination).into_response())
        }
        Err(e) => {
            tracing::info!("Login rejected: {e}");
            let message = e.user_message("Login failed");
            login_failed(&state, &ctx, email.into_inner(), next, message).await
        }
    }
}

/// Display the registration page.
#[instrument(skip(state, ctx))]
pub async fn register_page(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<RegisterTemplate, AppError> {
    Ok(RegisterTemplate {
        layout: Layout::load(&state, &ctx).await?,
        name: String::new(),
        email: String::new(),
        phone: String::new(),
        error: None,
    })
}

/// Create a customer account and sign in.
#[instrument(skip(state, ctx, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    ctx: SessionContext,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let name = form.name.trim().to_string();
    let phone = form.phone.trim().to_string();

    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => {
            return register_failed(&state, &ctx, &form, e.to_string()).await;
        }
    };
    if name.is_empty() {
        return register_failed(&state, &ctx, &form, "Please enter your name".to_string()).await;
    }

    let registration = Registration {
        name,
        email,
        phone,
        password: form.password.clone(),
    };

    match state.api().register(&registration).await {
        Ok(auth) => {
            signed_in(&ctx, &auth, "Registration successful!").await?;
            Ok(Redirect::to("/services").into_response())
        }
        Err(e) => {
            tracing::info!("Registration rejected: {e}");
            let message = e.user_message("Registration failed");
            register_failed(&state, &ctx, &form, message).await
        }
    }
}

/// Sign out. The cart and postcode are kept for the next visit.
#[instrument(skip(ctx))]
pub async fn logout(ctx: SessionContext) -> Result<Redirect, AppError> {
    ctx.sign_out().await?;
    clear_sentry_user();
    Ok(Redirect::to("/auth/login"))
}

// =============================================================================
// Helpers
// =============================================================================

async fn signed_in(ctx: &SessionContext, auth: &AuthResponse, notice: &str) -> Result<(), AppError> {
    ctx.sign_in(auth).await?;
    ctx.flash(Flash::success(notice)).await?;
    set_sentry_user(&auth.user.id, Some(&auth.user.email));
    tracing::info!(user_id = %auth.user.id, role = %auth.user.role, "Signed in");
    Ok(())
}

async fn login_failed(
    state: &AppState,
    ctx: &SessionContext,
    email: String,
    next: Option<String>,
    error: String,
) -> Result<Response, AppError> {
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        LoginTemplate {
            layout: Layout::load(state, ctx).await?,
            email,
            next,
            error: Some(error),
        },
    )
        .into_response())
}

async fn register_failed(
    state: &AppState,
    ctx: &SessionContext,
    form: &RegisterForm,
    error: String,
) -> Result<Response, AppError> {
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        RegisterTemplate {
            layout: Layout::load(state, ctx).await?,
            name: form.name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            error: Some(error),
        },
    )
        .into_response())
}
