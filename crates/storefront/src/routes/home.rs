//! Landing page and the postcode gate.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use freshfold_core::Postcode;
use serde::Deserialize;
use tracing::instrument;

use super::Layout;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::SessionContext;
use crate::models::Flash;
use crate::state::AppState;

/// Shown when the backend has no business serving the postcode.
pub const NOT_SERVICEABLE: &str = "Service not available in your area yet";

/// Shown when the availability check itself failed.
pub const CHECK_FAILED: &str = "Failed to check availability";

/// Postcode checker form data.
#[derive(Debug, Deserialize)]
pub struct PostcodeForm {
    #[serde(default)]
    pub pin_code: String,
}

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "landing.html")]
pub struct LandingTemplate {
    pub layout: Layout,
    /// Value to keep in the postcode input.
    pub pin_code: String,
    /// Inline error under the postcode input.
    pub error: Option<String>,
}

/// Display the landing page.
#[instrument(skip(state, ctx))]
pub async fn landing(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<LandingTemplate, AppError> {
    let layout = Layout::load(&state, &ctx).await?;
    Ok(LandingTemplate {
        pin_code: layout.postcode.clone().unwrap_or_default(),
        layout,
        error: None,
    })
}

/// Check a postcode and unlock the catalog when it is serviced.
///
/// A negative answer locks the catalog again and re-renders the landing
/// page with the reason. A failed check leaves the gate as it was.
#[instrument(skip(state, ctx, form), fields(pin_code = %form.pin_code))]
pub async fn check_postcode(
    State(state): State<AppState>,
    ctx: SessionContext,
    Form(form): Form<PostcodeForm>,
) -> Result<Response, AppError> {
    let postcode = match Postcode::parse(&form.pin_code) {
        Ok(postcode) => postcode,
        Err(e) => return rejected(&state, &ctx, form.pin_code, e.to_string()).await,
    };

    match state.api().check_postcode(&postcode).await {
        Ok(availability) if availability.available => {
            ctx.unlock(&postcode, &availability.businesses).await?;
            ctx.flash(Flash::success("Service is available!")).await?;
            add_breadcrumb(
                "postcode",
                "Catalog unlocked",
                Some(&[("pin_code", postcode.as_str())]),
            );
            tracing::info!(
                businesses = availability.businesses.len(),
                "Postcode serviceable"
            );
            Ok(Redirect::to("/services").into_response())
        }
        Ok(_) => {
            tracing::info!("Postcode not serviceable");
            ctx.lock().await?;
            rejected(&state, &ctx, postcode.to_string(), NOT_SERVICEABLE.to_string()).await
        }
        Err(e) => {
            tracing::warn!("Postcode check failed: {e}");
            let message = if e.is_transport() {
                CHECK_FAILED.to_string()
            } else {
                e.user_message(CHECK_FAILED)
            };
            rejected(&state, &ctx, postcode.to_string(), message).await
        }
    }
}

/// Forget the postcode and lock the catalog again.
#[instrument(skip(ctx))]
pub async fn clear_postcode(ctx: SessionContext) -> Result<Redirect, AppError> {
    ctx.lock().await?;
    Ok(Redirect::to("/"))
}

async fn rejected(
    state: &AppState,
    ctx: &SessionContext,
    pin_code: String,
    error: String,
) -> Result<Response, AppError> {
    let layout = Layout::load(state, ctx).await?;
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        LandingTemplate {
            layout,
            pin_code,
            error: Some(error),
        },
    )
        .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn landing(cart_count: u32) -> String {
        LandingTemplate {
            layout: Layout {
                cart_count,
                ..Layout::default()
            },
            pin_code: String::new(),
            error: None,
        }
        .render()
        .unwrap()
    }

    #[test]
    fn test_layout_badge_reflects_cart_count() {
        let html = landing(4);
        assert!(html.contains(">4</span>"));
        assert!(!html.contains("badge-empty"));

        assert!(landing(0).contains("badge-empty"));
    }
}
