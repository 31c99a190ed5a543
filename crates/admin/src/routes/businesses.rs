//! Business management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use freshfold_core::Email;
use freshfold_core::models::{Business, NewBusiness};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAdminAuth, SignedInAdmin, push_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Shown when a business admin tries to create a business.
pub const PLATFORM_ADMIN_REQUIRED: &str = "Platform admin access required";

/// Create business form data. `pin_codes` is comma-separated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BusinessForm {
    pub name: String,
    pub owner_email: String,
    pub pin_codes: String,
}

impl BusinessForm {
    /// Validate into the backend payload.
    fn to_new_business(&self) -> Result<NewBusiness, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Please enter a business name".to_string());
        }
        let owner_email = Email::parse(&self.owner_email).map_err(|e| e.to_string())?;

        Ok(NewBusiness {
            name: name.to_string(),
            owner_email: owner_email.into_inner(),
            pin_codes: NewBusiness::split_pin_codes(&self.pin_codes),
        })
    }
}

/// Businesses page template.
#[derive(Template, WebTemplate)]
#[template(path = "businesses/index.html")]
pub struct BusinessesTemplate {
    pub layout: Layout,
    pub businesses: Vec<Business>,
    pub can_create: bool,
    pub form: BusinessForm,
    pub error: Option<String>,
}

/// Businesses list page handler.
#[instrument(skip(state, session, signed_in))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(signed_in): RequireAdminAuth,
) -> Result<BusinessesTemplate, AppError> {
    render(&state, &session, &signed_in, BusinessForm::default(), None).await
}

/// Create a business.
#[instrument(skip(state, session, signed_in, form), fields(name = %form.name))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(signed_in): RequireAdminAuth,
    Form(form): Form<BusinessForm>,
) -> Result<Response, AppError> {
    if !signed_in.admin.can_manage_businesses() {
        push_flash(&session, Flash::error(PLATFORM_ADMIN_REQUIRED)).await?;
        return Ok(Redirect::to("/businesses").into_response());
    }

    let business = match form.to_new_business() {
        Ok(business) => business,
        Err(message) => return failed(&state, &session, &signed_in, form, message).await,
    };

    match state
        .api()
        .authorized(&signed_in.token)
        .create_business(&business)
        .await
    {
        Ok(_) => {
            push_flash(&session, Flash::success("Business created successfully")).await?;
            Ok(Redirect::to("/businesses").into_response())
        }
        Err(e) => {
            tracing::warn!("Failed to create business: {e}");
            let message = e.user_message("Failed to create business");
            failed(&state, &session, &signed_in, form, message).await
        }
    }
}

async fn render(
    state: &AppState,
    session: &Session,
    signed_in: &SignedInAdmin,
    form: BusinessForm,
    error: Option<String>,
) -> Result<BusinessesTemplate, AppError> {
    let mut layout = Layout::load(session, &signed_in.admin, "/businesses").await?;

    let businesses = match state.api().authorized(&signed_in.token).businesses().await {
        Ok(businesses) => businesses,
        Err(e) => {
            tracing::warn!("Failed to load businesses: {e}");
            layout = layout.with_flash(Flash::error("Failed to load businesses"));
            Vec::new()
        }
    };

    Ok(BusinessesTemplate {
        layout,
        businesses,
        can_create: signed_in.admin.can_manage_businesses(),
        form,
        error,
    })
}

async fn failed(
    state: &AppState,
    session: &Session,
    signed_in: &SignedInAdmin,
    form: BusinessForm,
    error: String,
) -> Result<Response, AppError> {
    let page = render(state, session, signed_in, form, Some(error)).await?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_form_splits_postcodes() {
        let form = BusinessForm {
            name: " Bubbles Laundry ".to_string(),
            owner_email: "owner@bubbles.test".to_string(),
            pin_codes: "E14, E1 ,,N1".to_string(),
        };
        let business = form.to_new_business().unwrap();
        assert_eq!(business.name, "Bubbles Laundry");
        assert_eq!(business.pin_codes, vec!["E14", "E1", "N1"]);
    }

    #[test]
    fn test_form_requires_name_and_email() {
        let form = BusinessForm {
            owner_email: "owner@bubbles.test".to_string(),
            ..BusinessForm::default()
        };
        assert!(form.to_new_business().is_err());

        let form = BusinessForm {
            name: "Bubbles".to_string(),
            owner_email: "not-an-email".to_string(),
            ..BusinessForm::default()
        };
        assert!(form.to_new_business().is_err());
    }
}
