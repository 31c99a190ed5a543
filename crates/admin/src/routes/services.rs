//! Legacy service creation.
//!
//! Services predate the product catalog. The console can still create them
//! but never lists them.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use freshfold_core::models::{Business, NewService};
use freshfold_core::{BusinessId, Money};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAdminAuth, SignedInAdmin, push_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Create service form data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceForm {
    pub business_id: String,
    pub name: String,
    pub category: String,
    pub base_price: String,
    pub description: String,
    pub image_url: String,
}

impl ServiceForm {
    fn to_new_service(&self) -> Result<NewService, String> {
        let business_id = self.business_id.trim();
        let name = self.name.trim();
        let category = self.category.trim();
        if business_id.is_empty() || name.is_empty() || category.is_empty() {
            return Err("Business, name and category are required".to_string());
        }
        let image_url = self.image_url.trim();

        Ok(NewService {
            business_id: BusinessId::new(business_id),
            name: name.to_string(),
            category: category.to_string(),
            base_price: Money::parse(&self.base_price).map_err(|e| e.to_string())?,
            description: self.description.trim().to_string(),
            image_url: (!image_url.is_empty()).then(|| image_url.to_string()),
        })
    }
}

/// New service page template.
#[derive(Template, WebTemplate)]
#[template(path = "services/new.html")]
pub struct NewServiceTemplate {
    pub layout: Layout,
    pub form: ServiceForm,
    pub businesses: Vec<Business>,
    pub categories: Vec<String>,
    pub error: Option<String>,
}

/// New service form.
#[instrument(skip(state, session, signed_in))]
pub async fn new(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(signed_in): RequireAdminAuth,
) -> Result<NewServiceTemplate, AppError> {
    render(&state, &session, &signed_in, ServiceForm::default(), None).await
}

/// Create a service.
#[instrument(skip(state, session, signed_in, form), fields(name = %form.name))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(signed_in): RequireAdminAuth,
    Form(form): Form<ServiceForm>,
) -> Result<Response, AppError> {
    let service = match form.to_new_service() {
        Ok(service) => service,
        Err(message) => {
            let page = render(&state, &session, &signed_in, form, Some(message)).await?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    match state
        .api()
        .authorized(&signed_in.token)
        .create_service(&service)
        .await
    {
        Ok(()) => {
            push_flash(&session, Flash::success("Service created successfully")).await?;
            Ok(Redirect::to("/services/new").into_response())
        }
        Err(e) => {
            tracing::warn!("Failed to create service: {e}");
            let message = "Failed to create service".to_string();
            let page = render(&state, &session, &signed_in, form, Some(message)).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

async fn render(
    state: &AppState,
    session: &Session,
    signed_in: &SignedInAdmin,
    form: ServiceForm,
    error: Option<String>,
) -> Result<NewServiceTemplate, AppError> {
    let mut layout = Layout::load(session, &signed_in.admin, "/services/new").await?;

    let businesses = state.api().authorized(&signed_in.token).businesses().await;
    let categories = state.api().categories().await;
    if businesses.is_err() || categories.is_err() {
        tracing::warn!("Failed to load service form options");
        layout = layout.with_flash(Flash::error("Failed to load data"));
    }

    Ok(NewServiceTemplate {
        layout,
        form,
        businesses: businesses.unwrap_or_default(),
        categories: categories.unwrap_or_default(),
        error,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_service_form_validation() {
        let form = ServiceForm {
            business_id: "b1".to_string(),
            name: "Wash & Fold".to_string(),
            category: "Laundry".to_string(),
            base_price: "£12".to_string(),
            ..ServiceForm::default()
        };
        let service = form.to_new_service().unwrap();
        assert_eq!(service.base_price, Money::from_pence(1200));
        assert!(service.image_url.is_none());

        let missing = ServiceForm {
            category: String::new(),
            ..form
        };
        assert!(missing.to_new_service().is_err());
    }
}
