//! Catalog page: categories and products grouped by subcategory.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use super::Layout;
use crate::error::AppError;
use crate::filters;
use crate::middleware::SessionContext;
use crate::services::{ProductGroup, group_by_subcategory};
use crate::state::AppState;

/// Catalog query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

/// A category tab.
#[derive(Debug, Clone)]
pub struct CategoryTab {
    pub name: String,
    pub url: String,
    pub selected: bool,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "services.html")]
pub struct ServicesTemplate {
    pub layout: Layout,
    pub categories: Vec<CategoryTab>,
    pub selected_category: Option<String>,
    pub groups: Vec<ProductGroup>,
    /// Inline error when the catalog could not be loaded.
    pub error: Option<String>,
}

/// Display the catalog for the unlocked postcode.
#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    ctx: SessionContext,
    Query(query): Query<CatalogQuery>,
) -> Result<Response, AppError> {
    if ctx.postcode().await?.is_none() {
        return Ok(Redirect::to("/").into_response());
    }

    let layout = Layout::load(&state, &ctx).await?;

    let categories = match state.catalog().categories().await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::warn!("Failed to load categories: {e}");
            return Ok(ServicesTemplate {
                layout,
                categories: Vec::new(),
                selected_category: None,
                groups: Vec::new(),
                error: Some("Failed to load categories".to_string()),
            }
            .into_response());
        }
    };

    let selected = query
        .category
        .filter(|c| !c.is_empty())
        .or_else(|| categories.first().cloned());

    let tabs = categories
        .iter()
        .map(|name| CategoryTab {
            name: name.clone(),
            url: super::catalog_url(Some(name)),
            selected: selected.as_deref() == Some(name.as_str()),
        })
        .collect();

    let (groups, error) = match state.catalog().products(selected.as_deref()).await {
        Ok(products) => (group_by_subcategory(&products), None),
        Err(e) => {
            tracing::warn!("Failed to load products: {e}");
            (Vec::new(), Some("Failed to load products".to_string()))
        }
    };

    Ok(ServicesTemplate {
        layout,
        categories: tabs,
        selected_category: selected,
        groups,
        error,
    }
    .into_response())
}
