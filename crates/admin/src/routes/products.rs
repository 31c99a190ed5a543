//! Product management route handlers.
//!
//! The listing is fetched whole and filtered here: search matches name or
//! category, and the service type and category selects narrow it further.
//! Matching products are grouped as `service type > category`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use freshfold_core::models::{Business, Product, ProductInput};
use freshfold_core::{BusinessId, Money, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{Layout, Toast, is_htmx};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAdminAuth, SignedInAdmin, push_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Select value meaning "no filter".
const ALL: &str = "all";

// =============================================================================
// Filtering and grouping
// =============================================================================

/// Listing filters from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductQuery {
    pub search: String,
    pub service_type: String,
    pub category: String,
}

impl ProductQuery {
    fn selected(value: &str) -> Option<&str> {
        let value = value.trim();
        (!value.is_empty() && value != ALL).then_some(value)
    }

    /// Whether `product` passes every active filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let search = self.search.trim().to_lowercase();
        let matches_search = search.is_empty()
            || product.name.to_lowercase().contains(&search)
            || product.category.to_lowercase().contains(&search);

        let matches_service_type = Self::selected(&self.service_type)
            .is_none_or(|wanted| product.service_type == wanted);
        let matches_category =
            Self::selected(&self.category).is_none_or(|wanted| product.category == wanted);

        matches_search && matches_service_type && matches_category
    }
}

/// Products sharing a service type and category.
#[derive(Debug, Clone)]
pub struct ProductGroup {
    /// `"{service_type} > {category}"`.
    pub key: String,
    pub products: Vec<Product>,
}

/// Filter and group products, keeping groups in first-seen order.
#[must_use]
pub fn group_products(products: &[Product], query: &ProductQuery) -> Vec<ProductGroup> {
    let mut groups: Vec<ProductGroup> = Vec::new();

    for product in products.iter().filter(|p| query.matches(p)) {
        let key = format!("{} > {}", product.service_type, product.category);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.products.push(product.clone()),
            None => groups.push(ProductGroup {
                key,
                products: vec![product.clone()],
            }),
        }
    }

    groups
}

/// Distinct categories in first-seen order.
#[must_use]
pub fn distinct_categories(products: &[Product]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for product in products {
        if !categories.contains(&product.category) {
            categories.push(product.category.clone());
        }
    }
    categories
}

// =============================================================================
// Forms
// =============================================================================

/// Create/edit product form data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub business_id: String,
    pub service_type: String,
    pub category: String,
    pub subcategory: String,
    pub name: String,
    pub price: String,
    pub icon_url: String,
    pub sort_order: String,
}

impl ProductForm {
    /// Validate into the backend payload.
    fn to_input(&self) -> Result<ProductInput, String> {
        let required = |value: &str, label: &str| {
            let value = value.trim();
            if value.is_empty() {
                Err(format!("{label} is required"))
            } else {
                Ok(value.to_string())
            }
        };
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        Ok(ProductInput {
            business_id: BusinessId::new(required(&self.business_id, "Business")?),
            service_type: required(&self.service_type, "Service type")?,
            category: required(&self.category, "Category")?,
            subcategory: optional(&self.subcategory),
            name: required(&self.name, "Product name")?,
            price: Money::parse(&self.price).map_err(|e| e.to_string())?,
            icon_url: optional(&self.icon_url),
            sort_order: optional(&self.sort_order)
                .map(|raw| raw.parse().map_err(|_| "Sort order must be a whole number".to_string()))
                .transpose()?,
        })
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            business_id: product.business_id.to_string(),
            service_type: product.service_type.clone(),
            category: product.category.clone(),
            subcategory: product.subcategory.clone().unwrap_or_default(),
            name: product.name.clone(),
            price: product.price.plain(),
            icon_url: product.icon_url.clone().unwrap_or_default(),
            sort_order: product
                .sort_order
                .map(|n| n.to_string())
                .unwrap_or_default(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Products list page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub query: ProductQuery,
    pub service_types: Vec<String>,
    pub categories: Vec<String>,
    pub groups: Vec<ProductGroup>,
    pub total: usize,
}

/// Create/edit product page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    /// `None` when creating.
    pub product_id: Option<String>,
    pub form: ProductForm,
    pub businesses: Vec<Business>,
    pub service_types: Vec<String>,
    pub error: Option<String>,
}

impl ProductFormTemplate {
    /// Form `action` for this page.
    #[must_use]
    pub fn action(&self) -> String {
        self.product_id
            .as_ref()
            .map_or_else(|| "/products".to_string(), |id| format!("/products/{id}"))
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Products list page handler.
#[instrument(skip(state, session, signed_in))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(signed_in): RequireAdminAuth,
    Query(query): Query<ProductQuery>,
) -> Result<ProductsIndexTemplate, AppError> {
    let mut layout = Layout::load(&session, &signed_in.admin, "/products").await?;
    let api = state.api().authorized(&signed_in.token);

    let (products, service_types) = match (api.admin_products().await, state.api().service_types().await) {
        (Ok(products), Ok(service_types)) => (products, service_types),
        (products, service_types) => {
            if let Err(e) = &products {
                tracing::warn!("Failed to load products: {e}");
            }
            if let Err(e) = &service_types {
                tracing::warn!("Failed to load service types: {e}");
            }
            layout = layout.with_flash(Flash::error("Failed to load data"));
            (products.unwrap_or_default(), service_types.unwrap_or_default())
        }
    };

    let groups = group_products(&products, &query);
    Ok(ProductsIndexTemplate {
        layout,
        categories: distinct_categories(&products),
        total: groups.iter().map(|g| g.products.len()).sum(),
        groups,
        service_types,
        query,
    })
}

/// New product form.
#[instrument(skip(state, session, signed_in))]
pub async fn new(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(signed_in): RequireAdminAuth,
) -> Result<ProductFormTemplate, AppError> {
    form_page(&state, &session, &signed_in, None, ProductForm::default(), None).await
}

/// Create a product.
#[instrument(skip(state, session, signed_in, form), fields(name = %form.name))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(signed_in): RequireAdminAuth,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    let input = match form.to_input() {
        Ok(input) => input,
        Err(message) => return rejected(&state, &session, &signed_in, None, form, message).await,
    };

    match state
        .api()
        .authorized(&signed_in.token)
        .create_product(&input)
        .await
    {
        Ok(_) => {
            push_flash(&session, Flash::success("Product created successfully")).await?;
            Ok(Redirect::to("/products").into_response())
        }
        Err(e) => {
            tracing::warn!("Failed to create product: {e}");
            let message = e.user_message("Operation failed");
            rejected(&state, &session, &signed_in, None, form, message).await
        }
    }
}

/// Edit product form.
#[instrument(skip(state, session, signed_in), fields(product_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(signed_in): RequireAdminAuth,
    Path(id): Path<ProductId>,
) -> Result<Response, AppError> {
    let products = match state.api().authorized(&signed_in.token).admin_products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!("Failed to load products: {e}");
            push_flash(&session, Flash::error("Failed to load data")).await?;
            return Ok(Redirect::to("/products").into_response());
        }
    };

    let Some(product) = products.iter().find(|p| p.id == id) else {
        push_flash(&session, Flash::error("Product not found")).await?;
        return Ok(Redirect::to("/products").into_response());
    };

    let form = ProductForm::from(product);
    Ok(form_page(&state, &session, &signed_in, Some(&id), form, None)
        .await?
        .into_response())
}

/// Update a product.
#[instrument(skip(state, session, signed_in, form), fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(signed_in): RequireAdminAuth,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    let input = match form.to_input() {
        Ok(input) => input,
        Err(message) => {
            return rejected(&state, &session, &signed_in, Some(&id), form, message).await;
        }
    };

    match state
        .api()
        .authorized(&signed_in.token)
        .update_product(&id, &input)
        .await
    {
        Ok(()) => {
            push_flash(&session, Flash::success("Product updated successfully")).await?;
            Ok(Redirect::to("/products").into_response())
        }
        Err(e) => {
            tracing::warn!("Failed to update product: {e}");
            let message = e.user_message("Operation failed");
            rejected(&state, &session, &signed_in, Some(&id), form, message).await
        }
    }
}

/// Delete a product. HTMX removes the row in place.
#[instrument(skip(state, session, signed_in, headers), fields(product_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(signed_in): RequireAdminAuth,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> Result<Response, AppError> {
    let result = state
        .api()
        .authorized(&signed_in.token)
        .delete_product(&id)
        .await;

    if let Err(e) = &result {
        tracing::warn!("Failed to delete product: {e}");
    }

    match (result.is_ok(), is_htmx(&headers)) {
        (true, true) => Ok((Toast::success("Product deleted successfully"), "").into_response()),
        (false, true) => {
            Ok((Toast::error("Failed to delete product"), StatusCode::NO_CONTENT).into_response())
        }
        (ok, false) => {
            let flash = if ok {
                Flash::success("Product deleted successfully")
            } else {
                Flash::error("Failed to delete product")
            };
            push_flash(&session, flash).await?;
            Ok(Redirect::to("/products").into_response())
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn form_page(
    state: &AppState,
    session: &Session,
    signed_in: &SignedInAdmin,
    product_id: Option<&ProductId>,
    form: ProductForm,
    error: Option<String>,
) -> Result<ProductFormTemplate, AppError> {
    let mut layout = Layout::load(session, &signed_in.admin, "/products").await?;

    let businesses = state.api().authorized(&signed_in.token).businesses().await;
    let service_types = state.api().service_types().await;
    if businesses.is_err() || service_types.is_err() {
        tracing::warn!("Failed to load product form options");
        layout = layout.with_flash(Flash::error("Failed to load data"));
    }

    Ok(ProductFormTemplate {
        layout,
        product_id: product_id.map(ToString::to_string),
        form,
        businesses: businesses.unwrap_or_default(),
        service_types: service_types.unwrap_or_default(),
        error,
    })
}

async fn rejected(
    state: &AppState,
    session: &Session,
    signed_in: &SignedInAdmin,
    product_id: Option<&ProductId>,
    form: ProductForm,
    error: String,
) -> Result<Response, AppError> {
    let page = form_page(state, session, signed_in, product_id, form, Some(error)).await?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, service_type: &str, category: &str, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            business_id: BusinessId::new("b1"),
            business_name: "Bubbles".to_string(),
            service_type: service_type.to_string(),
            category: category.to_string(),
            subcategory: None,
            name: name.to_string(),
            price: Money::from_pence(450),
            icon_url: None,
            sort_order: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("p1", "Dry Cleaning", "Tops", "Shirt"),
            product("p2", "Laundry", "Bedding", "Duvet"),
            product("p3", "Dry Cleaning", "Tops", "Blouse"),
            product("p4", "Dry Cleaning", "Bottoms", "Trousers"),
        ]
    }

    #[test]
    fn test_groups_by_service_type_and_category() {
        let groups = group_products(&catalog(), &ProductQuery::default());
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(
            keys,
            ["Dry Cleaning > Tops", "Laundry > Bedding", "Dry Cleaning > Bottoms"]
        );
        assert_eq!(groups[0].products.len(), 2);
    }

    #[test]
    fn test_search_matches_name_or_category() {
        let query = ProductQuery {
            search: "BOTT".to_string(),
            ..ProductQuery::default()
        };
        let groups = group_products(&catalog(), &query);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].products[0].name, "Trousers");

        let query = ProductQuery {
            search: "duv".to_string(),
            ..ProductQuery::default()
        };
        assert_eq!(group_products(&catalog(), &query)[0].products[0].name, "Duvet");
    }

    #[test]
    fn test_select_filters() {
        let query = ProductQuery {
            service_type: "Dry Cleaning".to_string(),
            category: "Tops".to_string(),
            ..ProductQuery::default()
        };
        let groups = group_products(&catalog(), &query);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].products.len(), 2);

        let query = ProductQuery {
            service_type: ALL.to_string(),
            category: ALL.to_string(),
            ..ProductQuery::default()
        };
        assert_eq!(group_products(&catalog(), &query).len(), 3);
    }

    #[test]
    fn test_distinct_categories() {
        assert_eq!(distinct_categories(&catalog()), ["Tops", "Bedding", "Bottoms"]);
    }

    #[test]
    fn test_form_validation() {
        let form = ProductForm {
            business_id: "b1".to_string(),
            service_type: "Dry Cleaning".to_string(),
            category: "Tops".to_string(),
            subcategory: " ".to_string(),
            name: "Shirt".to_string(),
            price: "4.5".to_string(),
            ..ProductForm::default()
        };
        let input = form.to_input().unwrap();
        assert_eq!(input.price, Money::from_pence(450));
        assert!(input.subcategory.is_none());

        let bad_price = ProductForm {
            price: "four".to_string(),
            ..form.clone()
        };
        assert!(bad_price.to_input().is_err());

        let no_name = ProductForm {
            name: String::new(),
            ..form
        };
        assert_eq!(no_name.to_input().unwrap_err(), "Product name is required");
    }

    #[test]
    fn test_form_round_trips_product() {
        let form = ProductForm::from(&product("p1", "Dry Cleaning", "Tops", "Shirt"));
        assert_eq!(form.price, "4.50");
        assert_eq!(form.to_input().unwrap().name, "Shirt");
    }
}
