//! Cached catalog reads.
//!
//! Categories and product listings change rarely, so they are cached with
//! `moka` for the configured TTL. Cart and order calls are never cached.

use std::sync::Arc;
use std::time::Duration;

use freshfold_core::ProductId;
use freshfold_core::client::{ApiClient, ApiError, ProductFilter};
use freshfold_core::models::Product;
use moka::future::Cache;
use tracing::{debug, instrument};

/// Label for products without a subcategory.
pub const OTHER_GROUP: &str = "Other";

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    /// Products in one category, or every product when `None`.
    Products(Option<String>),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Arc<Vec<String>>),
    Products(Arc<Vec<Product>>),
}

/// Products sharing a subcategory, in listing order.
#[derive(Debug, Clone)]
pub struct ProductGroup {
    pub name: String,
    pub products: Vec<Product>,
    /// Whether the group starts open on the catalog page.
    pub expanded: bool,
}

/// Catalog reads through an in-process cache.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    #[must_use]
    pub fn new(api: ApiClient, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner { api, cache }),
        }
    }

    /// Category names, sorted by the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Arc<Vec<String>>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = Arc::new(self.inner.api.categories().await?);
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;
        Ok(categories)
    }

    /// Products in `category`, or all products.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self))]
    pub async fn products(&self, category: Option<&str>) -> Result<Arc<Vec<Product>>, ApiError> {
        let key = CacheKey::Products(category.map(str::to_owned));
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let filter = category.map(ProductFilter::category).unwrap_or_default();
        let products = Arc::new(self.inner.api.products(&filter).await?);
        self.inner
            .cache
            .insert(key, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// Look a product up in the full listing.
    ///
    /// Add-to-cart uses this so the price always comes from the backend,
    /// never from the submitted form.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, ApiError> {
        let products = self.products(None).await?;
        Ok(products.iter().find(|p| &p.id == id).cloned())
    }
}

/// Group products by subcategory in first-seen order.
///
/// Products without a subcategory go to [`OTHER_GROUP`]. Only the first
/// group starts expanded.
#[must_use]
pub fn group_by_subcategory(products: &[Product]) -> Vec<ProductGroup> {
    let mut groups: Vec<ProductGroup> = Vec::new();

    for product in products {
        let name = product
            .subcategory
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(OTHER_GROUP);

        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.products.push(product.clone()),
            None => groups.push(ProductGroup {
                name: name.to_owned(),
                products: vec![product.clone()],
                expanded: groups.is_empty(),
            }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use freshfold_core::{BusinessId, Money};

    use super::*;

    fn product(id: &str, subcategory: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            business_id: BusinessId::new("b1"),
            business_name: "Bubbles".to_owned(),
            service_type: "Dry Cleaning".to_owned(),
            category: "Tops".to_owned(),
            subcategory: subcategory.map(str::to_owned),
            name: format!("Item {id}"),
            price: Money::from_pence(495),
            icon_url: None,
            sort_order: None,
        }
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let products = vec![
            product("1", Some("Shirts")),
            product("2", None),
            product("3", Some("Shirts")),
            product("4", Some("Blouses")),
        ];

        let groups = group_by_subcategory(&products);
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Shirts", "Other", "Blouses"]);
        assert_eq!(groups[0].products.len(), 2);
        assert!(groups[0].expanded);
        assert!(!groups[1].expanded);
        assert!(!groups[2].expanded);
    }

    #[test]
    fn test_empty_subcategory_is_other() {
        let groups = group_by_subcategory(&[product("1", Some(""))]);
        assert_eq!(groups[0].name, OTHER_GROUP);
    }

    #[test]
    fn test_no_products_no_groups() {
        assert!(group_by_subcategory(&[]).is_empty());
    }
}
