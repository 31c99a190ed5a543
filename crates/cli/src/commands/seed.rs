//! Seed the catalog from a YAML file.
//!
//! The whole file is validated before any network call. Businesses are
//! created first, then each business's products under the new id. A failed
//! business skips its products; a failed product is counted and seeding
//! continues.
//!
//! ```yaml
//! businesses:
//!   - name: Laundry Express
//!     owner_email: support@laundry-express.co.uk
//!     pin_codes: [CO1, CO2]
//!     products:
//!       - service_type: Dry Cleaning
//!         category: Tops
//!         name: Shirt
//!         price: 4.95
//! ```

use std::collections::HashSet;
use std::path::Path;

use freshfold_core::models::{NewBusiness, ProductInput};
use freshfold_core::{Email, Money};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::{CliError, admin_token, api};

/// Top-level catalog file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    pub businesses: Vec<SeedBusiness>,
}

/// A business and the products it offers.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedBusiness {
    pub name: String,
    pub owner_email: String,
    #[serde(default)]
    pub pin_codes: Vec<String>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// One product line.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedProduct {
    pub service_type: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

impl CatalogFile {
    fn product_count(&self) -> usize {
        self.businesses.iter().map(|b| b.products.len()).sum()
    }
}

/// Outcome of a seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub businesses_created: usize,
    pub products_created: usize,
    /// One entry per failed business or product.
    pub failures: Vec<String>,
}

/// Check a catalog for problems, returning every one found.
#[must_use]
pub fn validate(catalog: &CatalogFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut business_names = HashSet::new();

    if catalog.businesses.is_empty() {
        errors.push("catalog has no businesses".to_owned());
    }

    for business in &catalog.businesses {
        let label = if business.name.trim().is_empty() {
            errors.push("business with an empty name".to_owned());
            "<unnamed>"
        } else {
            business.name.as_str()
        };

        if !business_names.insert(business.name.trim().to_lowercase()) {
            errors.push(format!("{label}: duplicate business name"));
        }
        if let Err(e) = Email::parse(&business.owner_email) {
            errors.push(format!("{label}: owner_email: {e}"));
        }
        if business.pin_codes.iter().all(|code| code.trim().is_empty()) {
            errors.push(format!("{label}: no pin_codes; customers could never reach it"));
        }

        let mut product_keys = HashSet::new();
        for product in &business.products {
            let key = format!(
                "{} > {} > {}",
                product.service_type.trim(),
                product.category.trim(),
                product.name.trim()
            );
            if product.service_type.trim().is_empty()
                || product.category.trim().is_empty()
                || product.name.trim().is_empty()
            {
                errors.push(format!(
                    "{label}: {key}: service_type, category and name are required"
                ));
            }
            if product.price < Money::ZERO {
                errors.push(format!("{label}: {key}: price cannot be negative"));
            }
            if !product_keys.insert(key.to_lowercase()) {
                errors.push(format!("{label}: {key}: duplicate product"));
            }
        }
    }

    errors
}

/// Parse and validate a catalog file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a catalog, or fails
/// validation.
pub async fn load(path: &Path) -> Result<CatalogFile, CliError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    let errors = validate(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CliError::Invalid(format!(
            "{} validation errors found",
            errors.len()
        )));
    }

    Ok(catalog)
}

/// Seed the backend from `path`.
///
/// # Errors
///
/// Returns an error if the catalog is invalid or the admin sign-in fails.
/// Individual create failures are reported, not returned.
pub async fn run(path: &Path, dry_run: bool) -> Result<SeedReport, CliError> {
    dotenvy::dotenv().ok();

    info!(path = %path.display(), "Loading catalog");
    let catalog = load(path).await?;
    info!(
        businesses = catalog.businesses.len(),
        products = catalog.product_count(),
        "Catalog validated"
    );

    if dry_run {
        for business in &catalog.businesses {
            info!(
                "Would create {} ({} products, postcodes: {})",
                business.name,
                business.products.len(),
                business.pin_codes.join(", ")
            );
        }
        return Ok(SeedReport::default());
    }

    let api = api()?;
    let token = admin_token(&api).await?;
    let admin = api.authorized(&token);
    let mut report = SeedReport::default();

    for business in &catalog.businesses {
        let new_business = NewBusiness {
            name: business.name.trim().to_owned(),
            owner_email: business.owner_email.trim().to_owned(),
            pin_codes: business
                .pin_codes
                .iter()
                .map(|code| code.trim().to_owned())
                .filter(|code| !code.is_empty())
                .collect(),
        };

        let business_id = match admin.create_business(&new_business).await {
            Ok(id) => {
                report.businesses_created += 1;
                info!(business_id = %id, "Created business {}", business.name);
                id
            }
            Err(e) => {
                warn!("Failed to create business {}: {e}", business.name);
                report.failures.push(format!("business {}: {e}", business.name));
                continue;
            }
        };

        for product in &business.products {
            let input = ProductInput {
                business_id: business_id.clone(),
                service_type: product.service_type.trim().to_owned(),
                category: product.category.trim().to_owned(),
                subcategory: product.subcategory.clone().filter(|s| !s.trim().is_empty()),
                name: product.name.trim().to_owned(),
                price: product.price,
                icon_url: product.icon_url.clone(),
                sort_order: product.sort_order,
            };
            match admin.create_product(&input).await {
                Ok(_) => report.products_created += 1,
                Err(e) => {
                    warn!("Failed to create product {}: {e}", product.name);
                    report
                        .failures
                        .push(format!("product {} ({}): {e}", product.name, business.name));
                }
            }
        }
    }

    info!("Seeding complete!");
    info!("  Businesses created: {}", report.businesses_created);
    info!("  Products created: {}", report.products_created);
    if !report.failures.is_empty() {
        error!("  Failed: {}", report.failures.len());
        for failure in &report.failures {
            error!("    - {failure}");
        }
    }

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CATALOG: &str = r"
businesses:
  - name: Laundry Express
    owner_email: support@laundry-express.co.uk
    pin_codes: [CO27FQ, CO1]
    products:
      - service_type: Dry Cleaning
        category: Tops
        name: Shirt
        price: 4.95
      - service_type: Ironing
        category: Shirts
        subcategory: Formal
        name: Shirt
        price: 2.50
";

    #[test]
    fn test_parses_and_validates() {
        let catalog: CatalogFile = serde_yaml::from_str(CATALOG).unwrap();
        assert_eq!(catalog.product_count(), 2);
        assert_eq!(catalog.businesses[0].products[0].price, Money::from_pence(495));
        assert!(validate(&catalog).is_empty());
    }

    #[test]
    fn test_reports_every_problem() {
        let catalog: CatalogFile = serde_yaml::from_str(
            r"
businesses:
  - name: Bubbles
    owner_email: not-an-email
    products:
      - service_type: Laundry
        category: Wash
        name: Per Kg
        price: -1
      - service_type: Laundry
        category: Wash
        name: per kg
        price: 3.95
",
        )
        .unwrap();

        let errors = validate(&catalog);
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("owner_email")));
        assert!(errors.iter().any(|e| e.contains("no pin_codes")));
        assert!(errors.iter().any(|e| e.contains("negative")));
        assert!(errors.iter().any(|e| e.contains("duplicate product")));
    }

    #[test]
    fn test_bundled_catalog_is_valid() {
        let catalog: CatalogFile =
            serde_yaml::from_str(include_str!("../../catalogs/laundry-express.yaml")).unwrap();
        assert!(validate(&catalog).is_empty());
        assert_eq!(catalog.product_count(), 39);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let result: Result<CatalogFile, _> =
            serde_yaml::from_str("businesses: []\nproducts: []\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_catalog_is_invalid() {
        let catalog: CatalogFile = serde_yaml::from_str("businesses: []\n").unwrap();
        assert_eq!(validate(&catalog), ["catalog has no businesses"]);
    }

    #[tokio::test]
    async fn test_dry_run_makes_no_calls() {
        let path = std::env::temp_dir().join(format!("ff-seed-{}.yaml", std::process::id()));
        tokio::fs::write(&path, CATALOG).await.unwrap();

        // No backend or credentials are configured; a dry run must not need them.
        let report = run(&path, true).await.unwrap();
        assert_eq!(report, SeedReport::default());

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
