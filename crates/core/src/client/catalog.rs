//! Postcode gate and catalog endpoints. None of these need a token.

use serde::Serialize;
use tracing::{debug, instrument};

use super::{ApiClient, ApiError};
use crate::models::{NamedEntry, PostcodeAvailability, Product};
use crate::types::{BusinessId, Postcode};

/// Query parameters for `GET /products`. Unset fields are not sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_id: Option<BusinessId>,
}

impl ProductFilter {
    /// Products in one category.
    #[must_use]
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }
}

impl ApiClient {
    /// `POST /pincode/check`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. An unserviced postcode is not
    /// an error; it comes back with `available: false`.
    #[instrument(skip(self), fields(postcode = %postcode))]
    pub async fn check_postcode(&self, postcode: &Postcode) -> Result<PostcodeAvailability, ApiError> {
        #[derive(Serialize)]
        struct Body<'a> {
            pin_code: &'a str,
        }

        let availability: PostcodeAvailability = Self::send_json(
            self.post("/pincode/check").json(&Body {
                pin_code: postcode.as_str(),
            }),
        )
        .await?;

        debug!(
            available = availability.available,
            businesses = availability.businesses.len(),
            "Postcode checked"
        );
        Ok(availability)
    }

    /// `GET /categories`, sorted by name by the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, ApiError> {
        let entries: Vec<NamedEntry> = Self::send_json(self.get("/categories")).await?;
        Ok(entries.into_iter().map(|e| e.name).collect())
    }

    /// `GET /service-types`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn service_types(&self) -> Result<Vec<String>, ApiError> {
        let entries: Vec<NamedEntry> = Self::send_json(self.get("/service-types")).await?;
        Ok(entries.into_iter().map(|e| e.name).collect())
    }

    /// `GET /products` with optional filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        Self::send_json(self.get("/products").query(filter)).await
    }

    /// Readiness check: the backend answers a cheap catalog read.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), ApiError> {
        Self::send_unit(self.get("/categories")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_skips_unset_fields() {
        let query = serde_json::to_value(ProductFilter::category("Dry Cleaning")).ok();
        assert_eq!(
            query,
            Some(serde_json::json!({ "category": "Dry Cleaning" }))
        );
    }
}
