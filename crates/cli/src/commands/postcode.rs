//! Postcode availability check.

use freshfold_core::Postcode;
use freshfold_core::models::PostcodeAvailability;
use tracing::{info, warn};

use super::{CliError, api};

/// Check whether any business serves `code` and list those that do.
///
/// # Errors
///
/// Returns an error if the postcode is malformed or the backend call fails.
pub async fn check(code: &str) -> Result<PostcodeAvailability, CliError> {
    dotenvy::dotenv().ok();

    let postcode = Postcode::parse(code).map_err(|e| CliError::Invalid(e.to_string()))?;
    let availability = api()?.check_postcode(&postcode).await?;

    if availability.available {
        info!("{} is served by {} business(es):", postcode.as_str(), availability.businesses.len());
        for business in &availability.businesses {
            info!("  - {} ({})", business.name, business.pin_codes.join(", "));
        }
    } else {
        warn!("{} is not served yet", postcode.as_str());
    }

    Ok(availability)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_short_postcode_before_calling_backend() {
        let result = check(" E1 ").await;
        assert!(matches!(result, Err(CliError::Invalid(_))));
    }
}
