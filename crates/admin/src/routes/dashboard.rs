//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use freshfold_core::models::AdminStats;
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Dashboard metrics, formatted for display.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub orders: String,
    pub revenue: String,
    pub businesses: String,
    pub products: String,
}

impl From<&AdminStats> for DashboardMetrics {
    fn from(stats: &AdminStats) -> Self {
        Self {
            orders: stats.total_orders.to_string(),
            revenue: stats.total_revenue.to_string(),
            businesses: stats.total_businesses.to_string(),
            products: stats.total_products.to_string(),
        }
    }
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub metrics: Option<DashboardMetrics>,
    pub error: Option<String>,
}

/// Dashboard page handler.
#[instrument(skip(state, session, signed_in))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(signed_in): RequireAdminAuth,
) -> Result<DashboardTemplate, AppError> {
    let (metrics, error) = match state.api().authorized(&signed_in.token).admin_stats().await {
        Ok(stats) => (Some(DashboardMetrics::from(&stats)), None),
        Err(e) => {
            tracing::warn!("Failed to load stats: {e}");
            (None, Some("Failed to load stats".to_string()))
        }
    };

    Ok(DashboardTemplate {
        layout: Layout::load(&session, &signed_in.admin, "/").await?,
        metrics,
        error,
    })
}
