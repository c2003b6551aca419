//! Dashboard, system health and badge catalog routes.

use axum::extract::State;
use axum::response::Json;

use super::operator::ApiAccess;
use crate::error::ApiError;
use crate::model::status::{BadgeGroup, badge_catalog};
use crate::services::dashboard::{self, DashboardSummary};
use crate::services::health::{self, SystemHealth};
use crate::state::AppState;

pub async fn dashboard(State(state): State<AppState>, _access: ApiAccess) -> Result<Json<DashboardSummary>, ApiError> {
    Ok(Json(dashboard::summary(&state).await?))
}

/// `GET /api/system-health`: synthetic service metrics plus live queue counters.
pub async fn system_health(State(state): State<AppState>, _access: ApiAccess) -> Json<SystemHealth> {
    Json(health::snapshot(&state).await)
}

/// `GET /api/status-badges`: label and tone for every status value.
pub async fn status_badges() -> Json<Vec<BadgeGroup>> {
    Json(badge_catalog())
}
