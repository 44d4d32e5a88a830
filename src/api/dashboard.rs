//! Dashboard endpoints.

use axum::extract::{Path, State};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{ChartDataEntry, DashboardSnapshot};
use crate::AppState;

/// GET /api/dashboard/{department} - Today's dashboard, generated on first request.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(department): Path<String>,
) -> ApiResult<DashboardSnapshot> {
    success(state.dashboards.get(&department).await?)
}

/// POST /api/dashboard/{department}/regenerate - Replace today's dashboard.
pub async fn regenerate_dashboard(
    State(state): State<AppState>,
    Path(department): Path<String>,
) -> ApiResult<DashboardSnapshot> {
    success(state.dashboards.regenerate(&department).await?)
}

/// GET /api/dashboard/{department}/charts - Validated charts of today's cached dashboard.
pub async fn get_dashboard_charts(
    State(state): State<AppState>,
    Path(department): Path<String>,
) -> ApiResult<Vec<ChartDataEntry>> {
    let snapshot = state.dashboards.cached(&department).await?.ok_or_else(|| {
        AppError::NotFound(format!("No dashboard generated today for {}", department))
    })?;

    success(ChartDataEntry::from_charts_json(&snapshot.charts_json))
}
