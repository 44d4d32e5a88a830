//! Department listing endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::personas::DepartmentSummary;
use crate::AppState;

/// GET /api/departments - List departments with a representative.
pub async fn list_departments(State(state): State<AppState>) -> ApiResult<Vec<DepartmentSummary>> {
    success(state.personas.list())
}
