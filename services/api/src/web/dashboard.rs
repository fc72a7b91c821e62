//! services/api/src/web/dashboard.rs

use axum::{extract::State, Extension, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::flash::{port_failure, HandlerResult};
use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;
use crate::web::views::DashboardStatsView;

#[derive(Serialize, ToSchema)]
pub struct DashboardStatsResponse {
    pub success: bool,
    pub stats: DashboardStatsView,
}

#[derive(Serialize, ToSchema)]
pub struct DashboardView {
    pub first_name: String,
    pub email: String,
    pub stats: DashboardStatsView,
}

/// Book and loan counters for the admin dashboard.
#[utoipa::path(
    get,
    path = "/api/dashboard-stats",
    responses((status = 200, description = "Current counters", body = DashboardStatsResponse))
)]
pub async fn dashboard_stats_handler(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<DashboardStatsResponse>> {
    let stats = state
        .db
        .dashboard_stats()
        .await
        .map_err(port_failure("load dashboard stats"))?;
    Ok(Json(DashboardStatsResponse {
        success: true,
        stats: stats.into(),
    }))
}

/// The admin landing payload.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses((status = 200, description = "Admin landing data", body = DashboardView))
)]
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> HandlerResult<Json<DashboardView>> {
    let stats = state
        .db
        .dashboard_stats()
        .await
        .map_err(port_failure("load dashboard stats"))?;
    Ok(Json(DashboardView {
        first_name: current.first_name,
        email: current.email,
        stats: stats.into(),
    }))
}
