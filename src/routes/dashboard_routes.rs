use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::dto::ApiResponse;
use crate::models::performance::{DashboardSummary, DateWindow, DateWindowQuery, TruckPerformance};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub fn create_dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(get_summary))
        .route("/trucks-performance", get(get_trucks_performance))
        .route("/trucks-performance/:truck_id", get(get_truck_performance))
}

fn window(state: &AppState, query: DateWindowQuery) -> AppResult<DateWindow> {
    query.resolve(state.config.dashboard_window_days, Utc::now().date_naive())
}

async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<DateWindowQuery>,
) -> Result<Json<ApiResponse<DashboardSummary>>, AppError> {
    let window = window(&state, query)?;
    let summary = state.dashboard.get_dashboard_summary(&window).await?;
    Ok(Json(ApiResponse::success(summary)))
}

async fn get_trucks_performance(
    State(state): State<AppState>,
    Query(query): Query<DateWindowQuery>,
) -> Result<Json<ApiResponse<Vec<TruckPerformance>>>, AppError> {
    let window = window(&state, query)?;
    let performance = state.dashboard.get_trucks_performance(&window).await?;
    Ok(Json(ApiResponse::success(performance)))
}

async fn get_truck_performance(
    State(state): State<AppState>,
    Path(truck_id): Path<Uuid>,
    Query(query): Query<DateWindowQuery>,
) -> Result<Json<ApiResponse<TruckPerformance>>, AppError> {
    let window = window(&state, query)?;
    let performance = state
        .dashboard
        .get_truck_performance(truck_id, &window)
        .await?
        .ok_or_else(|| not_found_error("Active truck", &truck_id.to_string()))?;
    Ok(Json(ApiResponse::success(performance)))
}
