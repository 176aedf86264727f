use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::dto::ApiResponse;
use crate::models::report::{Report, ReportQuery};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_report_router() -> Router<AppState> {
    Router::new().route("/", get(get_report))
}

async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<Report>>, AppError> {
    let params = query.into_params()?;
    let report = state.reports.generate(&params).await?;
    Ok(Json(ApiResponse::success(report)))
}
