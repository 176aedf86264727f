use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::financial_entry_controller::FinancialEntryController;
use crate::dto::financial_entry_dto::FinancialEntryResponse;
use crate::dto::ApiResponse;
use crate::middleware::auth::SessionContext;
use crate::models::financial_entry::{
    CreateFinancialEntryRequest, EntryFilters, UpdateFinancialEntryRequest,
};
use crate::models::pagination::{Page, PaginationQuery};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_financial_entry_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entries).post(create_entry))
        .route("/:id", get(get_entry).put(update_entry).delete(delete_entry))
}

fn controller(state: &AppState) -> FinancialEntryController {
    FinancialEntryController::new(state.entries.clone(), state.trucks.clone())
}

async fn list_entries(
    State(state): State<AppState>,
    session: SessionContext,
    Query(pagination): Query<PaginationQuery>,
    Query(filters): Query<EntryFilters>,
) -> Result<Json<Page<FinancialEntryResponse>>, AppError> {
    let request = pagination.into_request()?;
    let page = controller(&state).list(&session, filters, request).await?;
    Ok(Json(page))
}

async fn get_entry(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FinancialEntryResponse>>, AppError> {
    let entry = controller(&state).get_by_id(&session, id).await?;
    Ok(Json(ApiResponse::success(entry)))
}

async fn create_entry(
    State(state): State<AppState>,
    session: SessionContext,
    Json(request): Json<CreateFinancialEntryRequest>,
) -> Result<Json<ApiResponse<FinancialEntryResponse>>, AppError> {
    let response = controller(&state).create(&session, request).await?;
    Ok(Json(response))
}

async fn update_entry(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateFinancialEntryRequest>,
) -> Result<Json<ApiResponse<FinancialEntryResponse>>, AppError> {
    let response = controller(&state).update(&session, id, request).await?;
    Ok(Json(response))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    controller(&state).delete(id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
