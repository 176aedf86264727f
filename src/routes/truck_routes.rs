use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::truck_controller::TruckController;
use crate::dto::ApiResponse;
use crate::models::pagination::{Page, PaginationQuery};
use crate::models::truck::{
    CreateTruckRequest, Truck, TruckFilters, UpdateTruckRequest, UpdateTruckStatusRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_truck_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trucks).post(create_truck))
        .route("/active", get(list_active_trucks))
        .route("/:id", get(get_truck).put(update_truck).delete(deactivate_truck))
        .route("/:id/status", patch(change_truck_status))
}

fn controller(state: &AppState) -> TruckController {
    TruckController::new(state.trucks.clone())
}

async fn list_trucks(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
    Query(filters): Query<TruckFilters>,
) -> Result<Json<Page<Truck>>, AppError> {
    let request = pagination.into_request()?;
    let page = controller(&state).list(filters, request).await?;
    Ok(Json(page))
}

async fn list_active_trucks(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Truck>>>, AppError> {
    let trucks = controller(&state).list_active().await?;
    Ok(Json(ApiResponse::success(trucks)))
}

async fn get_truck(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Truck>>, AppError> {
    let truck = controller(&state).get_by_id(id).await?;
    Ok(Json(ApiResponse::success(truck)))
}

async fn create_truck(
    State(state): State<AppState>,
    Json(request): Json<CreateTruckRequest>,
) -> Result<Json<ApiResponse<Truck>>, AppError> {
    let response = controller(&state).create(request).await?;
    Ok(Json(response))
}

async fn update_truck(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTruckRequest>,
) -> Result<Json<ApiResponse<Truck>>, AppError> {
    let response = controller(&state).update(id, request).await?;
    Ok(Json(response))
}

async fn change_truck_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTruckStatusRequest>,
) -> Result<Json<ApiResponse<Truck>>, AppError> {
    let response = controller(&state).change_status(id, request.status).await?;
    Ok(Json(response))
}

async fn deactivate_truck(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Truck>>, AppError> {
    let response = controller(&state).deactivate(id).await?;
    Ok(Json(response))
}
