use axum::{
    extract::{Path, Query},
    routing::get,
    Json, Router,
};

use crate::dto::category_dto::{CategoriesResponse, CategoryQuery};
use crate::dto::ApiResponse;
use crate::models::category::{self, Category};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

pub fn create_category_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/:id", get(get_category))
}

async fn list_categories(
    Query(query): Query<CategoryQuery>,
) -> Json<ApiResponse<CategoriesResponse>> {
    let categories = match query.entry_type {
        Some(entry_type) => category::categories_by_type(entry_type).copied().collect(),
        None => category::all_categories().to_vec(),
    };

    Json(ApiResponse::success(CategoriesResponse {
        categories,
        stats: category::category_stats(),
    }))
}

async fn get_category(Path(id): Path<String>) -> Result<Json<ApiResponse<Category>>, AppError> {
    let found = category::find_by_id(&id).ok_or_else(|| not_found_error("Category", &id))?;
    Ok(Json(ApiResponse::success(*found)))
}
