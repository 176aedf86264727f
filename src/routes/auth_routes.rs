use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{SessionResponse, TokenResponse};
use crate::dto::ApiResponse;
use crate::middleware::auth::SessionContext;
use crate::models::user::LoginRequest;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Login sin sesión
pub fn create_public_auth_router() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Rutas que requieren un token válido
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
}

fn controller(state: &AppState) -> AuthController {
    AuthController::new(state.users.clone(), state.jwt.clone())
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    let response = controller(&state).login(request).await?;
    Ok(Json(ApiResponse::success_with_message(response, "Login exitoso")))
}

async fn refresh(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    let response = controller(&state).refresh(&session).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn me(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Json<ApiResponse<SessionResponse>>, AppError> {
    let response = controller(&state).me(&session).await?;
    Ok(Json(ApiResponse::success(response)))
}
