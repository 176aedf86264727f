//! Rutas HTTP
//!
//! Cada recurso expone su `Router<AppState>`; `create_app_router` los
//! monta bajo `/api` y protege todo salvo login y health con la sesión.

pub mod auth_routes;
pub mod category_routes;
pub mod dashboard_routes;
pub mod financial_entry_routes;
pub mod report_routes;
pub mod truck_routes;

use axum::{extract::State, middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::middleware::auth::require_session;
use crate::middleware::cors::cors_layer;
use crate::state::AppState;

pub fn create_app_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(auth_routes::create_auth_router())
        .nest("/categories", category_routes::create_category_router())
        .nest("/trucks", truck_routes::create_truck_router())
        .nest("/financial-entries", financial_entry_routes::create_financial_entry_router())
        .nest("/dashboard", dashboard_routes::create_dashboard_router())
        .nest("/reports", report_routes::create_report_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    let api = Router::new()
        .merge(auth_routes::create_public_auth_router())
        .merge(protected);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(cors_layer(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = match &state.pool {
        Some(pool) => match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => "connected",
            Err(e) => {
                error!("❌ Health check de base de datos falló: {}", e);
                "unavailable"
            }
        },
        None => "memory",
    };

    Json(json!({
        "status": "ok",
        "service": "fleet-control",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "database": database,
    }))
}
