use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use fleet_control::config::{DatabaseConfig, EnvironmentConfig, StorageBackend};
use fleet_control::database::{create_pool, run_migrations};
use fleet_control::routes::create_app_router;
use fleet_control::services::auth_service::ensure_admin_user;
use fleet_control::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .init();

    info!("🚛 Fleet Control API");
    info!("================================================");
    info!("🌍 Entorno: {}", config.environment);

    let state = match config.storage_backend {
        StorageBackend::Postgres => {
            let database = DatabaseConfig::from_environment(&config)?;
            let pool = create_pool(&database).await?;
            run_migrations(&pool).await?;
            AppState::postgres(config, pool)
        }
        StorageBackend::Memory => {
            if config.is_production() {
                warn!("⚠️ Backend en memoria en producción: los datos se pierden al reiniciar");
            }
            AppState::in_memory(config)
        }
    };

    if let Some(admin) = ensure_admin_user(state.users.as_ref(), &state.config).await? {
        info!("👤 Administrador disponible: {}", admin.email);
    }

    let addr = state.config.server_url();
    let app = create_app_router(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("   POST /api/auth/login - Login");
    info!("   POST /api/auth/refresh - Renovar token");
    info!("   GET  /api/auth/me - Sesión actual");
    info!("   GET  /api/categories - Catálogo de categorías");
    info!("   GET|POST /api/trucks - Camiones");
    info!("   GET|POST /api/financial-entries - Registros financieros");
    info!("   GET  /api/dashboard/summary - Resumen del dashboard");
    info!("   GET  /api/dashboard/trucks-performance - Desempeño por camión");
    info!("   GET  /api/reports - Reportes");

    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("No se pudo escuchar en {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
