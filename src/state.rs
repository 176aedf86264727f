//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{
    FinancialEntryRepository, InMemoryFinancialEntryRepository, InMemoryTruckRepository,
    InMemoryUserRepository, PgFinancialEntryRepository, PgTruckRepository, PgUserRepository,
    TruckRepository, UserRepository,
};
use crate::services::dashboard_service::DashboardService;
use crate::services::report_service::ReportService;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub jwt: JwtConfig,
    /// Solo con el backend postgres
    pub pool: Option<PgPool>,
    pub trucks: Arc<dyn TruckRepository>,
    pub entries: Arc<dyn FinancialEntryRepository>,
    pub users: Arc<dyn UserRepository>,
    pub dashboard: DashboardService,
    pub reports: ReportService,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        pool: Option<PgPool>,
        trucks: Arc<dyn TruckRepository>,
        entries: Arc<dyn FinancialEntryRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            jwt: JwtConfig::from(&config),
            config: Arc::new(config),
            pool,
            dashboard: DashboardService::new(trucks.clone(), entries.clone()),
            reports: ReportService::new(trucks.clone(), entries.clone()),
            trucks,
            entries,
            users,
        }
    }

    pub fn postgres(config: EnvironmentConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Some(pool.clone()),
            Arc::new(PgTruckRepository::new(pool.clone())),
            Arc::new(PgFinancialEntryRepository::new(pool.clone())),
            Arc::new(PgUserRepository::new(pool)),
        )
    }

    pub fn in_memory(config: EnvironmentConfig) -> Self {
        Self::new(
            config,
            None,
            Arc::new(InMemoryTruckRepository::new()),
            Arc::new(InMemoryFinancialEntryRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }
}
