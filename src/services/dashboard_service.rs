//! Servicio de dashboard
//!
//! Carga camiones y registros financieros en paralelo y delega el cálculo al
//! agregador, que es síncrono y puro.

use std::sync::Arc;

use futures::try_join;
use tracing::debug;
use uuid::Uuid;

use crate::models::performance::{DashboardSummary, DateWindow, TruckPerformance};
use crate::models::truck::Truck;
use crate::repositories::{FinancialEntryRepository, TruckRepository};
use crate::services::performance_aggregator::{compute_performance, summarize_dashboard};
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct DashboardService {
    trucks: Arc<dyn TruckRepository>,
    entries: Arc<dyn FinancialEntryRepository>,
}

impl DashboardService {
    pub fn new(trucks: Arc<dyn TruckRepository>, entries: Arc<dyn FinancialEntryRepository>) -> Self {
        Self { trucks, entries }
    }

    /// Totales de la flota. Los contadores cubren todo el registro; los
    /// montos solo los camiones activos.
    pub async fn get_dashboard_summary(&self, window: &DateWindow) -> AppResult<DashboardSummary> {
        let filters = window.entry_filters();
        let (trucks, entries) = try_join!(
            self.trucks.find_all(),
            self.entries.find_by_filters(&filters)
        )?;

        let active: Vec<Truck> = trucks.iter().filter(|t| t.is_active()).cloned().collect();
        let performances = compute_performance(&active, &entries);
        debug!(
            "📊 Dashboard: {} camiones, {} activos, {} registros financieros",
            trucks.len(),
            active.len(),
            entries.len()
        );

        Ok(summarize_dashboard(&trucks, &performances))
    }

    pub async fn get_trucks_performance(&self, window: &DateWindow) -> AppResult<Vec<TruckPerformance>> {
        let filters = window.entry_filters();
        let (trucks, entries) = try_join!(
            self.trucks.find_active(),
            self.entries.find_by_filters(&filters)
        )?;

        Ok(compute_performance(&trucks, &entries))
    }

    /// `None` si el camión no existe o está inactivo
    pub async fn get_truck_performance(
        &self,
        truck_id: Uuid,
        window: &DateWindow,
    ) -> AppResult<Option<TruckPerformance>> {
        let mut filters = window.entry_filters();
        filters.truck_id = Some(truck_id);
        let (truck, entries) = try_join!(
            self.trucks.find_by_id(truck_id),
            self.entries.find_by_filters(&filters)
        )?;

        let Some(truck) = truck.filter(Truck::is_active) else {
            return Ok(None);
        };
        Ok(compute_performance(&[truck], &entries).into_iter().next())
    }
}
