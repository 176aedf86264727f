//! Modelos derivados de desempeño
//!
//! Nunca se persisten: se recalculan en cada consulta a partir de los
//! camiones y registros financieros de la ventana pedida.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::financial_entry::EntryFilters;
use crate::utils::errors::{bad_request_error, AppResult};

/// Desempeño de un camión en la ventana
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TruckPerformance {
    pub truck_id: Uuid,
    pub license_plate: String,
    pub model: String,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    /// Siempre `total_revenue - total_expenses`
    pub net_income: Decimal,
    pub km_per_liter_average: f64,
    pub total_km: i64,
    pub total_liters: Decimal,
    pub entry_count: usize,
}

/// Totales de la flota para el dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_trucks: usize,
    pub active_trucks: usize,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
    pub average_km_per_liter: f64,
}

/// Ventana de fechas (inclusive) en query string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindowQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Ventana ya resuelta; un extremo `None` queda abierto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateWindowQuery {
    /// Sin fechas se usa `[today - default_days, today]`
    pub fn resolve(self, default_days: u32, today: NaiveDate) -> AppResult<DateWindow> {
        let window = match (self.start_date, self.end_date) {
            (None, None) => DateWindow {
                start_date: Some(today - Duration::days(default_days as i64)),
                end_date: Some(today),
            },
            (start_date, end_date) => DateWindow { start_date, end_date },
        };

        if let (Some(start), Some(end)) = (window.start_date, window.end_date) {
            if start > end {
                return Err(bad_request_error("startDate must not be after endDate"));
            }
        }
        Ok(window)
    }
}

impl DateWindow {
    pub fn entry_filters(&self) -> EntryFilters {
        EntryFilters::for_window(self.start_date, self.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_defaults_to_last_days() {
        let window = DateWindowQuery::default().resolve(30, day(2024, 3, 31)).unwrap();
        assert_eq!(window.start_date, Some(day(2024, 3, 1)));
        assert_eq!(window.end_date, Some(day(2024, 3, 31)));
    }

    #[test]
    fn test_window_keeps_open_ends() {
        let query = DateWindowQuery { start_date: Some(day(2024, 1, 1)), end_date: None };
        let window = query.resolve(30, day(2024, 3, 31)).unwrap();
        assert_eq!(window.start_date, Some(day(2024, 1, 1)));
        assert_eq!(window.end_date, None);
    }

    #[test]
    fn test_window_rejects_inverted_range() {
        let query = DateWindowQuery {
            start_date: Some(day(2024, 2, 1)),
            end_date: Some(day(2024, 1, 1)),
        };
        assert!(query.resolve(30, day(2024, 3, 31)).is_err());
    }
}
