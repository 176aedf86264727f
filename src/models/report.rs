//! Modelos de reportes financieros

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::financial_entry::EntryFilters;
use super::performance::TruckPerformance;
use crate::utils::errors::{AppError, AppResult};

/// Período máximo de un reporte
pub const MAX_REPORT_DAYS: i64 = 366;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportType {
    Summary,
    TruckPerformance,
    CostAnalysis,
    FuelEfficiency,
    MonthlyTrends,
}

impl FromStr for ReportType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summary" => Ok(ReportType::Summary),
            "truck-performance" => Ok(ReportType::TruckPerformance),
            "cost-analysis" => Ok(ReportType::CostAnalysis),
            "fuel-efficiency" => Ok(ReportType::FuelEfficiency),
            "monthly-trends" => Ok(ReportType::MonthlyTrends),
            other => Err(AppError::BadRequest(format!("unknown report type '{}'", other))),
        }
    }
}

/// Query string de `GET /api/reports`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub report_type: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub truck_id: Option<Uuid>,
}

/// Parámetros validados de un reporte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportParams {
    pub report_type: ReportType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub truck_id: Option<Uuid>,
}

impl ReportQuery {
    pub fn into_params(self) -> AppResult<ReportParams> {
        let report_type = self.report_type.parse()?;
        let (start_date, end_date) = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(AppError::BadRequest(
                    "startDate and endDate are required".to_string(),
                ))
            }
        };
        if start_date > end_date {
            return Err(AppError::BadRequest(
                "startDate must not be after endDate".to_string(),
            ));
        }
        if (end_date - start_date).num_days() > MAX_REPORT_DAYS {
            return Err(AppError::BadRequest(format!(
                "report period is limited to {} days",
                MAX_REPORT_DAYS
            )));
        }
        Ok(ReportParams {
            report_type,
            start_date,
            end_date,
            truck_id: self.truck_id,
        })
    }
}

impl ReportParams {
    pub fn entry_filters(&self) -> EntryFilters {
        EntryFilters {
            truck_id: self.truck_id,
            ..EntryFilters::for_window(Some(self.start_date), Some(self.end_date))
        }
    }

    pub fn period_label(&self) -> String {
        format!("{} - {}", self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummaryReport {
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
    pub profit_margin: f64,
    pub total_entries: usize,
    pub average_entry_value: Decimal,
    pub period: String,
    pub truck_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TruckPerformanceRow {
    #[serde(flatten)]
    pub performance: TruckPerformance,
    pub year: i32,
    pub profit_margin: f64,
    pub profit_per_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TruckPerformanceSummary {
    pub total_trucks: usize,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub average_profit_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TruckPerformanceReport {
    pub trucks: Vec<TruckPerformanceRow>,
    pub summary: TruckPerformanceSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyExpenses {
    pub month: String,
    pub total_expenses: Decimal,
    pub expense_breakdown: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostAnalysisSummary {
    pub total_expenses: Decimal,
    pub average_monthly_expenses: Decimal,
    pub highest_expense_category: Option<String>,
    pub expense_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostAnalysisReport {
    pub expense_breakdown: BTreeMap<String, Decimal>,
    pub expense_percentages: BTreeMap<String, f64>,
    pub monthly_trends: Vec<MonthlyExpenses>,
    pub summary: CostAnalysisSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelEfficiencyRow {
    pub truck_id: Uuid,
    pub license_plate: String,
    pub total_liters: Decimal,
    pub total_km: i64,
    pub fuel_efficiency: f64,
    pub fuel_cost: Decimal,
    pub fuel_cost_per_km: f64,
    pub fuel_cost_per_liter: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelEfficiencySummary {
    pub total_liters: Decimal,
    pub total_km: i64,
    pub average_efficiency: f64,
    pub total_fuel_cost: Decimal,
    pub average_fuel_cost_per_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelEfficiencyReport {
    pub truck_efficiency: Vec<FuelEfficiencyRow>,
    pub summary: FuelEfficiencySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub net_income: Decimal,
    pub profit_margin: f64,
    pub entry_count: usize,
    pub truck_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendsSummary {
    pub total_months: usize,
    pub average_monthly_revenue: Decimal,
    pub average_monthly_expenses: Decimal,
    pub revenue_growth: f64,
    pub expense_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendsReport {
    pub monthly_data: Vec<MonthlyTrend>,
    pub summary: MonthlyTrendsSummary,
}

/// Relatório serializado como `{ reportType, data }`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reportType", content = "data", rename_all = "kebab-case")]
pub enum Report {
    Summary(FinancialSummaryReport),
    TruckPerformance(TruckPerformanceReport),
    CostAnalysis(CostAnalysisReport),
    FuelEfficiency(FuelEfficiencyReport),
    MonthlyTrends(MonthlyTrendsReport),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(report_type: &str, start: Option<&str>, end: Option<&str>) -> ReportQuery {
        ReportQuery {
            report_type: report_type.to_string(),
            start_date: start.map(|s| s.parse().unwrap()),
            end_date: end.map(|s| s.parse().unwrap()),
            truck_id: None,
        }
    }

    #[test]
    fn test_parses_known_report_types() {
        let params = query("cost-analysis", Some("2024-01-01"), Some("2024-03-31"))
            .into_params()
            .unwrap();
        assert_eq!(params.report_type, ReportType::CostAnalysis);
        assert_eq!(params.period_label(), "2024-01-01 - 2024-03-31");
    }

    #[test]
    fn test_rejects_unknown_type_and_bad_periods() {
        assert!(query("profitability", Some("2024-01-01"), Some("2024-01-31")).into_params().is_err());
        assert!(query("summary", None, Some("2024-01-31")).into_params().is_err());
        assert!(query("summary", Some("2024-02-01"), Some("2024-01-31")).into_params().is_err());
        assert!(query("summary", Some("2023-01-01"), Some("2024-06-30")).into_params().is_err());
    }
}
