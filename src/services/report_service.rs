//! Servicio de reportes financieros
//!
//! Los builders son funciones puras sobre los registros financieros del período;
//! `ReportService` solo se encarga de cargar los datos.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use futures::try_join;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::models::category::is_fuel_category;
use crate::models::financial_entry::{EntryType, FinancialEntry};
use crate::models::report::{
    CostAnalysisReport, CostAnalysisSummary, FinancialSummaryReport, FuelEfficiencyReport,
    FuelEfficiencyRow, FuelEfficiencySummary, MonthlyExpenses, MonthlyTrend, MonthlyTrendsReport,
    MonthlyTrendsSummary, Report, ReportParams, ReportType, TruckPerformanceReport,
    TruckPerformanceRow, TruckPerformanceSummary,
};
use crate::models::truck::Truck;
use crate::repositories::{FinancialEntryRepository, TruckRepository};
use crate::services::performance_aggregator::{
    compute_performance, saturating_sum, PerformanceIndex,
};
use crate::utils::errors::{not_found_error, AppResult};

#[derive(Clone)]
pub struct ReportService {
    trucks: Arc<dyn TruckRepository>,
    entries: Arc<dyn FinancialEntryRepository>,
}

impl ReportService {
    pub fn new(trucks: Arc<dyn TruckRepository>, entries: Arc<dyn FinancialEntryRepository>) -> Self {
        Self { trucks, entries }
    }

    pub async fn generate(&self, params: &ReportParams) -> AppResult<Report> {
        let filters = params.entry_filters();
        let (trucks, entries) = try_join!(
            self.load_trucks(params.truck_id),
            self.entries.find_by_filters(&filters)
        )?;

        info!(
            "📈 Generando reporte {:?} ({}) con {} registros financieros",
            params.report_type,
            params.period_label(),
            entries.len()
        );

        let report = match params.report_type {
            ReportType::Summary => Report::Summary(financial_summary(params, &entries)),
            ReportType::TruckPerformance => {
                Report::TruckPerformance(truck_performance_report(&trucks, &entries))
            }
            ReportType::CostAnalysis => Report::CostAnalysis(cost_analysis(&entries)),
            ReportType::FuelEfficiency => {
                Report::FuelEfficiency(fuel_efficiency_report(&trucks, &entries))
            }
            ReportType::MonthlyTrends => Report::MonthlyTrends(monthly_trends(&entries)),
        };
        Ok(report)
    }

    async fn load_trucks(&self, truck_id: Option<Uuid>) -> AppResult<Vec<Truck>> {
        match truck_id {
            Some(id) => {
                let truck = self
                    .trucks
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| not_found_error("Truck", &id.to_string()))?;
                Ok(vec![truck])
            }
            None => self.trucks.find_all().await,
        }
    }
}

/// `part / whole * 100`, 0 cuando `whole` es 0
pub fn percentage(part: Decimal, whole: Decimal) -> f64 {
    match part.checked_mul(Decimal::ONE_HUNDRED) {
        Some(scaled) => ratio(scaled, whole),
        None => ratio(part, whole) * 100.0,
    }
}

fn ratio(numerator: Decimal, denominator: Decimal) -> f64 {
    if denominator.is_zero() {
        return 0.0;
    }
    numerator
        .checked_div(denominator)
        .and_then(|v| v.to_f64())
        .unwrap_or(0.0)
}

/// Variación porcentual entre el primer y el último valor
fn growth(values: &[Decimal]) -> f64 {
    match (values.first(), values.last()) {
        (Some(first), Some(last)) if values.len() > 1 => {
            percentage(last.saturating_sub(*first), *first)
        }
        _ => 0.0,
    }
}

fn average(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(count)).round_dp(2)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn sum_by_type(entries: &[FinancialEntry], entry_type: EntryType) -> Decimal {
    saturating_sum(
        entries
            .iter()
            .filter(|e| e.entry_type == entry_type)
            .map(|e| e.amount),
    )
}

fn add_to(slot: &mut Decimal, amount: Decimal) {
    *slot = slot.saturating_add(amount);
}

fn month_key(entry: &FinancialEntry) -> String {
    entry.date.format("%Y-%m").to_string()
}

pub fn financial_summary(params: &ReportParams, entries: &[FinancialEntry]) -> FinancialSummaryReport {
    let total_revenue = sum_by_type(entries, EntryType::Revenue);
    let total_expenses = sum_by_type(entries, EntryType::Expense);
    let net_income = total_revenue.saturating_sub(total_expenses);
    let trucks: HashSet<Uuid> = entries.iter().map(|e| e.truck_id).collect();

    FinancialSummaryReport {
        total_revenue,
        total_expenses,
        net_income,
        profit_margin: percentage(net_income, total_revenue),
        total_entries: entries.len(),
        average_entry_value: average(total_revenue.saturating_add(total_expenses), entries.len()),
        period: params.period_label(),
        truck_count: trucks.len(),
    }
}

pub fn truck_performance_report(trucks: &[Truck], entries: &[FinancialEntry]) -> TruckPerformanceReport {
    let index = PerformanceIndex::new(compute_performance(trucks, entries));

    let mut seen = HashSet::new();
    let rows: Vec<TruckPerformanceRow> = trucks
        .iter()
        .filter(|truck| seen.insert(truck.id))
        .filter_map(|truck| {
            let performance = index.get(&truck.id)?.clone();
            let profit_per_km = if performance.total_km > 0 {
                ratio(performance.net_income, Decimal::from(performance.total_km))
            } else {
                0.0
            };
            Some(TruckPerformanceRow {
                year: truck.year,
                profit_margin: percentage(performance.net_income, performance.total_revenue),
                profit_per_km,
                performance,
            })
        })
        .collect();

    let summary = TruckPerformanceSummary {
        total_trucks: rows.len(),
        total_revenue: saturating_sum(rows.iter().map(|r| r.performance.total_revenue)),
        total_expenses: saturating_sum(rows.iter().map(|r| r.performance.total_expenses)),
        average_profit_margin: mean(rows.iter().map(|r| r.profit_margin)),
    };

    TruckPerformanceReport { trucks: rows, summary }
}

pub fn cost_analysis(entries: &[FinancialEntry]) -> CostAnalysisReport {
    let mut breakdown: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut monthly: BTreeMap<String, MonthlyExpenses> = BTreeMap::new();

    for entry in entries.iter().filter(|e| e.entry_type == EntryType::Expense) {
        add_to(breakdown.entry(entry.category.clone()).or_default(), entry.amount);

        let month = month_key(entry);
        let bucket = monthly.entry(month.clone()).or_insert_with(|| MonthlyExpenses {
            month,
            total_expenses: Decimal::ZERO,
            expense_breakdown: BTreeMap::new(),
        });
        add_to(&mut bucket.total_expenses, entry.amount);
        add_to(bucket.expense_breakdown.entry(entry.category.clone()).or_default(), entry.amount);
    }

    let total_expenses = saturating_sum(breakdown.values().copied());
    let expense_percentages = breakdown
        .iter()
        .map(|(category, amount)| (category.clone(), percentage(*amount, total_expenses)))
        .collect();
    let highest_expense_category = breakdown
        .iter()
        .max_by(|a, b| a.1.cmp(b.1))
        .map(|(category, _)| category.clone());

    let monthly_trends: Vec<MonthlyExpenses> = monthly.into_values().collect();
    let monthly_totals: Vec<Decimal> = monthly_trends.iter().map(|m| m.total_expenses).collect();

    CostAnalysisReport {
        summary: CostAnalysisSummary {
            total_expenses,
            average_monthly_expenses: average(total_expenses, monthly_trends.len()),
            highest_expense_category,
            expense_growth: growth(&monthly_totals),
        },
        expense_breakdown: breakdown,
        expense_percentages,
        monthly_trends,
    }
}

pub fn fuel_efficiency_report(trucks: &[Truck], entries: &[FinancialEntry]) -> FuelEfficiencyReport {
    let mut fuel_costs: BTreeMap<Uuid, Decimal> = BTreeMap::new();
    for entry in entries {
        if entry.entry_type == EntryType::Expense && is_fuel_category(&entry.category) {
            add_to(fuel_costs.entry(entry.truck_id).or_default(), entry.amount);
        }
    }

    let rows: Vec<FuelEfficiencyRow> = compute_performance(trucks, entries)
        .into_iter()
        .map(|performance| {
            let fuel_cost = fuel_costs.get(&performance.truck_id).copied().unwrap_or_default();
            FuelEfficiencyRow {
                truck_id: performance.truck_id,
                license_plate: performance.license_plate,
                total_liters: performance.total_liters,
                total_km: performance.total_km,
                fuel_efficiency: performance.km_per_liter_average,
                fuel_cost,
                fuel_cost_per_km: ratio(fuel_cost, Decimal::from(performance.total_km.max(0))),
                fuel_cost_per_liter: if performance.total_liters > Decimal::ZERO {
                    ratio(fuel_cost, performance.total_liters)
                } else {
                    0.0
                },
            }
        })
        .collect();

    let measured = || rows.iter().filter(|r| r.total_km > 0);
    let summary = FuelEfficiencySummary {
        total_liters: saturating_sum(rows.iter().map(|r| r.total_liters)),
        total_km: rows.iter().fold(0_i64, |km, r| km.saturating_add(r.total_km)),
        average_efficiency: mean(measured().map(|r| r.fuel_efficiency)),
        total_fuel_cost: saturating_sum(rows.iter().map(|r| r.fuel_cost)),
        average_fuel_cost_per_km: mean(measured().map(|r| r.fuel_cost_per_km)),
    };

    FuelEfficiencyReport { truck_efficiency: rows, summary }
}

pub fn monthly_trends(entries: &[FinancialEntry]) -> MonthlyTrendsReport {
    let mut months: BTreeMap<String, Vec<&FinancialEntry>> = BTreeMap::new();
    for entry in entries {
        months.entry(month_key(entry)).or_default().push(entry);
    }

    let monthly_data: Vec<MonthlyTrend> = months
        .into_iter()
        .map(|(month, month_entries)| {
            let mut revenue = Decimal::ZERO;
            let mut expenses = Decimal::ZERO;
            let mut trucks = HashSet::new();
            for entry in &month_entries {
                match entry.entry_type {
                    EntryType::Revenue => add_to(&mut revenue, entry.amount),
                    EntryType::Expense => add_to(&mut expenses, entry.amount),
                }
                trucks.insert(entry.truck_id);
            }
            let net_income = revenue.saturating_sub(expenses);
            MonthlyTrend {
                month,
                revenue,
                expenses,
                net_income,
                profit_margin: percentage(net_income, revenue),
                entry_count: month_entries.len(),
                truck_count: trucks.len(),
            }
        })
        .collect();

    let revenues: Vec<Decimal> = monthly_data.iter().map(|m| m.revenue).collect();
    let expenses: Vec<Decimal> = monthly_data.iter().map(|m| m.expenses).collect();
    let total_months = monthly_data.len();

    MonthlyTrendsReport {
        summary: MonthlyTrendsSummary {
            total_months,
            average_monthly_revenue: average(saturating_sum(revenues.iter().copied()), total_months),
            average_monthly_expenses: average(
                saturating_sum(expenses.iter().copied()),
                total_months,
            ),
            revenue_growth: growth(&revenues),
            expense_growth: growth(&expenses),
        },
        monthly_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::truck::TruckStatus;
    use chrono::{NaiveDate, Utc};

    fn truck(plate: &str, year: i32) -> Truck {
        Truck {
            id: Uuid::new_v4(),
            license_plate: plate.to_string(),
            model: "DAF XF".to_string(),
            year,
            status: TruckStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn entry(truck: &Truck, date: (i32, u32, u32), entry_type: EntryType, category: &str, amount: i64) -> FinancialEntry {
        FinancialEntry {
            id: Uuid::new_v4(),
            truck_id: truck.id,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            entry_type,
            category: category.to_string(),
            amount: Decimal::from(amount),
            liters_filled: None,
            odometer_reading: None,
            description: None,
            created_user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn fuel(truck: &Truck, day: u32, cost: i64, liters: i64, odometer: i64) -> FinancialEntry {
        FinancialEntry {
            liters_filled: Some(Decimal::from(liters)),
            odometer_reading: Some(odometer),
            ..entry(truck, (2024, 1, day), EntryType::Expense, "Combustível", cost)
        }
    }

    fn params() -> ReportParams {
        ReportParams {
            report_type: ReportType::Summary,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            truck_id: None,
        }
    }

    #[test]
    fn test_summary_totals_and_margin() {
        let t1 = truck("AAA1111", 2020);
        let t2 = truck("BBB2222", 2021);
        let entries = vec![
            entry(&t1, (2024, 1, 5), EntryType::Revenue, "Frete", 1000),
            entry(&t1, (2024, 1, 6), EntryType::Expense, "Pedágio", 250),
            entry(&t2, (2024, 2, 1), EntryType::Expense, "Multas", 150),
        ];
        let report = financial_summary(&params(), &entries);
        assert_eq!(report.net_income, Decimal::from(600));
        assert_eq!(report.profit_margin, 60.0);
        assert_eq!(report.truck_count, 2);
        assert_eq!(report.average_entry_value, Decimal::new(46667, 2));

        let empty = financial_summary(&params(), &[]);
        assert_eq!(empty.profit_margin, 0.0);
        assert_eq!(empty.average_entry_value, Decimal::ZERO);
    }

    #[test]
    fn test_truck_performance_rows() {
        let t1 = truck("AAA1111", 2019);
        let entries = vec![
            entry(&t1, (2024, 1, 2), EntryType::Revenue, "Frete", 2000),
            fuel(&t1, 3, 500, 50, 10_000),
            fuel(&t1, 20, 500, 50, 11_000),
        ];
        let report = truck_performance_report(&[t1.clone(), t1.clone()], &entries);
        assert_eq!(report.trucks.len(), 1);

        let row = &report.trucks[0];
        assert_eq!(row.year, 2019);
        assert_eq!(row.profit_margin, 50.0);
        assert_eq!(row.profit_per_km, 1.0);
        assert_eq!(report.summary.total_revenue, Decimal::from(2000));
        assert_eq!(report.summary.average_profit_margin, 50.0);
    }

    #[test]
    fn test_cost_analysis_breakdown() {
        let t1 = truck("AAA1111", 2020);
        let entries = vec![
            entry(&t1, (2024, 1, 5), EntryType::Expense, "Pedágio", 100),
            entry(&t1, (2024, 1, 9), EntryType::Expense, "Manutenção", 300),
            entry(&t1, (2024, 2, 9), EntryType::Expense, "Manutenção", 200),
            entry(&t1, (2024, 2, 10), EntryType::Revenue, "Frete", 5000),
        ];
        let report = cost_analysis(&entries);

        assert_eq!(report.summary.total_expenses, Decimal::from(600));
        assert_eq!(report.expense_breakdown["Manutenção"], Decimal::from(500));
        assert_eq!(report.summary.highest_expense_category.as_deref(), Some("Manutenção"));
        assert_eq!(report.monthly_trends.len(), 2);
        assert_eq!(report.monthly_trends[0].month, "2024-01");
        assert_eq!(report.summary.average_monthly_expenses, Decimal::from(300));
        assert_eq!(report.summary.expense_growth, -50.0);

        let share: f64 = report.expense_percentages.values().sum();
        assert!((share - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_fuel_efficiency_costs() {
        let t1 = truck("AAA1111", 2020);
        let t2 = truck("BBB2222", 2020);
        let entries = vec![fuel(&t1, 3, 400, 40, 20_000), fuel(&t1, 17, 400, 40, 20_800)];
        let report = fuel_efficiency_report(&[t1, t2], &entries);

        let row = &report.truck_efficiency[0];
        assert_eq!(row.total_km, 800);
        assert_eq!(row.fuel_efficiency, 10.0);
        assert_eq!(row.fuel_cost, Decimal::from(800));
        assert_eq!(row.fuel_cost_per_km, 1.0);
        assert_eq!(row.fuel_cost_per_liter, 10.0);

        assert_eq!(report.truck_efficiency[1].fuel_cost_per_km, 0.0);
        assert_eq!(report.summary.average_efficiency, 10.0);
        assert_eq!(report.summary.total_fuel_cost, Decimal::from(800));
    }

    #[test]
    fn test_monthly_trends_growth() {
        let t1 = truck("AAA1111", 2020);
        let t2 = truck("BBB2222", 2020);
        let entries = vec![
            entry(&t1, (2024, 1, 5), EntryType::Revenue, "Frete", 1000),
            entry(&t1, (2024, 1, 8), EntryType::Expense, "Pedágio", 200),
            entry(&t1, (2024, 3, 5), EntryType::Revenue, "Frete", 1500),
            entry(&t2, (2024, 3, 6), EntryType::Expense, "Pedágio", 300),
        ];
        let report = monthly_trends(&entries);

        assert_eq!(report.summary.total_months, 2);
        assert_eq!(report.monthly_data[1].month, "2024-03");
        assert_eq!(report.monthly_data[1].truck_count, 2);
        assert_eq!(report.monthly_data[0].profit_margin, 80.0);
        assert_eq!(report.summary.revenue_growth, 50.0);
        assert_eq!(report.summary.expense_growth, 50.0);
        assert_eq!(report.summary.average_monthly_revenue, Decimal::from(1250));
    }

    #[test]
    fn test_percentage_with_large_values() {
        assert_eq!(percentage(Decimal::from(1), Decimal::from(4)), 25.0);
        assert_eq!(percentage(Decimal::MAX, Decimal::MAX), 100.0);
        assert_eq!(percentage(Decimal::MAX, Decimal::ZERO), 0.0);
    }

    #[test]
    fn test_reports_with_extreme_amounts() {
        let t1 = truck("AAA1111", 2020);
        let huge = |date: (i32, u32, u32), entry_type: EntryType, category: &str| FinancialEntry {
            amount: Decimal::MAX,
            ..entry(&t1, date, entry_type, category, 0)
        };
        let entries = vec![
            huge((2024, 1, 5), EntryType::Revenue, "Frete"),
            huge((2024, 1, 6), EntryType::Revenue, "Frete"),
            huge((2024, 1, 7), EntryType::Expense, "Pedágio"),
            huge((2024, 2, 7), EntryType::Expense, "Pedágio"),
        ];

        let summary = financial_summary(&params(), &entries);
        assert_eq!(summary.total_revenue, Decimal::MAX);
        assert_eq!(summary.total_expenses, Decimal::MAX);
        assert_eq!(summary.net_income, Decimal::ZERO);

        let costs = cost_analysis(&entries);
        assert_eq!(costs.summary.total_expenses, Decimal::MAX);
        assert_eq!(costs.expense_percentages["Pedágio"], 100.0);

        let trends = monthly_trends(&entries);
        assert_eq!(trends.monthly_data[0].revenue, Decimal::MAX);
        assert_eq!(trends.monthly_data[0].profit_margin, 0.0);
        assert_eq!(trends.monthly_data[1].net_income, Decimal::MIN);

        let performance = truck_performance_report(&[t1.clone()], &entries);
        assert_eq!(performance.summary.total_revenue, Decimal::MAX);
    }
}
