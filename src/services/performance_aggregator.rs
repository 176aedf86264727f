//! Agregador de desempeño por camión
//!
//! Funciones puras: reciben camiones y registros financieros ya materializados y
//! devuelven los registros derivados. No hacen I/O ni guardan estado, así
//! que dos llamadas con la misma entrada producen el mismo resultado.
//!
//! El dinero se suma con `Decimal` (exacto); solo las razones (km/l) se
//! expresan como `f64`. Las sumas saturan en `Decimal::MAX` en lugar de
//! desbordar.

use std::collections::{HashMap, HashSet};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::category::is_fuel_category;
use crate::models::financial_entry::{EntryType, FinancialEntry};
use crate::models::performance::{DashboardSummary, TruckPerformance};
use crate::models::truck::Truck;

/// Mínimo de abastecimientos para poder medir distancia
pub const MIN_FUEL_READINGS: usize = 2;

/// Datos de consumo de un conjunto de registros financieros
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FuelStats {
    pub readings: usize,
    pub total_km: i64,
    pub total_liters: Decimal,
    pub km_per_liter: f64,
}

impl FuelStats {
    /// Cuenta solo despesas de combustible con litros y odómetro. Con menos
    /// de dos lecturas todo queda en cero.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a FinancialEntry>,
    {
        let mut readings = 0;
        let mut liters = Decimal::ZERO;
        let mut min_odometer = i64::MAX;
        let mut max_odometer = i64::MIN;

        for entry in entries {
            if !qualifies_for_fuel(entry) {
                continue;
            }
            let (Some(filled), Some(odometer)) = (entry.liters_filled, entry.odometer_reading) else {
                continue;
            };
            readings += 1;
            liters = liters.saturating_add(filled);
            min_odometer = min_odometer.min(odometer);
            max_odometer = max_odometer.max(odometer);
        }

        if readings < MIN_FUEL_READINGS {
            return Self {
                readings,
                ..Self::default()
            };
        }

        let total_km = max_odometer.saturating_sub(min_odometer);
        Self {
            readings,
            total_km,
            total_liters: liters,
            km_per_liter: km_per_liter(total_km, liters),
        }
    }
}

fn qualifies_for_fuel(entry: &FinancialEntry) -> bool {
    entry.entry_type == EntryType::Expense
        && is_fuel_category(&entry.category)
        && entry.liters_filled.is_some()
        && entry.odometer_reading.is_some()
}

/// km / litros; 0 si alguno de los dos no es positivo
pub fn km_per_liter(total_km: i64, total_liters: Decimal) -> f64 {
    if total_km <= 0 || total_liters <= Decimal::ZERO {
        return 0.0;
    }
    Decimal::from(total_km)
        .checked_div(total_liters)
        .and_then(|ratio| ratio.to_f64())
        .unwrap_or(0.0)
}

/// Suma de montos que satura en los extremos de `Decimal`
pub fn saturating_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .fold(Decimal::ZERO, |total, value| total.saturating_add(value))
}

/// Un registro por camión, en el orden de `trucks`. Un camión repetido en
/// la entrada se reporta una sola vez.
pub fn compute_performance(trucks: &[Truck], entries: &[FinancialEntry]) -> Vec<TruckPerformance> {
    let mut by_truck: HashMap<Uuid, Vec<&FinancialEntry>> = HashMap::new();
    for entry in entries {
        by_truck.entry(entry.truck_id).or_default().push(entry);
    }

    let mut seen = HashSet::with_capacity(trucks.len());
    trucks
        .iter()
        .filter(|truck| seen.insert(truck.id))
        .map(|truck| {
            let truck_entries = by_truck.get(&truck.id).map(Vec::as_slice).unwrap_or(&[]);
            truck_performance(truck, truck_entries)
        })
        .collect()
}

fn truck_performance(truck: &Truck, entries: &[&FinancialEntry]) -> TruckPerformance {
    let amounts = |entry_type: EntryType| {
        saturating_sum(
            entries
                .iter()
                .filter(move |e| e.entry_type == entry_type)
                .map(|e| e.amount),
        )
    };
    let total_revenue = amounts(EntryType::Revenue);
    let total_expenses = amounts(EntryType::Expense);

    let fuel = FuelStats::from_entries(entries.iter().copied());

    TruckPerformance {
        truck_id: truck.id,
        license_plate: truck.license_plate.clone(),
        model: truck.model.clone(),
        total_revenue,
        total_expenses,
        net_income: total_revenue.saturating_sub(total_expenses),
        km_per_liter_average: fuel.km_per_liter,
        total_km: fuel.total_km,
        total_liters: fuel.total_liters,
        entry_count: entries.len(),
    }
}

/// Reduce los registros a los totales de la flota. El promedio de km/l
/// ignora los camiones sin distancia medida.
pub fn summarize_dashboard(trucks: &[Truck], performances: &[TruckPerformance]) -> DashboardSummary {
    let total_revenue = saturating_sum(performances.iter().map(|p| p.total_revenue));
    let total_expenses = saturating_sum(performances.iter().map(|p| p.total_expenses));

    let measured: Vec<f64> = performances
        .iter()
        .filter(|p| p.total_km > 0)
        .map(|p| p.km_per_liter_average)
        .collect();
    let average_km_per_liter = if measured.is_empty() {
        0.0
    } else {
        measured.iter().sum::<f64>() / measured.len() as f64
    };

    DashboardSummary {
        total_trucks: trucks.len(),
        active_trucks: trucks.iter().filter(|t| t.is_active()).count(),
        total_revenue,
        total_expenses,
        net_income: total_revenue.saturating_sub(total_expenses),
        average_km_per_liter,
    }
}

/// Registros indexados por camión, conservando el orden de cálculo
#[derive(Debug, Clone, Default)]
pub struct PerformanceIndex {
    records: Vec<TruckPerformance>,
    positions: HashMap<Uuid, usize>,
}

impl PerformanceIndex {
    pub fn new(records: Vec<TruckPerformance>) -> Self {
        let positions = records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.truck_id, i))
            .collect();
        Self { records, positions }
    }

    pub fn get(&self, truck_id: &Uuid) -> Option<&TruckPerformance> {
        self.positions.get(truck_id).map(|&i| &self.records[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::truck::TruckStatus;
    use chrono::{NaiveDate, Utc};

    fn truck(plate: &str, status: TruckStatus) -> Truck {
        Truck {
            id: Uuid::new_v4(),
            license_plate: plate.to_string(),
            model: "Volvo FH".to_string(),
            year: 2020,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn entry(truck: &Truck, entry_type: EntryType, category: &str, amount: i64) -> FinancialEntry {
        FinancialEntry {
            id: Uuid::new_v4(),
            truck_id: truck.id,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            entry_type,
            category: category.to_string(),
            amount: Decimal::from(amount),
            liters_filled: None,
            odometer_reading: None,
            description: None,
            created_user_id: Uuid::nil(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn fuel(truck: &Truck, liters: i64, odometer: i64) -> FinancialEntry {
        FinancialEntry {
            liters_filled: Some(Decimal::from(liters)),
            odometer_reading: Some(odometer),
            ..entry(truck, EntryType::Expense, "Combustível", 100)
        }
    }

    #[test]
    fn test_empty_trucks_give_empty_result() {
        let t = truck("ABC1234", TruckStatus::Active);
        let entries = vec![entry(&t, EntryType::Revenue, "Frete", 10)];
        assert!(compute_performance(&[], &entries).is_empty());
    }

    #[test]
    fn test_no_entries_give_zeroed_records() {
        let t = truck("ABC1234", TruckStatus::Active);
        let result = compute_performance(&[t.clone()], &[]);
        assert_eq!(result.len(), 1);
        let p = &result[0];
        assert_eq!(p.truck_id, t.id);
        assert_eq!(p.total_revenue, Decimal::ZERO);
        assert_eq!(p.net_income, Decimal::ZERO);
        assert_eq!(p.km_per_liter_average, 0.0);
        assert_eq!(p.entry_count, 0);
    }

    #[test]
    fn test_net_income_is_exact() {
        let t = truck("ABC1234", TruckStatus::Active);
        let mut entries = Vec::new();
        for cents in [1_i64, 10, 333, 70_001] {
            entries.push(FinancialEntry {
                amount: Decimal::new(cents, 2),
                ..entry(&t, EntryType::Revenue, "Frete", 0)
            });
            entries.push(FinancialEntry {
                amount: Decimal::new(cents * 3, 3),
                ..entry(&t, EntryType::Expense, "Pedágio", 0)
            });
        }
        entries.push(entry(&t, EntryType::Expense, "Multas", -5));

        let p = &compute_performance(&[t], &entries)[0];
        assert_eq!(p.net_income, p.total_revenue - p.total_expenses);
        assert_eq!(p.total_revenue, Decimal::new(70_345, 2));
    }

    #[test]
    fn test_single_fuel_reading_gives_zero_fuel_fields() {
        let t = truck("ABC1234", TruckStatus::Active);
        let p = &compute_performance(&[t.clone()], &[fuel(&t, 40, 10_000)])[0];
        assert_eq!(p.total_km, 0);
        assert_eq!(p.total_liters, Decimal::ZERO);
        assert_eq!(p.km_per_liter_average, 0.0);
    }

    #[test]
    fn test_fuel_efficiency_from_odometer_span() {
        let t = truck("ABC1234", TruckStatus::Active);
        let entries = vec![fuel(&t, 20, 10_000), fuel(&t, 30, 10_500)];
        let p = &compute_performance(&[t], &entries)[0];
        assert_eq!(p.total_km, 500);
        assert_eq!(p.total_liters, Decimal::from(50));
        assert_eq!(p.km_per_liter_average, 10.0);
    }

    #[test]
    fn test_fuel_readings_need_fuel_expense_with_both_values() {
        let t = truck("ABC1234", TruckStatus::Active);
        let entries = vec![
            fuel(&t, 20, 10_000),
            // sin litros
            FinancialEntry {
                liters_filled: None,
                ..fuel(&t, 0, 12_000)
            },
            // otra categoría
            FinancialEntry {
                category: "Manutenção".into(),
                ..fuel(&t, 30, 14_000)
            },
            // categoría antigua
            FinancialEntry {
                category: "Abastecimento".into(),
                ..fuel(&t, 30, 10_600)
            },
        ];
        let p = &compute_performance(&[t], &entries)[0];
        assert_eq!(p.total_km, 600);
        assert_eq!(p.total_liters, Decimal::from(50));
        assert_eq!(p.km_per_liter_average, 12.0);
        assert_eq!(p.entry_count, 4);
    }

    #[test]
    fn test_zero_liters_never_divides() {
        let t = truck("ABC1234", TruckStatus::Active);
        let entries = vec![fuel(&t, 0, 10_000), fuel(&t, 0, 10_500)];
        let p = &compute_performance(&[t], &entries)[0];
        assert_eq!(p.total_km, 500);
        assert_eq!(p.km_per_liter_average, 0.0);
    }

    #[test]
    fn test_two_truck_scenario_and_dashboard() {
        let t1 = truck("AAA1111", TruckStatus::Active);
        let t2 = truck("BBB2222", TruckStatus::Active);
        let entries = vec![
            entry(&t1, EntryType::Revenue, "Frete", 1000),
            entry(&t1, EntryType::Expense, "Pedágio", 400),
            entry(&t2, EntryType::Revenue, "Frete", 500),
            entry(&t2, EntryType::Expense, "Manutenção", 600),
        ];
        let trucks = vec![t1.clone(), t2.clone()];
        let result = compute_performance(&trucks, &entries);

        assert_eq!(result[0].truck_id, t1.id);
        assert_eq!(result[0].net_income, Decimal::from(600));
        assert_eq!(result[1].net_income, Decimal::from(-100));

        let summary = summarize_dashboard(&trucks, &result);
        assert_eq!(summary.total_revenue, Decimal::from(1500));
        assert_eq!(summary.total_expenses, Decimal::from(1000));
        assert_eq!(summary.net_income, Decimal::from(500));
        assert_eq!(summary.total_trucks, 2);
        assert_eq!(summary.active_trucks, 2);
    }

    #[test]
    fn test_dashboard_average_skips_trucks_without_distance() {
        let t1 = truck("AAA1111", TruckStatus::Active);
        let t2 = truck("BBB2222", TruckStatus::Inactive);
        let entries = vec![fuel(&t1, 20, 10_000), fuel(&t1, 30, 10_500)];
        let trucks = vec![t1, t2];
        let result = compute_performance(&trucks, &entries);

        let summary = summarize_dashboard(&trucks, &result);
        assert_eq!(summary.average_km_per_liter, 10.0);
        assert_eq!(summary.total_trucks, 2);
        assert_eq!(summary.active_trucks, 1);

        let empty = summarize_dashboard(&[], &[]);
        assert_eq!(empty.average_km_per_liter, 0.0);
    }

    #[test]
    fn test_duplicate_trucks_reported_once() {
        let t1 = truck("AAA1111", TruckStatus::Active);
        let t2 = truck("BBB2222", TruckStatus::Active);
        let result = compute_performance(&[t2.clone(), t1.clone(), t2.clone()], &[]);
        let ids: Vec<Uuid> = result.iter().map(|p| p.truck_id).collect();
        assert_eq!(ids, vec![t2.id, t1.id]);
    }

    #[test]
    fn test_entries_of_unknown_trucks_are_ignored() {
        let t1 = truck("AAA1111", TruckStatus::Active);
        let ghost = truck("ZZZ9999", TruckStatus::Active);
        let entries = vec![entry(&ghost, EntryType::Revenue, "Frete", 900)];
        let result = compute_performance(&[t1], &entries);
        assert_eq!(result[0].total_revenue, Decimal::ZERO);
    }

    #[test]
    fn test_idempotent() {
        let t1 = truck("AAA1111", TruckStatus::Active);
        let entries = vec![
            entry(&t1, EntryType::Revenue, "Frete", 1000),
            fuel(&t1, 20, 10_000),
            fuel(&t1, 25, 10_400),
        ];
        let trucks = vec![t1];
        assert_eq!(
            compute_performance(&trucks, &entries),
            compute_performance(&trucks, &entries)
        );
    }

    #[test]
    fn test_extreme_amounts_saturate() {
        let t1 = truck("AAA1111", TruckStatus::Active);
        let t2 = truck("BBB2222", TruckStatus::Active);
        let huge = |truck: &Truck, entry_type: EntryType, category: &str| FinancialEntry {
            amount: Decimal::MAX,
            ..entry(truck, entry_type, category, 0)
        };
        let entries = vec![
            huge(&t1, EntryType::Revenue, "Frete"),
            huge(&t1, EntryType::Revenue, "Frete"),
            huge(&t2, EntryType::Expense, "Manutenção"),
            huge(&t2, EntryType::Expense, "Pedágio"),
            FinancialEntry {
                liters_filled: Some(Decimal::MAX),
                ..fuel(&t2, 0, 10_000)
            },
            FinancialEntry {
                liters_filled: Some(Decimal::MAX),
                ..fuel(&t2, 0, 10_500)
            },
        ];
        let trucks = vec![t1, t2];
        let result = compute_performance(&trucks, &entries);

        assert_eq!(result[0].total_revenue, Decimal::MAX);
        assert_eq!(result[0].net_income, Decimal::MAX);
        assert_eq!(result[1].total_expenses, Decimal::MAX);
        assert_eq!(result[1].net_income, Decimal::MIN);
        assert_eq!(result[1].total_liters, Decimal::MAX);

        let summary = summarize_dashboard(&trucks, &result);
        assert_eq!(summary.total_revenue, Decimal::MAX);
        assert_eq!(summary.total_expenses, Decimal::MAX);
        assert_eq!(summary.net_income, Decimal::ZERO);
    }

    #[test]
    fn test_saturating_sum() {
        assert_eq!(saturating_sum(Vec::new()), Decimal::ZERO);
        assert_eq!(
            saturating_sum(vec![Decimal::new(150, 2), Decimal::new(250, 2)]),
            Decimal::from(4)
        );
        assert_eq!(saturating_sum(vec![Decimal::MAX, Decimal::ONE]), Decimal::MAX);
    }

    #[test]
    fn test_performance_index_lookup() {
        let t1 = truck("AAA1111", TruckStatus::Active);
        let t2 = truck("BBB2222", TruckStatus::Active);
        let index = PerformanceIndex::new(compute_performance(&[t1.clone(), t2.clone()], &[]));
        assert_eq!(index.get(&t1.id).map(|p| p.truck_id), Some(t1.id));
        assert_eq!(index.get(&t2.id).map(|p| p.license_plate.as_str()), Some("BBB2222"));
        assert!(index.get(&Uuid::new_v4()).is_none());
    }
}
