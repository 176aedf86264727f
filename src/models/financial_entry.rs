//! Modelo de FinancialEntry
//!
//! Registro financiero (gasto o ingreso) asociado a un camión.
//! Mapea a la tabla `financial_entries`. Los registros financieros no se borran.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use super::category::{category_exists, is_fuel_category};
use super::truck::{contains_ignore_case, non_blank};
use crate::utils::validation::{validate_amount, validate_date, validate_liters, validate_odometer};

/// Tipo de registro financiero - mapea al ENUM entry_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "entry_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Expense,
    Revenue,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Expense => "expense",
            EntryType::Revenue => "revenue",
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registro financiero - mapea a la tabla financial_entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FinancialEntry {
    pub id: Uuid,
    pub truck_id: Uuid,
    pub date: NaiveDate,
    pub entry_type: EntryType,
    pub category: String,
    pub amount: Decimal,
    pub liters_filled: Option<Decimal>,
    pub odometer_reading: Option<i64>,
    pub description: Option<String>,
    pub created_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinancialEntry {
    pub fn is_fuel_expense(&self) -> bool {
        self.entry_type == EntryType::Expense && is_fuel_category(&self.category)
    }

    /// Reglas de negocio sobre el registro completo. Se ejecuta al crear y
    /// otra vez tras mezclar un update, porque un cambio de tipo o categoría
    /// puede invalidar campos que no venían en el request.
    pub fn check_consistency(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_amount(self.amount) {
            errors.add("amount", e);
        }

        if !category_exists(&self.category, self.entry_type) {
            let mut e = ValidationError::new("category");
            e.message = Some(
                format!("'{}' is not a {} category", self.category, self.entry_type).into(),
            );
            errors.add("category", e);
        }

        let fuel = self.is_fuel_expense();
        if let Some(liters) = self.liters_filled {
            if !fuel {
                errors.add("liters_filled", fuel_only_error());
            } else if let Err(e) = validate_liters(liters) {
                errors.add("liters_filled", e);
            }
        }
        if let Some(odometer) = self.odometer_reading {
            if !fuel {
                errors.add("odometer_reading", fuel_only_error());
            } else if let Err(e) = validate_odometer(odometer) {
                errors.add("odometer_reading", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn fuel_only_error() -> ValidationError {
    let mut e = ValidationError::new("fuel_only");
    e.message = Some("only allowed on fuel expenses".into());
    e
}

/// Request para crear un registro financiero
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFinancialEntryRequest {
    pub truck_id: Uuid,

    #[serde(deserialize_with = "deserialize_flexible_date")]
    pub date: NaiveDate,

    pub entry_type: EntryType,

    #[validate(length(min = 1, max = 100))]
    pub category: String,

    #[validate(custom = "validate_amount")]
    pub amount: Decimal,

    #[validate(custom = "validate_liters")]
    pub liters_filled: Option<Decimal>,

    #[validate(custom = "validate_odometer")]
    pub odometer_reading: Option<i64>,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Request para actualizar un registro financiero existente.
///
/// `description: null` borra la descripción; omitirla la conserva.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFinancialEntryRequest {
    #[serde(default, deserialize_with = "deserialize_optional_flexible_date")]
    pub date: Option<NaiveDate>,

    pub entry_type: Option<EntryType>,

    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,

    #[validate(custom = "validate_amount")]
    pub amount: Option<Decimal>,

    #[validate(custom = "validate_liters")]
    pub liters_filled: Option<Decimal>,

    #[validate(custom = "validate_odometer")]
    pub odometer_reading: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,
}

/// Filtros para búsqueda de registros financieros
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFilters {
    pub truck_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub entry_type: Option<EntryType>,
    pub category: Option<String>,
    /// Busca por descripción o categoría
    pub search: Option<String>,
}

impl EntryFilters {
    pub fn for_window(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            start_date,
            end_date,
            ..Default::default()
        }
    }

    /// Aplica los filtros en memoria (misma semántica que la consulta SQL)
    pub fn matches(&self, entry: &FinancialEntry) -> bool {
        if self.truck_id.is_some_and(|id| id != entry.truck_id) {
            return false;
        }
        if self.entry_type.is_some_and(|t| t != entry.entry_type) {
            return false;
        }
        if let Some(category) = non_blank(&self.category) {
            if entry.category != category {
                return false;
            }
        }
        if self.start_date.is_some_and(|start| entry.date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| entry.date > end) {
            return false;
        }
        if let Some(term) = non_blank(&self.search) {
            let in_description = entry
                .description
                .as_deref()
                .is_some_and(|d| contains_ignore_case(d, term));
            if !in_description && !contains_ignore_case(&entry.category, term) {
                return false;
            }
        }
        true
    }
}

/// Acepta `YYYY-MM-DD` o un datetime RFC 3339 (el front manda ISO 8601)
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    validate_date(value)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}

fn deserialize_flexible_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
}

fn deserialize_optional_flexible_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_flexible_date(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw))),
        None => Ok(None),
    }
}

/// Distingue campo ausente (`None`) de `null` explícito (`Some(None)`)
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(entry_type: EntryType, category: &str, amount: i64) -> FinancialEntry {
        FinancialEntry {
            id: Uuid::new_v4(),
            truck_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            entry_type,
            category: category.to_string(),
            amount: Decimal::new(amount, 0),
            liters_filled: None,
            odometer_reading: None,
            description: None,
            created_user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_consistency_accepts_fuel_readings() {
        let mut e = entry(EntryType::Expense, "Combustível", 800);
        e.liters_filled = Some(Decimal::new(150, 0));
        e.odometer_reading = Some(120_000);
        assert!(e.check_consistency().is_ok());
    }

    #[test]
    fn test_consistency_rejects_readings_outside_fuel() {
        let mut e = entry(EntryType::Expense, "Pedágio", 30);
        e.liters_filled = Some(Decimal::new(10, 0));
        e.odometer_reading = Some(5);
        let errors = e.check_consistency().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("liters_filled"));
        assert!(fields.contains_key("odometer_reading"));
    }

    #[test]
    fn test_consistency_checks_category_against_type() {
        let e = entry(EntryType::Revenue, "Combustível", 100);
        let errors = e.check_consistency().unwrap_err();
        assert!(errors.field_errors().contains_key("category"));

        let e = entry(EntryType::Expense, "Manutenção", 0);
        assert!(e.check_consistency().unwrap_err().field_errors().contains_key("amount"));
    }

    #[test]
    fn test_consistency_bounds_amount_and_liters() {
        let mut e = entry(EntryType::Expense, "Combustível", 800);
        e.amount = Decimal::MAX;
        e.liters_filled = Some(Decimal::new(10_000_000, 0));
        let errors = e.check_consistency().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("amount"));
        assert!(fields.contains_key("liters_filled"));

        let mut e = entry(EntryType::Expense, "Combustível", 800);
        e.amount = Decimal::new(10_005, 3);
        assert!(e.check_consistency().unwrap_err().field_errors().contains_key("amount"));
    }

    #[test]
    fn test_create_request_rejects_oversized_amount() {
        let request: CreateFinancialEntryRequest = serde_json::from_value(json!({
            "truckId": Uuid::new_v4(),
            "date": "2024-05-02",
            "entryType": "revenue",
            "category": "Frete",
            "amount": "79228162514264337593543950335"
        }))
        .unwrap();
        assert_eq!(request.amount, Decimal::MAX);
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));
    }

    #[test]
    fn test_create_request_accepts_iso_datetime() {
        let request: CreateFinancialEntryRequest = serde_json::from_value(json!({
            "truckId": Uuid::new_v4(),
            "date": "2024-05-02T03:00:00.000Z",
            "entryType": "expense",
            "category": "Combustível",
            "amount": 450.5,
            "litersFilled": 80,
            "odometerReading": 152300
        }))
        .unwrap();
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(request.amount, Decimal::new(4505, 1));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_request_distinguishes_null_description() {
        let cleared: UpdateFinancialEntryRequest =
            serde_json::from_value(json!({ "description": null })).unwrap();
        assert_eq!(cleared.description, Some(None));

        let untouched: UpdateFinancialEntryRequest =
            serde_json::from_value(json!({ "amount": "12.30" })).unwrap();
        assert_eq!(untouched.description, None);
        assert_eq!(untouched.amount, Some(Decimal::new(1230, 2)));
    }

    #[test]
    fn test_filters_match_window_and_search() {
        let mut e = entry(EntryType::Expense, "Manutenção", 300);
        e.description = Some("Troca de embreagem".into());

        let window = EntryFilters::for_window(
            NaiveDate::from_ymd_opt(2024, 3, 10),
            NaiveDate::from_ymd_opt(2024, 3, 10),
        );
        assert!(window.matches(&e));

        let before = EntryFilters::for_window(None, NaiveDate::from_ymd_opt(2024, 3, 9));
        assert!(!before.matches(&e));

        let search = EntryFilters {
            search: Some("EMBREAGEM".into()),
            ..Default::default()
        };
        assert!(search.matches(&e));

        let by_category = EntryFilters {
            search: Some("manut".into()),
            ..Default::default()
        };
        assert!(by_category.matches(&e));

        let wildcard = EntryFilters {
            search: Some("%".into()),
            ..Default::default()
        };
        assert!(!wildcard.matches(&e));

        let other_truck = EntryFilters {
            truck_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(!other_truck.matches(&e));
    }
}
