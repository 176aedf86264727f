//! Utilidades de validación
//!
//! Funciones usadas por los `#[validate(custom = ...)]` de los requests
//! y por los controllers al revalidar un registro ya mezclado.

use std::borrow::Borrow;

use chrono::{Datelike, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidationError;

lazy_static! {
    /// Placa antigua: tres letras y cuatro dígitos (ABC1234)
    static ref LEGACY_PLATE: Regex = Regex::new(r"^[A-Z]{3}[0-9]{4}$").unwrap();
    /// Placa Mercosul: tres letras, dígito, letra, dos dígitos (ABC1D23)
    static ref MERCOSUL_PLATE: Regex = Regex::new(r"^[A-Z]{3}[0-9][A-Z][0-9]{2}$").unwrap();
}

pub const MIN_TRUCK_YEAR: i32 = 1900;

/// Normaliza una placa: mayúsculas, sin espacios ni guiones
pub fn normalize_license_plate(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// Validar formato de placa (antigua o Mercosul)
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    let plate = normalize_license_plate(value);
    if LEGACY_PLATE.is_match(&plate) || MERCOSUL_PLATE.is_match(&plate) {
        return Ok(());
    }

    let mut error = ValidationError::new("license_plate");
    error.message = Some("expected AAA9999 or Mercosul AAA9A99".into());
    error.add_param("value".into(), &value.to_string());
    Err(error)
}

/// Año máximo aceptado para un camión (año actual + 1)
pub fn max_truck_year() -> i32 {
    Utc::now().year() + 1
}

/// Validar año del camión dentro de [1900, año actual + 1]
pub fn validate_truck_year(year: i32) -> Result<(), ValidationError> {
    validate_range(year, MIN_TRUCK_YEAR, max_truck_year()).map_err(|mut e| {
        e.code = "year".into();
        e
    })
}

/// Validar modelo (texto libre, mínimo dos caracteres útiles)
pub fn validate_model(value: &str) -> Result<(), ValidationError> {
    validate_not_empty(value)?;
    validate_length(value.trim(), 2, 100)
}

/// Validar y convertir string a fecha
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar longitud mínima y máxima
pub fn validate_length(value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        let mut error = ValidationError::new("length");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &len);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor esté en un rango específico
pub fn validate_range<T: PartialOrd + Serialize>(
    value: T,
    min: T,
    max: T,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea positivo
pub fn validate_positive<T: PartialOrd + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value <= T::zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Decimales admitidos en montos (columna NUMERIC(14, 2))
pub const AMOUNT_SCALE: u32 = 2;
/// Decimales admitidos en litros (columna NUMERIC(10, 3))
pub const LITERS_SCALE: u32 = 3;

/// Mayor monto almacenable: 999 999 999 999.99
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, AMOUNT_SCALE)
}

/// Mayor volumen almacenable: 9 999 999.999 litros
pub fn max_liters() -> Decimal {
    Decimal::new(9_999_999_999, LITERS_SCALE)
}

/// Validar un decimal positivo, acotado por `max` y con a lo sumo `scale` decimales
pub fn validate_bounded_decimal(
    value: Decimal,
    max: Decimal,
    scale: u32,
) -> Result<(), ValidationError> {
    validate_positive(value)?;

    if value > max {
        let mut error = ValidationError::new("max");
        error.add_param("max".into(), &max);
        error.add_param("value".into(), &value);
        return Err(error);
    }

    if value.normalize().scale() > scale {
        let mut error = ValidationError::new("scale");
        error.add_param("scale".into(), &scale);
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Adaptadores para `#[validate(custom = "...")]`; el derive pasa los
/// enteros por valor y el resto por referencia, `Borrow` acepta ambos.
pub fn validate_amount(value: impl Borrow<Decimal>) -> Result<(), ValidationError> {
    validate_bounded_decimal(*value.borrow(), max_amount(), AMOUNT_SCALE)
}

pub fn validate_liters(value: impl Borrow<Decimal>) -> Result<(), ValidationError> {
    validate_bounded_decimal(*value.borrow(), max_liters(), LITERS_SCALE)
}

pub fn validate_odometer(value: impl Borrow<i64>) -> Result<(), ValidationError> {
    validate_non_negative(*value.borrow())
}

pub fn validate_plate_field(value: &str) -> Result<(), ValidationError> {
    validate_license_plate(value)
}

pub fn validate_year_field(value: impl Borrow<i32>) -> Result<(), ValidationError> {
    validate_truck_year(*value.borrow())
}

pub fn validate_model_field(value: &str) -> Result<(), ValidationError> {
    validate_model(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(units: i64, scale: u32) -> Decimal {
        Decimal::new(units, scale)
    }

    #[test]
    fn test_normalize_license_plate() {
        assert_eq!(normalize_license_plate("abc-1234"), "ABC1234");
        assert_eq!(normalize_license_plate(" qol 7533 "), "QOL7533");
    }

    #[test]
    fn test_validate_license_plate() {
        assert!(validate_license_plate("ABC1234").is_ok());
        assert!(validate_license_plate("abc-1234").is_ok());
        assert!(validate_license_plate("BRA2E19").is_ok());
        assert!(validate_license_plate("AB12345").is_err());
        assert!(validate_license_plate("ABCD123").is_err());
        assert!(validate_license_plate("ABC12E3").is_err());
        assert!(validate_license_plate("").is_err());
    }

    #[test]
    fn test_validate_truck_year() {
        assert!(validate_truck_year(1900).is_ok());
        assert!(validate_truck_year(max_truck_year()).is_ok());
        assert!(validate_truck_year(1899).is_err());
        assert!(validate_truck_year(max_truck_year() + 1).is_err());
    }

    #[test]
    fn test_validate_model() {
        assert!(validate_model("Volvo FH 540").is_ok());
        assert!(validate_model("V").is_err());
        assert!(validate_model("   ").is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2024-01-15").is_ok());
        assert!(validate_date("2024/01/15").is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(dec(1, 2)).is_ok());
        assert!(validate_amount(dec(45_000, 3)).is_ok());
        assert!(validate_amount(max_amount()).is_ok());
        assert!(validate_amount(dec(0, 0)).is_err());
        assert!(validate_amount(dec(-150, 1)).is_err());
    }

    #[test]
    fn test_validate_amount_limits() {
        let too_large = validate_amount(Decimal::MAX).unwrap_err();
        assert_eq!(too_large.code, "max");
        assert!(validate_amount(max_amount() + dec(1, 2)).is_err());

        let too_precise = validate_amount(dec(1_005, 3)).unwrap_err();
        assert_eq!(too_precise.code, "scale");
    }

    #[test]
    fn test_validate_liters() {
        assert!(validate_liters(dec(80_125, 3)).is_ok());
        assert!(validate_liters(max_liters()).is_ok());
        assert_eq!(validate_liters(dec(10_000_000, 0)).unwrap_err().code, "max");
        assert_eq!(validate_liters(dec(10_001, 4)).unwrap_err().code, "scale");
        assert!(validate_liters(dec(0, 0)).is_err());
    }

    #[test]
    fn test_validate_odometer() {
        assert!(validate_odometer(0_i64).is_ok());
        assert!(validate_odometer(125_000_i64).is_ok());
        assert!(validate_odometer(-1_i64).is_err());
    }
}
