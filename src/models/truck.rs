//! Modelo de Truck
//!
//! Camión del registro de la flota. Mapea a la tabla `trucks`; nunca se
//! borra, solo cambia de estado (soft delete).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{validate_model_field, validate_plate_field, validate_year_field};

/// Estado del camión - mapea al ENUM truck_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "truck_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TruckStatus {
    #[serde(alias = "ativo")]
    Active,
    #[serde(alias = "inativo")]
    Inactive,
}

impl TruckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TruckStatus::Active => "active",
            TruckStatus::Inactive => "inactive",
        }
    }
}

/// Truck principal - mapea a la tabla trucks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Truck {
    pub id: Uuid,
    pub license_plate: String,
    pub model: String,
    pub year: i32,
    pub status: TruckStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Truck {
    pub fn is_active(&self) -> bool {
        self.status == TruckStatus::Active
    }
}

/// Request para registrar un camión
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTruckRequest {
    #[validate(custom = "validate_plate_field")]
    pub license_plate: String,

    #[validate(custom = "validate_model_field")]
    pub model: String,

    #[validate(custom = "validate_year_field")]
    pub year: i32,

    pub status: Option<TruckStatus>,
}

/// Request para actualizar un camión existente
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTruckRequest {
    #[validate(custom = "validate_plate_field")]
    pub license_plate: Option<String>,

    #[validate(custom = "validate_model_field")]
    pub model: Option<String>,

    #[validate(custom = "validate_year_field")]
    pub year: Option<i32>,

    pub status: Option<TruckStatus>,
}

/// Request para activar / desactivar un camión
#[derive(Debug, Deserialize)]
pub struct UpdateTruckStatusRequest {
    pub status: TruckStatus,
}

/// Filtros para búsqueda de camiones
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TruckFilters {
    /// Busca por placa, modelo o año
    pub search: Option<String>,
    pub status: Option<TruckStatus>,
    pub year: Option<i32>,
    /// Coincidencia parcial sobre el modelo
    pub model: Option<String>,
}

impl TruckFilters {
    /// Aplica los filtros en memoria (misma semántica que la consulta SQL)
    pub fn matches(&self, truck: &Truck) -> bool {
        if let Some(status) = self.status {
            if truck.status != status {
                return false;
            }
        }
        if let Some(year) = self.year {
            if truck.year != year {
                return false;
            }
        }
        if let Some(model) = non_blank(&self.model) {
            if !contains_ignore_case(&truck.model, model) {
                return false;
            }
        }
        if let Some(term) = non_blank(&self.search) {
            let hit = contains_ignore_case(&truck.license_plate, term)
                || contains_ignore_case(&truck.model, term)
                || truck.year.to_string().contains(term);
            if !hit {
                return false;
            }
        }
        true
    }
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
