//! DTOs de la API
//!
//! Formas de respuesta que no coinciden uno a uno con los modelos.

pub mod api_response;
pub mod auth_dto;
pub mod category_dto;
pub mod financial_entry_dto;

pub use api_response::ApiResponse;
