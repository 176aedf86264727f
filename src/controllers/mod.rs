//! Controllers
//!
//! Orquestan validación, repositorios y servicios para cada recurso.

pub mod auth_controller;
pub mod financial_entry_controller;
pub mod truck_controller;
