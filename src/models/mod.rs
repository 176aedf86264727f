//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema
//! PostgreSQL y los modelos derivados que nunca se persisten.

pub mod category;
pub mod financial_entry;
pub mod pagination;
pub mod performance;
pub mod report;
pub mod truck;
pub mod user;
