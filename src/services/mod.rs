//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación. El
//! agregador de desempeño es puro; los servicios de dashboard y
//! reportes cargan los datos y lo invocan.

pub mod auth_service;
pub mod dashboard_service;
pub mod list_query;
pub mod performance_aggregator;
pub mod report_service;

pub use dashboard_service::DashboardService;
pub use list_query::{ListQuery, PageSource};
pub use report_service::ReportService;
