//! Fleet Control
//!
//! Backend de gestión de flota: camiones, registros financieros, desempeño
//! por camión, dashboard y reportes.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
