//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean
//! al schema PostgreSQL legacy (tablas `core_*`).

pub mod auth;
pub mod driver;
pub mod mission;
pub mod vehicle;
