//! Services module
//!
//! Lógica de negocio que no pertenece a un solo recurso.

pub mod auth_service;

pub use auth_service::AuthService;
