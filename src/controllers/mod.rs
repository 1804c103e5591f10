//! Controladores: orquestan validación, repositorios y DTOs de respuesta

pub mod auth_controller;
pub mod driver_controller;
pub mod mission_controller;
pub mod vehicle_controller;
