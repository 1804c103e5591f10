//! Rutas de la API, agrupadas por recurso

pub mod auth_routes;
pub mod driver_routes;
pub mod mission_routes;
pub mod system_routes;
pub mod vehicle_routes;
