//! DTOs de la API: requests validados, queries y responses

pub mod auth_dto;
pub mod driver_dto;
pub mod mission_dto;
pub mod vehicle_dto;
