//! IPSCO Fleet API
//!
//! Backend de gestión de flota: vehículos, choferes, missions y acceso.

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

use std::time::Duration;

use axum::Router;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::middleware::cors_layer;
use crate::state::AppState;

/// Router completo con sus capas HTTP
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(routes::system_routes::create_system_router())
        .nest("/auth", routes::auth_routes::auth_routes(state.clone()))
        .nest("/api/vehicules", routes::vehicle_routes::create_vehicle_router())
        .nest("/api/chauffeurs", routes::driver_routes::create_driver_router())
        .nest("/api/missions", routes::mission_routes::create_mission_router())
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
