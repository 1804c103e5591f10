use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::models::mission::{MissionFilters, MissionStatus, StatusFilter};
use crate::repositories::Page;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_system_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/stats", get(global_stats))
}

/// Banner de la API
async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "IPSCO Fleet API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "storage": state.storage.name(),
        "features": [
            "Gestion des véhicules",
            "Alertes d'expiration des documents",
            "Annuaire des chauffeurs",
            "Gestion des missions",
            "Tableau de bord",
            "Authentification JWT"
        ]
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "database": state.storage.health().await,
    }))
}

/// Contadores globales del sistema
async fn global_stats(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let total_vehicules = state.vehicles.count().await?;
    let total_chauffeurs = state.drivers.count().await?;

    let active = MissionFilters {
        statut: StatusFilter::Is(MissionStatus::InProgress),
        ..Default::default()
    };
    let (_, missions_actives) = state.missions.list(&active, Page::new(0, 1)).await?;

    Ok(Json(json!({
        "total_vehicules": total_vehicules,
        "missions_actives": missions_actives,
        "total_chauffeurs": total_chauffeurs,
        "system_status": "operational",
        "storage": state.storage.name(),
    })))
}
