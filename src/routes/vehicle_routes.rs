use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Local;

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::{
    AsOfQuery, CreateVehicleRequest, FleetSummaryResponse, UpdateVehicleRequest,
    VehicleListQuery, VehicleListResponse, VehicleStatsResponse,
};
use crate::models::vehicle::Vehicle;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route("/stats", get(fleet_summary))
        .route(
            "/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route("/:id/stats", get(vehicle_stats))
}

fn controller(state: &AppState) -> VehicleController {
    VehicleController::new(state.vehicles.clone())
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<VehicleListQuery>,
) -> AppResult<Json<VehicleListResponse>> {
    Ok(Json(controller(&state).list(query).await?))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vehicle>> {
    Ok(Json(controller(&state).get_by_id(id).await?))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> AppResult<(StatusCode, Json<Vehicle>)> {
    let vehicle = controller(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateVehicleRequest>,
) -> AppResult<Json<Vehicle>> {
    Ok(Json(controller(&state).update(id, request).await?))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    controller(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn vehicle_stats(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<AsOfQuery>,
) -> AppResult<Json<VehicleStatsResponse>> {
    let as_of = query.date.unwrap_or_else(|| Local::now().date_naive());
    Ok(Json(controller(&state).stats(id, as_of).await?))
}

async fn fleet_summary(
    State(state): State<AppState>,
    Query(query): Query<AsOfQuery>,
) -> AppResult<Json<FleetSummaryResponse>> {
    let as_of = query.date.unwrap_or_else(|| Local::now().date_naive());
    Ok(Json(controller(&state).fleet_summary(as_of).await?))
}
