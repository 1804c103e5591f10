use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Local;

use crate::controllers::driver_controller::DriverController;
use crate::dto::driver_dto::{DriverDetailResponse, DriverListResponse, DriverMissionsResponse};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers))
        .route("/:id", get(get_driver))
        .route("/:id/missions", get(driver_missions))
}

fn controller(state: &AppState) -> DriverController {
    DriverController::new(
        state.drivers.clone(),
        state.missions.clone(),
        state.vehicles.clone(),
    )
}

async fn list_drivers(State(state): State<AppState>) -> AppResult<Json<DriverListResponse>> {
    Ok(Json(controller(&state).list().await?))
}

async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<DriverDetailResponse>> {
    let today = Local::now().date_naive();
    Ok(Json(controller(&state).get_by_id(id, today).await?))
}

async fn driver_missions(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<DriverMissionsResponse>> {
    Ok(Json(controller(&state).missions(id).await?))
}
