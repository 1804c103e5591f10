use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::Local;

use crate::controllers::mission_controller::MissionController;
use crate::dto::mission_dto::{
    CreateMissionRequest, DashboardQuery, MissionCreatedResponse, MissionDeletedResponse,
    MissionDetailResponse, MissionListQuery, MissionListResponse, MissionUpdatedResponse,
    StatusChangeRequest, StatusChangeResponse, StatusQuery, UpdateMissionRequest,
};
use crate::models::mission::MissionStats;
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppResult};

pub fn create_mission_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_missions).post(create_mission))
        .route("/stats/dashboard", get(dashboard))
        .route(
            "/:id",
            get(get_mission).put(update_mission).delete(delete_mission),
        )
        .route("/:id/statut", put(update_status))
}

fn controller(state: &AppState) -> MissionController {
    MissionController::new(state.missions.clone())
}

async fn list_missions(
    State(state): State<AppState>,
    Query(query): Query<MissionListQuery>,
) -> AppResult<Json<MissionListResponse>> {
    Ok(Json(controller(&state).list(query).await?))
}

async fn get_mission(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<MissionDetailResponse>> {
    Ok(Json(controller(&state).get_by_id(id).await?))
}

async fn create_mission(
    State(state): State<AppState>,
    Json(request): Json<CreateMissionRequest>,
) -> AppResult<(StatusCode, Json<MissionCreatedResponse>)> {
    let response = controller(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_mission(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateMissionRequest>,
) -> AppResult<Json<MissionUpdatedResponse>> {
    Ok(Json(controller(&state).update(id, request).await?))
}

/// El nuevo statut llega por query (`?nouveau_statut=`) o en un body JSON
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<StatusQuery>,
    body: Bytes,
) -> AppResult<Json<StatusChangeResponse>> {
    let from_body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<StatusChangeRequest>(&body)
            .map_err(|e| bad_request_error(&format!("Corps JSON invalide: {}", e)))?
            .nouveau_statut
    };
    let raw = query.nouveau_statut.or(from_body);

    Ok(Json(controller(&state).update_status(id, raw.as_deref()).await?))
}

async fn delete_mission(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<MissionDeletedResponse>> {
    Ok(Json(controller(&state).delete(id).await?))
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<MissionStats>> {
    let as_of = query.date.unwrap_or_else(|| Local::now().date_naive());
    Ok(Json(controller(&state).dashboard(as_of).await?))
}
