use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use validator::Validate;

use crate::dto::mission_dto::{
    parse_status, CreateMissionRequest, MissionCreatedResponse, MissionDeletedResponse,
    MissionDetailResponse, MissionListQuery, MissionListResponse, MissionUpdatedResponse,
    StatusChangeResponse, UpdateMissionRequest,
};
use crate::models::mission::{MissionPatch, MissionStats, MissionStatus};
use crate::repositories::{MissionRepository, Page};
use crate::utils::errors::{not_found_error, AppResult};

pub struct MissionController {
    repository: Arc<dyn MissionRepository>,
}

impl MissionController {
    pub fn new(repository: Arc<dyn MissionRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: MissionListQuery) -> AppResult<MissionListResponse> {
        query.validate()?;

        let page = Page::new(query.skip, query.limit);
        let (missions, total) = self.repository.list(&query.filters(), page).await?;

        Ok(MissionListResponse {
            missions,
            total,
            page: page.number(),
            per_page: page.limit,
            filters_applied: query.filters_applied(),
        })
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<MissionDetailResponse> {
        let mission = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Mission", id))?;
        Ok(mission.into())
    }

    pub async fn create(&self, request: CreateMissionRequest) -> AppResult<MissionCreatedResponse> {
        request.validate()?;

        let mission = self.repository.create(request.into()).await?;
        info!("📋 Mission {} créée vers {}", mission.id, mission.destination);
        Ok(MissionCreatedResponse::new(mission))
    }

    pub async fn update(
        &self,
        id: i32,
        request: UpdateMissionRequest,
    ) -> AppResult<MissionUpdatedResponse> {
        let patch = request.into_patch()?;
        let (previous, mission) = self.repository.update(id, patch).await?;
        log_status_change(id, previous.statut, mission.statut);

        Ok(MissionUpdatedResponse {
            mission,
            message: "Mission mise à jour avec succès".to_string(),
        })
    }

    /// Cambio de statut dedicado. Un valor desconocido se rechaza antes de
    /// tocar el almacenamiento.
    pub async fn update_status(
        &self,
        id: i32,
        raw_status: Option<&str>,
    ) -> AppResult<StatusChangeResponse> {
        let status = parse_status(raw_status.unwrap_or_default())?;

        let patch = MissionPatch {
            statut: Some(status),
            ..Default::default()
        };
        let (previous, mission) = self.repository.update(id, patch).await?;
        log_status_change(id, previous.statut, mission.statut);

        Ok(StatusChangeResponse {
            mission_id: id,
            ancien_statut: previous.statut,
            nouveau_statut: mission.statut,
            timestamp: mission.date_modification.unwrap_or_else(Utc::now),
            message: format!(
                "Statut changé de '{}' vers '{}'",
                previous.statut, mission.statut
            ),
        })
    }

    pub async fn delete(&self, id: i32) -> AppResult<MissionDeletedResponse> {
        let mission = self.repository.delete(id).await?;
        info!("🗑️ Mission {} supprimée", id);
        Ok(mission.into())
    }

    pub async fn dashboard(&self, as_of: NaiveDate) -> AppResult<MissionStats> {
        self.repository.dashboard_stats(as_of).await
    }
}

fn log_status_change(id: i32, from: MissionStatus, to: MissionStatus) {
    if from == to {
        return;
    }
    if from.is_terminal() {
        warn!("⚠️ Mission {} rouverte: {} -> {}", id, from, to);
    } else {
        info!("🔄 Mission {}: {} -> {}", id, from, to);
    }
}
