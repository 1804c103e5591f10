use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::mission::{
    Mission, MissionFilters, MissionPatch, MissionStatus, NewMission, StatusFilter, TimelineEntry,
};
use crate::utils::errors::{bad_request_error, validation_error, AppResult};
use crate::utils::serde_helpers::double_option;
use crate::utils::validation::{validate_not_blank, validate_time_of_day};

fn default_mission_limit() -> i64 {
    20
}

// Query del listado de missions: paginación + filtros
#[derive(Debug, Deserialize, Validate)]
pub struct MissionListQuery {
    #[serde(default)]
    #[validate(range(min = 0))]
    pub skip: i64,
    #[serde(default = "default_mission_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
    pub statut: Option<String>,
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
    pub chauffeur_id: Option<i32>,
    pub vehicule_id: Option<i32>,
}

impl MissionListQuery {
    pub fn filters(&self) -> MissionFilters {
        MissionFilters {
            statut: StatusFilter::from_query(self.statut.as_deref()),
            date_debut: self.date_debut,
            date_fin: self.date_fin,
            chauffeur_id: self.chauffeur_id,
            vehicule_id: self.vehicule_id,
        }
    }

    pub fn filters_applied(&self) -> FiltersApplied {
        FiltersApplied {
            statut: self.statut.clone(),
            date_debut: self.date_debut,
            date_fin: self.date_fin,
            chauffeur_id: self.chauffeur_id,
            vehicule_id: self.vehicule_id,
        }
    }
}

// Eco de los filtros recibidos
#[derive(Debug, Serialize)]
pub struct FiltersApplied {
    pub statut: Option<String>,
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
    pub chauffeur_id: Option<i32>,
    pub vehicule_id: Option<i32>,
}

// Request para crear una mission
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMissionRequest {
    #[validate(length(max = 200), custom = "validate_not_blank")]
    pub destination: String,
    #[validate(length(max = 200))]
    pub lieu_depart: Option<String>,
    pub date_souhaitee: NaiveDate,
    #[validate(custom = "validate_time_of_day")]
    pub heure_depart: Option<String>,
    #[validate(custom = "validate_time_of_day")]
    pub heure_retour: Option<String>,
    pub vehicule_id: Option<i32>,
    pub chauffeur_id: Option<i32>,
    pub demandeur_id: Option<i32>,
    pub observations: Option<String>,
}

impl From<CreateMissionRequest> for NewMission {
    fn from(request: CreateMissionRequest) -> Self {
        Self {
            destination: request.destination.trim().to_string(),
            lieu_depart: request.lieu_depart,
            date_souhaitee: request.date_souhaitee,
            heure_depart: request.heure_depart,
            heure_retour: request.heure_retour,
            vehicule_id: request.vehicule_id,
            chauffeur_id: request.chauffeur_id,
            demandeur_id: request.demandeur_id,
            observations: request.observations,
        }
    }
}

// Request para actualizar una mission.
// `null` explícito en un campo anulable lo vacía; ausente lo deja intacto.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMissionRequest {
    #[validate(length(max = 200), custom = "validate_not_blank")]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub lieu_depart: Option<Option<String>>,
    pub date_souhaitee: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub heure_depart: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub heure_retour: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub vehicule_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub chauffeur_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub demandeur_id: Option<Option<i32>>,
    #[validate(range(min = 0))]
    pub distance_parcourue: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub observations: Option<Option<String>>,
    pub statut: Option<String>,
}

impl UpdateMissionRequest {
    /// Valida y convierte en un patch. El statut pasa por el mismo parseo
    /// que el cambio de statut dedicado.
    pub fn into_patch(self) -> AppResult<MissionPatch> {
        self.validate()?;

        for (field, value) in [
            ("heure_depart", &self.heure_depart),
            ("heure_retour", &self.heure_retour),
        ] {
            if let Some(Some(time)) = value {
                if validate_time_of_day(time).is_err() {
                    return Err(validation_error(field, "Format attendu HH:MM"));
                }
            }
        }

        let statut = self
            .statut
            .as_deref()
            .map(parse_status)
            .transpose()?;

        Ok(MissionPatch {
            destination: self.destination.map(|d| d.trim().to_string()),
            lieu_depart: self.lieu_depart,
            date_souhaitee: self.date_souhaitee,
            heure_depart: self.heure_depart,
            heure_retour: self.heure_retour,
            vehicule_id: self.vehicule_id,
            chauffeur_id: self.chauffeur_id,
            demandeur_id: self.demandeur_id,
            distance_parcourue: self.distance_parcourue,
            observations: self.observations,
            statut,
        })
    }
}

/// Parseo de statut compartido por todas las rutas de escritura
pub fn parse_status(raw: &str) -> AppResult<MissionStatus> {
    raw.parse::<MissionStatus>()
        .map_err(|e| bad_request_error(&e.to_string()))
}

// Query del cambio de statut (`?nouveau_statut=`)
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub nouveau_statut: Option<String>,
}

// Body alternativo del cambio de statut
#[derive(Debug, Default, Deserialize)]
pub struct StatusChangeRequest {
    pub nouveau_statut: Option<String>,
}

// Query del dashboard
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub date: Option<NaiveDate>,
}

// Response de creación
#[derive(Debug, Serialize)]
pub struct MissionCreatedResponse {
    pub mission: Mission,
    pub message: String,
    pub next_steps: Vec<String>,
}

impl MissionCreatedResponse {
    pub fn new(mission: Mission) -> Self {
        let mut next_steps = Vec::new();
        if mission.vehicule_id.is_none() {
            next_steps.push("Attribution d'un véhicule".to_string());
        }
        if mission.chauffeur_id.is_none() {
            next_steps.push("Assignation d'un chauffeur".to_string());
        }
        next_steps.push("Validation par le dispatcher".to_string());

        Self {
            mission,
            message: "Mission créée avec succès".to_string(),
            next_steps,
        }
    }
}

// Detalle de mission con timeline
#[derive(Debug, Serialize)]
pub struct MissionDetailResponse {
    #[serde(flatten)]
    pub mission: Mission,
    pub timeline: Vec<TimelineEntry>,
}

impl From<Mission> for MissionDetailResponse {
    fn from(mission: Mission) -> Self {
        let timeline = mission.timeline();
        Self { mission, timeline }
    }
}

// Response del listado paginado
#[derive(Debug, Serialize)]
pub struct MissionListResponse {
    pub missions: Vec<Mission>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub filters_applied: FiltersApplied,
}

// Response de actualización
#[derive(Debug, Serialize)]
pub struct MissionUpdatedResponse {
    pub mission: Mission,
    pub message: String,
}

// Response del cambio de statut
#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub mission_id: i32,
    pub ancien_statut: MissionStatus,
    pub nouveau_statut: MissionStatus,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

// Resumen de la mission eliminada
#[derive(Debug, Serialize)]
pub struct DeletedMission {
    pub id: i32,
    pub destination: String,
    pub statut: MissionStatus,
}

#[derive(Debug, Serialize)]
pub struct MissionDeletedResponse {
    pub message: String,
    pub mission_supprimee: DeletedMission,
}

impl From<Mission> for MissionDeletedResponse {
    fn from(mission: Mission) -> Self {
        Self {
            message: format!("Mission {} supprimée avec succès", mission.id),
            mission_supprimee: DeletedMission {
                id: mission.id,
                destination: mission.destination,
                statut: mission.statut,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::AppError;
    use serde_json::json;

    fn update(body: serde_json::Value) -> UpdateMissionRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_update_with_invalid_status_is_rejected() {
        let result = update(json!({ "statut": "livree" })).into_patch();
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_update_accepts_status_alias() {
        let patch = update(json!({ "statut": "Completed" })).into_patch().unwrap();
        assert_eq!(patch.statut, Some(MissionStatus::Completed));
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let patch = update(json!({ "vehicule_id": null, "distance_parcourue": 12 }))
            .into_patch()
            .unwrap();
        assert_eq!(patch.vehicule_id, Some(None));
        assert_eq!(patch.chauffeur_id, None);
        assert_eq!(patch.distance_parcourue, Some(12));
    }

    #[test]
    fn test_update_rejects_negative_distance_and_bad_time() {
        assert!(update(json!({ "distance_parcourue": -5 })).into_patch().is_err());
        assert!(update(json!({ "heure_depart": "25:00" })).into_patch().is_err());
        assert!(update(json!({ "heure_depart": null })).into_patch().is_ok());
    }

    #[test]
    fn test_create_requires_destination_and_valid_times() {
        let request: CreateMissionRequest = serde_json::from_value(json!({
            "destination": "  ",
            "date_souhaitee": "2025-01-20"
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let request: CreateMissionRequest = serde_json::from_value(json!({
            "destination": "Kolwezi",
            "date_souhaitee": "2025-01-20",
            "heure_depart": "8h30"
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_next_steps_depend_on_assignment() {
        let mission = crate::models::mission::tests::mission(
            1,
            MissionStatus::Pending,
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        );
        let response = MissionCreatedResponse::new(mission);
        assert_eq!(response.next_steps.len(), 3);
        assert_eq!(response.message, "Mission créée avec succès");
    }
}
