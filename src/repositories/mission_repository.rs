use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use super::{map_constraint_error, MissionRepository, Page};
use crate::models::mission::{
    InvalidStatus, Mission, MissionFilters, MissionPatch, MissionStats, MissionStatus, NewMission,
    StatusFilter,
};
use crate::utils::errors::{bad_request_error, not_found_error, AppError, AppResult};

const MISSION_COLUMNS: &str = "id, destination, lieu_depart, date_souhaitee, heure_depart, \
     heure_retour, vehicule_id, chauffeur_id, demandeur_id, distance_parcourue, observations, \
     statut, date_creation, date_modification";

/// Referencias inexistentes en una escritura son un argumento inválido
fn invalid_reference(constraint: &str) -> AppError {
    let target = if constraint.contains("chauffeur") {
        "Chauffeur"
    } else {
        "Véhicule"
    };
    bad_request_error(&format!("{} référencé inexistant", target))
}

/// Filtros opcionales (AND); un parámetro NULL desactiva su condición
const FILTER_CLAUSE: &str = "($1::text IS NULL OR statut = $1) \
     AND ($2::date IS NULL OR date_souhaitee >= $2) \
     AND ($3::date IS NULL OR date_souhaitee <= $3) \
     AND ($4::int IS NULL OR chauffeur_id = $4) \
     AND ($5::int IS NULL OR vehicule_id = $5)";

/// Statut a enlazar en `$1`; `None` si no hay filtro de statut
fn status_param(filters: &MissionFilters) -> Option<&'static str> {
    match &filters.statut {
        StatusFilter::Is(status) => Some(status.as_str()),
        _ => None,
    }
}

/// Reduce las filas `(statut, total, del día, distancia)` del GROUP BY
fn fold_status_counts(rows: Vec<(String, i64, i64, i64)>) -> AppResult<MissionStats> {
    let mut by_status = BTreeMap::new();
    let mut today = 0;
    let mut distance = 0;

    for (statut, total, of_day, km) in rows {
        let status: MissionStatus = statut
            .parse()
            .map_err(|e: InvalidStatus| AppError::Internal(e.to_string()))?;
        *by_status.entry(status).or_insert(0) += total as usize;
        today += of_day as usize;
        distance += km;
    }

    Ok(MissionStats::from_counts(by_status, today, distance))
}

pub struct PgMissionRepository {
    pool: PgPool,
}

impl PgMissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MissionRepository for PgMissionRepository {
    async fn list(&self, filters: &MissionFilters, page: Page) -> AppResult<(Vec<Mission>, i64)> {
        if let StatusFilter::Unknown(_) = filters.statut {
            return Ok((Vec::new(), 0));
        }

        let statut = status_param(filters);

        let missions = sqlx::query_as::<_, Mission>(&format!(
            "SELECT {} FROM core_course WHERE {} ORDER BY id OFFSET $6 LIMIT $7",
            MISSION_COLUMNS, FILTER_CLAUSE
        ))
        .bind(statut)
        .bind(filters.date_debut)
        .bind(filters.date_fin)
        .bind(filters.chauffeur_id)
        .bind(filters.vehicule_id)
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM core_course WHERE {}",
            FILTER_CLAUSE
        ))
        .bind(statut)
        .bind(filters.date_debut)
        .bind(filters.date_fin)
        .bind(filters.chauffeur_id)
        .bind(filters.vehicule_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((missions, total))
    }

    async fn dashboard_stats(&self, as_of: NaiveDate) -> AppResult<MissionStats> {
        let rows: Vec<(String, i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT statut,
                   COUNT(*),
                   COUNT(*) FILTER (WHERE date_souhaitee = $1),
                   COALESCE(SUM(distance_parcourue), 0)::BIGINT
            FROM core_course
            GROUP BY statut
            "#,
        )
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        fold_status_counts(rows)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Mission>> {
        let mission = sqlx::query_as::<_, Mission>(&format!(
            "SELECT {} FROM core_course WHERE id = $1",
            MISSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(mission)
    }

    async fn find_by_driver(&self, driver_id: i32) -> AppResult<Vec<Mission>> {
        let missions = sqlx::query_as::<_, Mission>(&format!(
            "SELECT {} FROM core_course WHERE chauffeur_id = $1 ORDER BY id",
            MISSION_COLUMNS
        ))
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(missions)
    }

    async fn create(&self, data: NewMission) -> AppResult<Mission> {
        let mission = sqlx::query_as::<_, Mission>(&format!(
            r#"
            INSERT INTO core_course (
                destination, lieu_depart, date_souhaitee, heure_depart, heure_retour,
                vehicule_id, chauffeur_id, demandeur_id, distance_parcourue,
                observations, statut, date_creation
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9, $10, $11)
            RETURNING {}
            "#,
            MISSION_COLUMNS
        ))
        .bind(&data.destination)
        .bind(&data.lieu_depart)
        .bind(data.date_souhaitee)
        .bind(&data.heure_depart)
        .bind(&data.heure_retour)
        .bind(data.vehicule_id)
        .bind(data.chauffeur_id)
        .bind(data.demandeur_id)
        .bind(&data.observations)
        .bind(MissionStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, invalid_reference))?;

        Ok(mission)
    }

    async fn update(&self, id: i32, patch: MissionPatch) -> AppResult<(Mission, Mission)> {
        let mut tx = self.pool.begin().await?;

        let previous = sqlx::query_as::<_, Mission>(&format!(
            "SELECT {} FROM core_course WHERE id = $1 FOR UPDATE",
            MISSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found_error("Mission", id))?;

        let mut mission = previous.clone();
        mission.apply(patch, Utc::now());

        let updated = sqlx::query_as::<_, Mission>(&format!(
            r#"
            UPDATE core_course
            SET destination = $2, lieu_depart = $3, date_souhaitee = $4,
                heure_depart = $5, heure_retour = $6, vehicule_id = $7,
                chauffeur_id = $8, demandeur_id = $9, distance_parcourue = $10,
                observations = $11, statut = $12, date_modification = $13
            WHERE id = $1
            RETURNING {}
            "#,
            MISSION_COLUMNS
        ))
        .bind(id)
        .bind(&mission.destination)
        .bind(&mission.lieu_depart)
        .bind(mission.date_souhaitee)
        .bind(&mission.heure_depart)
        .bind(&mission.heure_retour)
        .bind(mission.vehicule_id)
        .bind(mission.chauffeur_id)
        .bind(mission.demandeur_id)
        .bind(mission.distance_parcourue)
        .bind(&mission.observations)
        .bind(mission.statut.as_str())
        .bind(mission.date_modification)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_error(e, invalid_reference))?;

        tx.commit().await?;
        Ok((previous, updated))
    }

    async fn delete(&self, id: i32) -> AppResult<Mission> {
        sqlx::query_as::<_, Mission>(&format!(
            "DELETE FROM core_course WHERE id = $1 RETURNING {}",
            MISSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Mission", id))
    }
}
