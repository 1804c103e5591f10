use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::dto::vehicle_dto::VehicleSummary;
use crate::models::driver::Driver;
use crate::models::mission::{Mission, MissionStatus};

// Response del listado de choferes
#[derive(Debug, Serialize)]
pub struct DriverListResponse {
    pub chauffeurs: Vec<Driver>,
    pub total: usize,
}

// Detalle de chofer con actividad derivada de sus missions
#[derive(Debug, Serialize)]
pub struct DriverDetailResponse {
    #[serde(flatten)]
    pub driver: Driver,
    pub nom_complet: String,
    pub missions_total: usize,
    pub missions_ce_mois: usize,
    pub vehicule_attribue: Option<VehicleSummary>,
}

impl DriverDetailResponse {
    pub fn new(
        driver: Driver,
        missions: &[Mission],
        vehicule_attribue: Option<VehicleSummary>,
        today: NaiveDate,
    ) -> Self {
        let missions_ce_mois = missions
            .iter()
            .filter(|m| {
                m.date_souhaitee.year() == today.year() && m.date_souhaitee.month() == today.month()
            })
            .count();

        Self {
            nom_complet: driver.nom_complet(),
            driver,
            missions_total: missions.len(),
            missions_ce_mois,
            vehicule_attribue,
        }
    }
}

/// Vehículo de la mission más reciente (por fecha, luego id) que tenga uno asignado
pub fn latest_vehicle_id(missions: &[Mission]) -> Option<i32> {
    missions
        .iter()
        .filter(|m| m.vehicule_id.is_some())
        .max_by_key(|m| (m.date_souhaitee, m.id))
        .and_then(|m| m.vehicule_id)
}

// Línea del historial de un chofer
#[derive(Debug, Serialize)]
pub struct DriverMissionEntry {
    pub id: i32,
    pub destination: String,
    pub date: NaiveDate,
    pub statut: MissionStatus,
    pub distance_km: i32,
}

// Historial de missions de un chofer
#[derive(Debug, Serialize)]
pub struct DriverMissionsResponse {
    pub chauffeur_id: i32,
    pub missions: Vec<DriverMissionEntry>,
    pub total_missions: usize,
    pub total_km: i64,
}

impl DriverMissionsResponse {
    pub fn new(chauffeur_id: i32, missions: Vec<Mission>) -> Self {
        let total_km = missions.iter().map(|m| m.distance_parcourue as i64).sum();
        let missions: Vec<DriverMissionEntry> = missions
            .into_iter()
            .map(|m| DriverMissionEntry {
                id: m.id,
                destination: m.destination,
                date: m.date_souhaitee,
                statut: m.statut,
                distance_km: m.distance_parcourue,
            })
            .collect();

        Self {
            chauffeur_id,
            total_missions: missions.len(),
            missions,
            total_km,
        }
    }
}
