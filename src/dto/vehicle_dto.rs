use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::models::vehicle::{AlertLevel, NewVehicle, Vehicle, VehicleAlerts, VehiclePatch};
use crate::utils::validation::normalize_identifier;

fn default_vehicle_limit() -> i64 {
    10
}

// Query del listado de vehículos
#[derive(Debug, Deserialize, Validate)]
pub struct VehicleListQuery {
    #[serde(default)]
    #[validate(range(min = 0))]
    pub skip: i64,
    #[serde(default = "default_vehicle_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
    pub search: Option<String>,
}

// Query con fecha de referencia opcional (por defecto hoy)
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    pub date: Option<NaiveDate>,
}

// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 3, max = 20))]
    pub immatriculation: String,
    #[validate(length(min = 1, max = 50))]
    pub marque: String,
    #[validate(length(min = 1, max = 50))]
    pub modele: String,
    #[validate(length(min = 1, max = 30))]
    pub couleur: String,
    #[validate(length(min = 5, max = 50))]
    pub numero_chassis: String,
    pub date_immatriculation: Option<NaiveDate>,
    pub date_expiration_assurance: NaiveDate,
    pub date_expiration_controle_technique: NaiveDate,
    pub date_expiration_vignette: NaiveDate,
    pub date_expiration_stationnement: NaiveDate,
    #[validate(range(min = 0))]
    pub kilometrage_actuel: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub kilometrage_dernier_entretien: i32,
}

impl CreateVehicleRequest {
    /// Recorta los textos y normaliza matrícula y chasis antes de validar
    pub fn normalized(self) -> Self {
        Self {
            immatriculation: normalize_identifier(&self.immatriculation),
            marque: self.marque.trim().to_string(),
            modele: self.modele.trim().to_string(),
            couleur: self.couleur.trim().to_string(),
            numero_chassis: normalize_identifier(&self.numero_chassis),
            ..self
        }
    }
}

impl From<CreateVehicleRequest> for NewVehicle {
    fn from(request: CreateVehicleRequest) -> Self {
        Self {
            immatriculation: request.immatriculation,
            marque: request.marque,
            modele: request.modele,
            couleur: request.couleur,
            numero_chassis: request.numero_chassis,
            date_immatriculation: request.date_immatriculation,
            date_expiration_assurance: request.date_expiration_assurance,
            date_expiration_controle_technique: request.date_expiration_controle_technique,
            date_expiration_vignette: request.date_expiration_vignette,
            date_expiration_stationnement: request.date_expiration_stationnement,
            kilometrage_actuel: request.kilometrage_actuel,
            kilometrage_dernier_entretien: request.kilometrage_dernier_entretien,
        }
    }
}

// Request para actualizar un vehículo (todos los campos opcionales)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 3, max = 20))]
    pub immatriculation: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub marque: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub modele: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub couleur: Option<String>,
    #[validate(length(min = 5, max = 50))]
    pub numero_chassis: Option<String>,
    pub date_expiration_assurance: Option<NaiveDate>,
    pub date_expiration_controle_technique: Option<NaiveDate>,
    pub date_expiration_vignette: Option<NaiveDate>,
    pub date_expiration_stationnement: Option<NaiveDate>,
    #[validate(range(min = 0))]
    pub kilometrage_actuel: Option<i32>,
    #[validate(range(min = 0))]
    pub kilometrage_dernier_entretien: Option<i32>,
}

impl UpdateVehicleRequest {
    pub fn normalized(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            immatriculation: self.immatriculation.as_deref().map(normalize_identifier),
            numero_chassis: self.numero_chassis.as_deref().map(normalize_identifier),
            marque: trim(self.marque),
            modele: trim(self.modele),
            couleur: trim(self.couleur),
            ..self
        }
    }
}

impl From<UpdateVehicleRequest> for VehiclePatch {
    fn from(request: UpdateVehicleRequest) -> Self {
        Self {
            immatriculation: request.immatriculation,
            marque: request.marque,
            modele: request.modele,
            couleur: request.couleur,
            numero_chassis: request.numero_chassis,
            date_expiration_assurance: request.date_expiration_assurance,
            date_expiration_controle_technique: request.date_expiration_controle_technique,
            date_expiration_vignette: request.date_expiration_vignette,
            date_expiration_stationnement: request.date_expiration_stationnement,
            kilometrage_actuel: request.kilometrage_actuel,
            kilometrage_dernier_entretien: request.kilometrage_dernier_entretien,
        }
    }
}

// Resumen de vehículo para listados
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub id: i32,
    pub immatriculation: String,
    pub marque: String,
    pub modele: String,
    pub couleur: String,
    pub nom_complet: String,
}

impl From<&Vehicle> for VehicleSummary {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id,
            immatriculation: vehicle.immatriculation.clone(),
            marque: vehicle.marque.clone(),
            modele: vehicle.modele.clone(),
            couleur: vehicle.couleur.clone(),
            nom_complet: vehicle.nom_complet(),
        }
    }
}

// Response del listado paginado
#[derive(Debug, Serialize)]
pub struct VehicleListResponse {
    pub vehicules: Vec<VehicleSummary>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub search: Option<String>,
}

// Response de estadísticas documentales de un vehículo
#[derive(Debug, Serialize)]
pub struct VehicleStatsResponse {
    pub vehicule_id: i32,
    pub immatriculation: String,
    pub statut: AlertLevel,
    pub kilometrage_actuel: i32,
    pub kilometrage_depuis_entretien: i32,
    pub jours_avant_expiration: BTreeMap<&'static str, i64>,
    pub alertes: Vec<String>,
    pub date_reference: NaiveDate,
}

impl VehicleStatsResponse {
    pub fn new(vehicle: &Vehicle, alerts: VehicleAlerts, as_of: NaiveDate) -> Self {
        Self {
            vehicule_id: vehicle.id,
            immatriculation: vehicle.immatriculation.clone(),
            statut: alerts.level,
            kilometrage_actuel: vehicle.kilometrage_actuel.unwrap_or(0),
            kilometrage_depuis_entretien: vehicle.kilometrage_depuis_entretien(),
            jours_avant_expiration: alerts
                .days_remaining
                .iter()
                .map(|(document, days)| (document.as_str(), *days))
                .collect(),
            alertes: alerts.alertes,
            date_reference: as_of,
        }
    }
}

// Response del resumen de alertas de toda la flota
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FleetSummaryResponse {
    pub total_vehicules: usize,
    pub vehicules_actifs: usize,
    pub vehicules_attention: usize,
    pub vehicules_alerte: usize,
    pub date_reference: NaiveDate,
}

impl FleetSummaryResponse {
    pub fn compute(vehicles: &[Vehicle], as_of: NaiveDate) -> Self {
        let mut summary = Self {
            total_vehicules: vehicles.len(),
            vehicules_actifs: 0,
            vehicules_attention: 0,
            vehicules_alerte: 0,
            date_reference: as_of,
        };

        for vehicle in vehicles {
            match vehicle.alert_status(as_of).level {
                AlertLevel::Active => summary.vehicules_actifs += 1,
                AlertLevel::Attention => summary.vehicules_attention += 1,
                AlertLevel::Expired => summary.vehicules_alerte += 1,
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::tests::sample_vehicle;
    use chrono::Duration;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn request() -> CreateVehicleRequest {
        serde_json::from_value(serde_json::json!({
            "immatriculation": "  abc-123 ",
            "marque": " Toyota",
            "modele": "Corolla",
            "couleur": "Blanc",
            "numero_chassis": "jtdbr32e720000001",
            "date_expiration_assurance": "2025-06-01",
            "date_expiration_controle_technique": "2025-06-01",
            "date_expiration_vignette": "2025-06-01",
            "date_expiration_stationnement": "2025-06-01"
        }))
        .unwrap()
    }

    #[test]
    fn test_create_request_is_normalized() {
        let request = request().normalized();
        assert_eq!(request.immatriculation, "ABC-123");
        assert_eq!(request.numero_chassis, "JTDBR32E720000001");
        assert_eq!(request.marque, "Toyota");
        assert_eq!(request.kilometrage_dernier_entretien, 0);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_short_plate_fails_validation() {
        let mut request = request();
        request.immatriculation = " ab ".to_string();
        let errors = request.normalized().validate().unwrap_err();
        assert!(errors.field_errors().contains_key("immatriculation"));
    }

    #[test]
    fn test_negative_odometer_fails_validation() {
        let update = UpdateVehicleRequest {
            kilometrage_actuel: Some(-1),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_fleet_summary_counts_each_level() {
        let healthy = sample_vehicle(as_of());
        let mut soon = sample_vehicle(as_of());
        soon.date_expiration_vignette = as_of() + Duration::days(20);
        let mut expired = sample_vehicle(as_of());
        expired.date_expiration_assurance = as_of() - Duration::days(2);

        let summary = FleetSummaryResponse::compute(&[healthy, soon, expired], as_of());
        assert_eq!(summary.total_vehicules, 3);
        assert_eq!(summary.vehicules_actifs, 1);
        assert_eq!(summary.vehicules_attention, 1);
        assert_eq!(summary.vehicules_alerte, 1);
    }

    #[test]
    fn test_stats_response_lists_days_per_document() {
        let mut vehicle = sample_vehicle(as_of());
        vehicle.date_expiration_assurance = as_of() + Duration::days(10);

        let response = VehicleStatsResponse::new(&vehicle, vehicle.alert_status(as_of()), as_of());
        assert_eq!(response.jours_avant_expiration.get("assurance"), Some(&10));
        assert_eq!(response.jours_avant_expiration.len(), 4);
        assert_eq!(response.kilometrage_depuis_entretien, 5_000);
        assert_eq!(response.statut, AlertLevel::Attention);
    }
}
