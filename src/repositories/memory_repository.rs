//! Almacenamiento en memoria
//!
//! Implementa los tres repositorios sobre un único estado protegido por un
//! `RwLock`, de modo que las comprobaciones de unicidad y de referencias se
//! hacen bajo el mismo lock que la escritura. Se usa en modo demostración
//! (sin DATABASE_URL) y en los tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use tokio::sync::RwLock;

use super::{DriverRepository, MissionRepository, Page, VehicleRepository};
use crate::models::driver::Driver;
use crate::models::mission::{
    Mission, MissionFilters, MissionPatch, MissionStats, MissionStatus, NewMission,
};
use crate::models::vehicle::{NewVehicle, Vehicle, VehiclePatch, VehicleSearch};
use crate::utils::errors::{
    bad_request_error, conflict_error, not_found_error, AppError, AppResult,
};

#[derive(Debug, Default)]
struct MemoryState {
    vehicles: BTreeMap<i32, Vehicle>,
    drivers: BTreeMap<i32, Driver>,
    missions: BTreeMap<i32, Mission>,
    last_vehicle_id: i32,
    last_mission_id: i32,
}

impl MemoryState {
    fn check_unique(&self, except: Option<i32>, plate: &str, chassis: &str) -> AppResult<()> {
        let others = self.vehicles.values().filter(|v| Some(v.id) != except);
        for vehicle in others {
            if vehicle.immatriculation == plate {
                return Err(conflict_error("Véhicule", "immatriculation", plate));
            }
            if vehicle.numero_chassis == chassis {
                return Err(conflict_error("Véhicule", "numéro de châssis", chassis));
            }
        }
        Ok(())
    }

    fn check_references(
        &self,
        vehicule_id: Option<i32>,
        chauffeur_id: Option<i32>,
    ) -> AppResult<()> {
        if let Some(id) = vehicule_id {
            if !self.vehicles.contains_key(&id) {
                return Err(bad_request_error(&format!("Véhicule {} inexistant", id)));
            }
        }
        if let Some(id) = chauffeur_id {
            if !self.drivers.contains_key(&id) {
                return Err(bad_request_error(&format!("Chauffeur {} inexistant", id)));
            }
        }
        Ok(())
    }
}

/// Store en memoria compartible entre handlers (clonar es barato)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carga un chofer. El directorio es de solo lectura desde la API,
    /// así que los choferes se siembran por aquí.
    pub async fn seed_driver(&self, driver: Driver) {
        let mut state = self.state.write().await;
        state.drivers.insert(driver.id, driver);
    }

    /// Store con los datos de demostración del parque IPSCO
    pub async fn with_demo_data(today: NaiveDate) -> AppResult<Self> {
        let store = Self::new();

        for driver in demo_drivers() {
            store.seed_driver(driver).await;
        }
        for vehicle in demo_vehicles(today) {
            VehicleRepository::create(&store, vehicle).await?;
        }
        for (mission, statut, distance) in demo_missions(today) {
            let created = MissionRepository::create(&store, mission).await?;
            MissionRepository::update(
                &store,
                created.id,
                MissionPatch {
                    statut: Some(statut),
                    distance_parcourue: Some(distance),
                    ..Default::default()
                },
            )
            .await?;
        }

        Ok(store)
    }
}

#[async_trait]
impl VehicleRepository for MemoryStore {
    async fn list(&self, search: &VehicleSearch, page: Page) -> AppResult<(Vec<Vehicle>, i64)> {
        let state = self.state.read().await;
        let matching: Vec<Vehicle> = state
            .vehicles
            .values()
            .filter(|v| search.matches(v))
            .cloned()
            .collect();
        Ok((page.slice(&matching), matching.len() as i64))
    }

    async fn all(&self) -> AppResult<Vec<Vehicle>> {
        Ok(self.state.read().await.vehicles.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Vehicle>> {
        Ok(self.state.read().await.vehicles.get(&id).cloned())
    }

    async fn create(&self, data: NewVehicle) -> AppResult<Vehicle> {
        let mut state = self.state.write().await;
        state.check_unique(None, &data.immatriculation, &data.numero_chassis)?;

        state.last_vehicle_id += 1;
        let vehicle = Vehicle::from_new(state.last_vehicle_id, data, Utc::now());
        state.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn update(&self, id: i32, patch: VehiclePatch) -> AppResult<Vehicle> {
        let mut state = self.state.write().await;
        let mut vehicle = state
            .vehicles
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found_error("Véhicule", id))?;

        vehicle.apply(patch, Utc::now());
        state.check_unique(Some(id), &vehicle.immatriculation, &vehicle.numero_chassis)?;
        state.vehicles.insert(id, vehicle.clone());
        Ok(vehicle)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.vehicles.contains_key(&id) {
            return Err(not_found_error("Véhicule", id));
        }

        let referenced = state
            .missions
            .values()
            .filter(|m| m.vehicule_id == Some(id))
            .count();
        if referenced > 0 {
            return Err(AppError::Conflict(format!(
                "Véhicule {} référencé par {} mission(s)",
                id, referenced
            )));
        }

        state.vehicles.remove(&id);
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.read().await.vehicles.len() as i64)
    }
}

#[async_trait]
impl DriverRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Driver>> {
        Ok(self.state.read().await.drivers.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Driver>> {
        Ok(self.state.read().await.drivers.get(&id).cloned())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.read().await.drivers.len() as i64)
    }
}

#[async_trait]
impl MissionRepository for MemoryStore {
    async fn list(&self, filters: &MissionFilters, page: Page) -> AppResult<(Vec<Mission>, i64)> {
        let state = self.state.read().await;
        let matching: Vec<Mission> = state
            .missions
            .values()
            .filter(|m| filters.matches(m))
            .cloned()
            .collect();
        Ok((page.slice(&matching), matching.len() as i64))
    }

    async fn dashboard_stats(&self, as_of: NaiveDate) -> AppResult<MissionStats> {
        let state = self.state.read().await;
        let missions: Vec<Mission> = state.missions.values().cloned().collect();
        Ok(MissionStats::compute(&missions, as_of))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Mission>> {
        Ok(self.state.read().await.missions.get(&id).cloned())
    }

    async fn find_by_driver(&self, driver_id: i32) -> AppResult<Vec<Mission>> {
        Ok(self
            .state
            .read()
            .await
            .missions
            .values()
            .filter(|m| m.chauffeur_id == Some(driver_id))
            .cloned()
            .collect())
    }

    async fn create(&self, data: NewMission) -> AppResult<Mission> {
        let mut state = self.state.write().await;
        state.check_references(data.vehicule_id, data.chauffeur_id)?;

        state.last_mission_id += 1;
        let mission = Mission::from_new(state.last_mission_id, data, Utc::now());
        state.missions.insert(mission.id, mission.clone());
        Ok(mission)
    }

    async fn update(&self, id: i32, patch: MissionPatch) -> AppResult<(Mission, Mission)> {
        let mut state = self.state.write().await;
        let previous = state
            .missions
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found_error("Mission", id))?;
        state.check_references(patch.assigned_vehicle(), patch.assigned_driver())?;

        let mut current = previous.clone();
        current.apply(patch, Utc::now());
        state.missions.insert(id, current.clone());
        Ok((previous, current))
    }

    async fn delete(&self, id: i32) -> AppResult<Mission> {
        self.state
            .write()
            .await
            .missions
            .remove(&id)
            .ok_or_else(|| not_found_error("Mission", id))
    }
}

fn demo_drivers() -> Vec<Driver> {
    let driver = |id: i32,
                  prenom: &str,
                  nom: &str,
                  telephone: &str,
                  permis: &str,
                  statut: &str| Driver {
        id,
        nom: nom.to_string(),
        prenom: prenom.to_string(),
        telephone: telephone.to_string(),
        numero_permis: permis.to_string(),
        date_obtention_permis: NaiveDate::from_ymd_opt(2018, 3, 15),
        statut: statut.to_string(),
    };

    vec![
        driver(1, "Jean", "Mukadi", "+243990123456", "LBB123456", "actif"),
        driver(2, "Marie", "Kasongo", "+243991234567", "LBB789012", "actif"),
        driver(3, "Paul", "Tshimanga", "+243992345678", "LBB345678", "repos"),
    ]
}

fn demo_vehicles(today: NaiveDate) -> Vec<NewVehicle> {
    let in_days = |days: i64| today + Duration::days(days);
    let vehicle = |plate: &str,
                   marque: &str,
                   modele: &str,
                   couleur: &str,
                   chassis: &str| NewVehicle {
        immatriculation: plate.to_string(),
        marque: marque.to_string(),
        modele: modele.to_string(),
        couleur: couleur.to_string(),
        numero_chassis: chassis.to_string(),
        date_immatriculation: None,
        date_expiration_assurance: in_days(200),
        date_expiration_controle_technique: in_days(200),
        date_expiration_vignette: in_days(200),
        date_expiration_stationnement: in_days(200),
        kilometrage_actuel: Some(45_000),
        kilometrage_dernier_entretien: 40_000,
    };

    let mut corolla = vehicle("ABC-123", "Toyota", "Corolla", "Blanc", "JTDBR32E720000001");
    corolla.date_expiration_assurance = in_days(15);

    let civic = vehicle("DEF-456", "Honda", "Civic", "Bleu", "SHHFK7H50KU000002");

    let mut sentra = vehicle("GHI-789", "Nissan", "Sentra", "Rouge", "3N1AB7AP5KY000003");
    sentra.date_expiration_controle_technique = in_days(-5);

    vec![corolla, civic, sentra]
}

fn demo_missions(today: NaiveDate) -> Vec<(NewMission, MissionStatus, i32)> {
    let mission = |destination: &str,
                   depart: &str,
                   day_offset: i64,
                   horaires: (&str, &str),
                   assignment: Option<i32>,
                   demandeur: i32,
                   observations: &str| NewMission {
        destination: destination.to_string(),
        lieu_depart: Some(depart.to_string()),
        date_souhaitee: today + Duration::days(day_offset),
        heure_depart: Some(horaires.0.to_string()),
        heure_retour: Some(horaires.1.to_string()),
        vehicule_id: assignment,
        chauffeur_id: assignment,
        demandeur_id: Some(demandeur),
        observations: Some(observations.to_string()),
    };

    vec![
        (
            mission(
                "Lubumbashi Centre-Ville",
                "Bureau IPSCO",
                0,
                ("08:30", "17:00"),
                Some(1),
                2,
                "Mission urgente - Transport documents importants",
            ),
            MissionStatus::InProgress,
            25,
        ),
        (
            mission(
                "Aéroport International Luano",
                "Hôtel Lubumbashi",
                0,
                ("14:00", "16:30"),
                Some(2),
                3,
                "Transport VIP - Ponctualité requise",
            ),
            MissionStatus::Completed,
            45,
        ),
        (
            mission(
                "Université de Lubumbashi",
                "Bureau IPSCO",
                1,
                ("09:00", "12:00"),
                Some(3),
                4,
                "Mission formation - Matériel pédagogique à transporter",
            ),
            MissionStatus::Scheduled,
            0,
        ),
        (
            mission(
                "Clinique Bondeko",
                "Résidence Personnel",
                1,
                ("07:00", "08:00"),
                None,
                5,
                "Urgence médicale - Priorité absolue",
            ),
            MissionStatus::Pending,
            0,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mission::StatusFilter;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn new_vehicle(plate: &str, chassis: &str) -> NewVehicle {
        NewVehicle {
            immatriculation: plate.to_string(),
            marque: "Toyota".to_string(),
            modele: "Hilux".to_string(),
            couleur: "Gris".to_string(),
            numero_chassis: chassis.to_string(),
            date_immatriculation: None,
            date_expiration_assurance: today(),
            date_expiration_controle_technique: today(),
            date_expiration_vignette: today(),
            date_expiration_stationnement: today(),
            kilometrage_actuel: None,
            kilometrage_dernier_entretien: 0,
        }
    }

    fn new_mission(destination: &str) -> NewMission {
        NewMission {
            destination: destination.to_string(),
            lieu_depart: None,
            date_souhaitee: today(),
            heure_depart: None,
            heure_retour: None,
            vehicule_id: None,
            chauffeur_id: None,
            demandeur_id: None,
            observations: None,
        }
    }

    #[tokio::test]
    async fn test_demo_data_is_loaded() {
        let store = MemoryStore::with_demo_data(today()).await.unwrap();
        assert_eq!(VehicleRepository::count(&store).await.unwrap(), 3);
        assert_eq!(DriverRepository::count(&store).await.unwrap(), 3);
        let stats = MissionRepository::dashboard_stats(&store, today()).await.unwrap();
        assert_eq!(stats.total_missions, 4);
    }

    #[tokio::test]
    async fn test_duplicate_plate_is_conflict_and_registry_unchanged() {
        let store = MemoryStore::new();
        VehicleRepository::create(&store, new_vehicle("ABC-123", "CHASSIS01"))
            .await
            .unwrap();

        let result = VehicleRepository::create(&store, new_vehicle("ABC-123", "CHASSIS02")).await;
        let expected = "Véhicule avec immatriculation 'ABC-123' existe déjà";
        assert!(matches!(result, Err(AppError::Conflict(ref m)) if m == expected));
        assert_eq!(VehicleRepository::count(&store).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_chassis_on_update_is_conflict() {
        let store = MemoryStore::new();
        VehicleRepository::create(&store, new_vehicle("AAA-111", "CHASSIS01")).await.unwrap();
        let second = VehicleRepository::create(&store, new_vehicle("BBB-222", "CHASSIS02"))
            .await
            .unwrap();

        let patch = VehiclePatch {
            numero_chassis: Some("CHASSIS01".to_string()),
            ..Default::default()
        };
        let result = VehicleRepository::update(&store, second.id, patch).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let unchanged = VehicleRepository::find_by_id(&store, second.id).await.unwrap().unwrap();
        assert_eq!(unchanged.numero_chassis, "CHASSIS02");
    }

    #[tokio::test]
    async fn test_mission_ids_are_never_reused() {
        let store = MemoryStore::new();
        let first = MissionRepository::create(&store, new_mission("A")).await.unwrap();
        let second = MissionRepository::create(&store, new_mission("B")).await.unwrap();
        MissionRepository::delete(&store, second.id).await.unwrap();

        let third = MissionRepository::create(&store, new_mission("C")).await.unwrap();
        assert!(second.id > first.id);
        assert!(third.id > second.id);
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_ids() {
        let store = MemoryStore::new();
        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    MissionRepository::create(&store, new_mission(&format!("M{}", i)))
                        .await
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[tokio::test]
    async fn test_mission_references_must_exist() {
        let store = MemoryStore::new();
        let mut data = new_mission("A");
        data.vehicule_id = Some(99);

        let result = MissionRepository::create(&store, data).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
        let filters = MissionFilters::default();
        let (missions, total) = MissionRepository::list(&store, &filters, Page::new(0, 10))
            .await
            .unwrap();
        assert!(missions.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_referenced_vehicle_cannot_be_deleted() {
        let store = MemoryStore::with_demo_data(today()).await.unwrap();

        let result = VehicleRepository::delete(&store, 1).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert!(VehicleRepository::find_by_id(&store, 1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_reports_total_before_pagination() {
        let store = MemoryStore::with_demo_data(today()).await.unwrap();
        let filters = MissionFilters {
            statut: StatusFilter::Any,
            ..Default::default()
        };

        let (page, total) = MissionRepository::list(&store, &filters, Page::new(1, 2))
            .await
            .unwrap();
        assert_eq!(total, 4);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, 2);
    }

    #[tokio::test]
    async fn test_update_returns_previous_and_current() {
        let store = MemoryStore::with_demo_data(today()).await.unwrap();
        let patch = MissionPatch {
            statut: Some(MissionStatus::Cancelled),
            ..Default::default()
        };

        let (previous, current) = MissionRepository::update(&store, 4, patch).await.unwrap();
        assert_eq!(previous.statut, MissionStatus::Pending);
        assert_eq!(current.statut, MissionStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_find_by_driver() {
        let store = MemoryStore::with_demo_data(today()).await.unwrap();
        let missions = store.find_by_driver(2).await.unwrap();
        assert_eq!(missions.len(), 1);
        assert_eq!(missions[0].distance_parcourue, 45);
    }
}
