use std::sync::Arc;

use chrono::NaiveDate;

use crate::dto::driver_dto::{
    latest_vehicle_id, DriverDetailResponse, DriverListResponse, DriverMissionsResponse,
};
use crate::dto::vehicle_dto::VehicleSummary;
use crate::models::driver::Driver;
use crate::repositories::{DriverRepository, MissionRepository, VehicleRepository};
use crate::utils::errors::{not_found_error, AppResult};

/// El directorio de choferes es de solo lectura; el detalle cruza con
/// missions y vehículos.
pub struct DriverController {
    drivers: Arc<dyn DriverRepository>,
    missions: Arc<dyn MissionRepository>,
    vehicles: Arc<dyn VehicleRepository>,
}

impl DriverController {
    pub fn new(
        drivers: Arc<dyn DriverRepository>,
        missions: Arc<dyn MissionRepository>,
        vehicles: Arc<dyn VehicleRepository>,
    ) -> Self {
        Self {
            drivers,
            missions,
            vehicles,
        }
    }

    pub async fn list(&self) -> AppResult<DriverListResponse> {
        let mut chauffeurs = self.drivers.list().await?;
        chauffeurs.sort_by_key(|d| d.id);

        Ok(DriverListResponse {
            total: chauffeurs.len(),
            chauffeurs,
        })
    }

    async fn find(&self, id: i32) -> AppResult<Driver> {
        self.drivers
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Chauffeur", id))
    }

    pub async fn get_by_id(&self, id: i32, today: NaiveDate) -> AppResult<DriverDetailResponse> {
        let driver = self.find(id).await?;
        let missions = self.missions.find_by_driver(id).await?;

        let vehicule_attribue = match latest_vehicle_id(&missions) {
            Some(vehicle_id) => self
                .vehicles
                .find_by_id(vehicle_id)
                .await?
                .as_ref()
                .map(VehicleSummary::from),
            None => None,
        };

        Ok(DriverDetailResponse::new(driver, &missions, vehicule_attribue, today))
    }

    pub async fn missions(&self, id: i32) -> AppResult<DriverMissionsResponse> {
        self.find(id).await?;
        let missions = self.missions.find_by_driver(id).await?;
        Ok(DriverMissionsResponse::new(id, missions))
    }
}
