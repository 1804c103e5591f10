use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use validator::Validate;

use crate::dto::vehicle_dto::{
    CreateVehicleRequest, FleetSummaryResponse, UpdateVehicleRequest, VehicleListQuery,
    VehicleListResponse, VehicleStatsResponse, VehicleSummary,
};
use crate::models::vehicle::{Vehicle, VehicleSearch};
use crate::repositories::{Page, VehicleRepository};
use crate::utils::errors::{not_found_error, AppResult};

pub struct VehicleController {
    repository: Arc<dyn VehicleRepository>,
}

impl VehicleController {
    pub fn new(repository: Arc<dyn VehicleRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: VehicleListQuery) -> AppResult<VehicleListResponse> {
        query.validate()?;

        let page = Page::new(query.skip, query.limit);
        let search = VehicleSearch {
            search: query.search.clone(),
        };
        let (vehicles, total) = self.repository.list(&search, page).await?;

        Ok(VehicleListResponse {
            vehicules: vehicles.iter().map(VehicleSummary::from).collect(),
            total,
            page: page.number(),
            per_page: page.limit,
            search: query.search,
        })
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Vehicle> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Véhicule", id))
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> AppResult<Vehicle> {
        let request = request.normalized();
        request.validate()?;

        let vehicle = self.repository.create(request.into()).await?;
        info!("🚗 Véhicule créé: {} (id {})", vehicle.nom_complet(), vehicle.id);
        Ok(vehicle)
    }

    pub async fn update(&self, id: i32, request: UpdateVehicleRequest) -> AppResult<Vehicle> {
        let request = request.normalized();
        request.validate()?;

        let vehicle = self.repository.update(id, request.into()).await?;
        info!("🚗 Véhicule {} mis à jour", vehicle.id);
        Ok(vehicle)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.delete(id).await?;
        info!("🗑️ Véhicule {} supprimé", id);
        Ok(())
    }

    pub async fn stats(&self, id: i32, as_of: NaiveDate) -> AppResult<VehicleStatsResponse> {
        let vehicle = self.get_by_id(id).await?;
        let alerts = vehicle.alert_status(as_of);
        Ok(VehicleStatsResponse::new(&vehicle, alerts, as_of))
    }

    pub async fn fleet_summary(&self, as_of: NaiveDate) -> AppResult<FleetSummaryResponse> {
        let vehicles = self.repository.all().await?;
        Ok(FleetSummaryResponse::compute(&vehicles, as_of))
    }
}
