use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::{like_pattern, map_constraint_error, Page, VehicleRepository};
use crate::models::vehicle::{NewVehicle, Vehicle, VehiclePatch, VehicleSearch};
use crate::utils::errors::{bad_request_error, not_found_error, AppError, AppResult};

const VEHICLE_COLUMNS: &str = "id, immatriculation, marque, modele, couleur, numero_chassis, \
     date_immatriculation, date_expiration_assurance, date_expiration_controle_technique, \
     date_expiration_vignette, date_expiration_stationnement, kilometrage_actuel, \
     kilometrage_dernier_entretien, date_creation, date_modification";

const SEARCH_CLAUSE: &str = "($1::text IS NULL \
     OR immatriculation ILIKE $1 OR marque ILIKE $1 OR modele ILIKE $1)";

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn list(&self, search: &VehicleSearch, page: Page) -> AppResult<(Vec<Vehicle>, i64)> {
        let pattern = search.term().map(|t| like_pattern(&t));

        let vehicles = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM core_vehicule WHERE {} ORDER BY id OFFSET $2 LIMIT $3",
            VEHICLE_COLUMNS, SEARCH_CLAUSE
        ))
        .bind(&pattern)
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM core_vehicule WHERE {}",
            SEARCH_CLAUSE
        ))
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((vehicles, total))
    }

    async fn all(&self) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM core_vehicule ORDER BY id",
            VEHICLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM core_vehicule WHERE id = $1",
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    async fn create(&self, data: NewVehicle) -> AppResult<Vehicle> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            r#"
            INSERT INTO core_vehicule (
                immatriculation, marque, modele, couleur, numero_chassis,
                date_immatriculation, date_expiration_assurance,
                date_expiration_controle_technique, date_expiration_vignette,
                date_expiration_stationnement, kilometrage_actuel,
                kilometrage_dernier_entretien, date_creation
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        ))
        .bind(&data.immatriculation)
        .bind(&data.marque)
        .bind(&data.modele)
        .bind(&data.couleur)
        .bind(&data.numero_chassis)
        .bind(data.date_immatriculation)
        .bind(data.date_expiration_assurance)
        .bind(data.date_expiration_controle_technique)
        .bind(data.date_expiration_vignette)
        .bind(data.date_expiration_stationnement)
        .bind(data.kilometrage_actuel)
        .bind(data.kilometrage_dernier_entretien)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, bad_request_error))?;

        Ok(vehicle)
    }

    async fn update(&self, id: i32, patch: VehiclePatch) -> AppResult<Vehicle> {
        let mut tx = self.pool.begin().await?;

        let mut vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM core_vehicule WHERE id = $1 FOR UPDATE",
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found_error("Véhicule", id))?;

        vehicle.apply(patch, Utc::now());

        let updated = sqlx::query_as::<_, Vehicle>(&format!(
            r#"
            UPDATE core_vehicule
            SET immatriculation = $2, marque = $3, modele = $4, couleur = $5,
                numero_chassis = $6, date_expiration_assurance = $7,
                date_expiration_controle_technique = $8, date_expiration_vignette = $9,
                date_expiration_stationnement = $10, kilometrage_actuel = $11,
                kilometrage_dernier_entretien = $12, date_modification = $13
            WHERE id = $1
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .bind(&vehicle.immatriculation)
        .bind(&vehicle.marque)
        .bind(&vehicle.modele)
        .bind(&vehicle.couleur)
        .bind(&vehicle.numero_chassis)
        .bind(vehicle.date_expiration_assurance)
        .bind(vehicle.date_expiration_controle_technique)
        .bind(vehicle.date_expiration_vignette)
        .bind(vehicle.date_expiration_stationnement)
        .bind(vehicle.kilometrage_actuel)
        .bind(vehicle.kilometrage_dernier_entretien)
        .bind(vehicle.date_modification)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_error(e, bad_request_error))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let deleted: Option<(i32,)> =
            sqlx::query_as("DELETE FROM core_vehicule WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    map_constraint_error(e, |_| {
                        AppError::Conflict(
                            "Véhicule référencé par des missions, suppression impossible"
                                .to_string(),
                        )
                    })
                })?;

        deleted.map(|_| ()).ok_or_else(|| not_found_error("Véhicule", id))
    }

    async fn count(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM core_vehicule")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
