use async_trait::async_trait;
use sqlx::PgPool;

use super::DriverRepository;
use crate::models::driver::Driver;
use crate::utils::errors::AppResult;

const DRIVER_COLUMNS: &str =
    "id, nom, prenom, telephone, numero_permis, date_obtention_permis, statut";

pub struct PgDriverRepository {
    pool: PgPool,
}

impl PgDriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriverRepository for PgDriverRepository {
    async fn list(&self) -> AppResult<Vec<Driver>> {
        let drivers = sqlx::query_as::<_, Driver>(&format!(
            "SELECT {} FROM core_chauffeur ORDER BY nom, prenom",
            DRIVER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>(&format!(
            "SELECT {} FROM core_chauffeur WHERE id = $1",
            DRIVER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(driver)
    }

    async fn count(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM core_chauffeur")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
