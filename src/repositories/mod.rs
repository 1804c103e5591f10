//! Repositorios
//!
//! Cada recurso se accede a través de un trait, con una implementación
//! PostgreSQL (base compartida con el legacy) y una en memoria para el modo
//! demostración y los tests. Las restricciones de integridad (unicidad,
//! referencias) las aplica el almacenamiento, no el controlador.

pub mod driver_repository;
pub mod memory_repository;
pub mod mission_repository;
pub mod user_repository;
pub mod vehicle_repository;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::auth::Account;
use crate::models::driver::Driver;
use crate::models::mission::{Mission, MissionFilters, MissionPatch, MissionStats, NewMission};
use crate::models::vehicle::{NewVehicle, Vehicle, VehiclePatch, VehicleSearch};
use crate::utils::errors::{bad_request_error, AppError, AppResult};

pub use driver_repository::PgDriverRepository;
pub use memory_repository::MemoryStore;
pub use mission_repository::PgMissionRepository;
pub use user_repository::{ConfigCredentialStore, PgCredentialStore};
pub use vehicle_repository::PgVehicleRepository;

/// Ventana de paginación (offset/limit ya validados)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    /// Número de página derivado: offset / limit + 1
    pub fn number(&self) -> i64 {
        self.offset / self.limit.max(1) + 1
    }

    /// Recorta un resultado ya filtrado
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset.max(0) as usize)
            .take(self.limit.max(0) as usize)
            .cloned()
            .collect()
    }
}

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Vehículos filtrados y paginados, con el total previo a la paginación
    async fn list(&self, search: &VehicleSearch, page: Page) -> AppResult<(Vec<Vehicle>, i64)>;
    async fn all(&self) -> AppResult<Vec<Vehicle>>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Vehicle>>;
    /// `Conflict` si la matrícula o el chasis ya existen
    async fn create(&self, data: NewVehicle) -> AppResult<Vehicle>;
    async fn update(&self, id: i32, patch: VehiclePatch) -> AppResult<Vehicle>;
    /// `Conflict` si alguna mission lo referencia
    async fn delete(&self, id: i32) -> AppResult<()>;
    async fn count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Driver>>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Driver>>;
    async fn count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait MissionRepository: Send + Sync {
    async fn list(&self, filters: &MissionFilters, page: Page) -> AppResult<(Vec<Mission>, i64)>;
    /// Agregados del dashboard a la fecha dada
    async fn dashboard_stats(&self, as_of: NaiveDate) -> AppResult<MissionStats>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Mission>>;
    async fn find_by_driver(&self, driver_id: i32) -> AppResult<Vec<Mission>>;
    /// Id asignado por un contador monótono: nunca se reutiliza
    async fn create(&self, data: NewMission) -> AppResult<Mission>;
    /// Read-merge-write atómico. Devuelve (antes, después).
    async fn update(&self, id: i32, patch: MissionPatch) -> AppResult<(Mission, Mission)>;
    async fn delete(&self, id: i32) -> AppResult<Mission>;
}

/// Verificación de credenciales inyectable en el Access Gate
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> AppResult<Option<Account>>;
}

/// Traduce violaciones de restricciones de PostgreSQL a errores del dominio.
///
/// `on_reference` decide qué error produce una violación de clave foránea:
/// en escrituras de missions es un argumento inválido, al borrar un
/// vehículo es un conflicto.
pub(crate) fn map_constraint_error(
    e: sqlx::Error,
    on_reference: fn(&str) -> AppError,
) -> AppError {
    if let Some(db_error) = e.as_database_error() {
        let constraint = db_error.constraint().unwrap_or_default().to_string();
        match db_error.code().as_deref() {
            Some("23505") => {
                let field = if constraint.contains("chassis") {
                    "numéro de châssis"
                } else {
                    "immatriculation"
                };
                return AppError::Conflict(format!("Un véhicule avec ce {} existe déjà", field));
            }
            Some("23503") => return on_reference(&constraint),
            Some("23514") => {
                return bad_request_error(&format!("Contrainte non respectée: {}", constraint))
            }
            _ => {}
        }
    }
    AppError::Database(e)
}

/// Escapa `%`, `_` y `\` para usar un término dentro de un patrón ILIKE
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
