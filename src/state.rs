//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Los repositorios son trait objects para que
//! el mismo router funcione sobre PostgreSQL o sobre el store en memoria.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::database::ping;
use crate::repositories::{
    ConfigCredentialStore, CredentialStore, DriverRepository, MemoryStore, MissionRepository,
    PgCredentialStore, PgDriverRepository, PgMissionRepository, PgVehicleRepository,
    VehicleRepository,
};
use crate::services::auth_service::AuthService;
use crate::utils::errors::AppResult;
use crate::utils::jwt::JwtConfig;

/// Almacenamiento activo
#[derive(Clone)]
pub enum StorageBackend {
    Postgres(PgPool),
    Memory,
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Postgres(_) => "postgresql",
            StorageBackend::Memory => "memoire (demo)",
        }
    }

    /// Estado de la conexión para el health check
    pub async fn health(&self) -> String {
        match self {
            StorageBackend::Postgres(pool) => match ping(pool).await {
                Ok(()) => "connected".to_string(),
                Err(e) => format!("error: {}", e),
            },
            StorageBackend::Memory => "in-memory".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub storage: StorageBackend,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub drivers: Arc<dyn DriverRepository>,
    pub missions: Arc<dyn MissionRepository>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Estado sobre PostgreSQL. Las cuentas salen de `core_utilisateur`.
    pub fn postgres(pool: PgPool, config: EnvironmentConfig) -> Self {
        let credentials: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(pool.clone()));
        Self {
            auth: Arc::new(AuthService::new(credentials, JwtConfig::from(&config))),
            vehicles: Arc::new(PgVehicleRepository::new(pool.clone())),
            drivers: Arc::new(PgDriverRepository::new(pool.clone())),
            missions: Arc::new(PgMissionRepository::new(pool.clone())),
            storage: StorageBackend::Postgres(pool),
            config,
        }
    }

    /// Estado sobre el store en memoria, con la cuenta admin de la configuración
    pub fn memory(store: MemoryStore, config: EnvironmentConfig) -> AppResult<Self> {
        let credentials = ConfigCredentialStore::from_config(&config)?;
        Ok(Self::with_parts(store, Arc::new(credentials), config))
    }

    /// Store en memoria con un `CredentialStore` arbitrario
    pub fn with_parts(
        store: MemoryStore,
        credentials: Arc<dyn CredentialStore>,
        config: EnvironmentConfig,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(credentials, JwtConfig::from(&config))),
            vehicles: Arc::new(store.clone()),
            drivers: Arc::new(store.clone()),
            missions: Arc::new(store),
            storage: StorageBackend::Memory,
            config,
        }
    }
}
