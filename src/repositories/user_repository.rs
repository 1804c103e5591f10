//! Credenciales
//!
//! Dos fuentes de cuentas para el Access Gate: una cuenta única definida en la
//! configuración y la tabla legacy `core_utilisateur`. En ambas la contraseña
//! se compara contra un hash bcrypt, fuera del runtime async.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::info;

use super::CredentialStore;
use crate::config::EnvironmentConfig;
use crate::models::auth::{Account, UserRole};
use crate::utils::errors::{AppError, AppResult};

const DEV_ADMIN_PASSWORD: &str = "admin123";

/// bcrypt es costoso en CPU: se ejecuta en el pool de tareas bloqueantes
async fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let hash = hash.to_string();

    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Tarea de verificación abortada: {}", e)))?
        .map_err(|e| AppError::Hash(e.to_string()))
}

/// Cuenta de administración definida por ADMIN_USERNAME / ADMIN_PASSWORD_HASH
#[derive(Debug, Clone)]
pub struct ConfigCredentialStore {
    account: Account,
    password_hash: String,
}

impl ConfigCredentialStore {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            account: Account {
                id: 1,
                username: username.into(),
                role: UserRole::Admin,
            },
            password_hash: password_hash.into(),
        }
    }

    /// Sin hash configurado se usa `admin123`, solo en desarrollo
    pub fn from_config(config: &EnvironmentConfig) -> AppResult<Self> {
        let password_hash = match &config.admin_password_hash {
            Some(hash) => hash.clone(),
            None if !config.is_development() => {
                return Err(AppError::Internal(format!(
                    "ADMIN_PASSWORD_HASH requis en environnement '{}'",
                    config.environment
                )));
            }
            None => {
                info!(
                    "🔑 ADMIN_PASSWORD_HASH no definido, usando contraseña de desarrollo para '{}'",
                    config.admin_username
                );
                bcrypt::hash(DEV_ADMIN_PASSWORD, bcrypt::DEFAULT_COST)
                    .map_err(|e| AppError::Hash(e.to_string()))?
            }
        };

        Ok(Self::new(config.admin_username.clone(), password_hash))
    }
}

#[async_trait]
impl CredentialStore for ConfigCredentialStore {
    async fn verify(&self, username: &str, password: &str) -> AppResult<Option<Account>> {
        if username != self.account.username {
            return Ok(None);
        }

        if verify_password(password, &self.password_hash).await? {
            Ok(Some(self.account.clone()))
        } else {
            Ok(None)
        }
    }
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    id: i32,
    username: String,
    role: Option<String>,
    password_hash: Option<String>,
}

/// Cuentas activas de `core_utilisateur` con hash bcrypt propio
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn verify(&self, username: &str, password: &str) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT id, username, role, password_hash
            FROM core_utilisateur
            WHERE username = $1 AND is_active
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let Some(hash) = row.password_hash.as_deref() else {
            return Ok(None);
        };

        if !verify_password(password, hash).await? {
            return Ok(None);
        }

        Ok(Some(Account {
            id: row.id,
            username: row.username,
            role: UserRole::from_db(row.role.as_deref()),
        }))
    }
}
