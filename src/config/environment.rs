//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;

const DEV_JWT_SECRET: &str = "ipsco-dev-secret-change-in-production";

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    /// Sin URL la API arranca en modo demostración (almacenamiento en memoria)
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub admin_username: String,
    pub admin_password_hash: Option<String>,
}

impl Default for EnvironmentConfig {
    /// Valores de desarrollo, sin leer el entorno
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 8000,
            host: "0.0.0.0".to_string(),
            database_url: None,
            db_max_connections: 20,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiration: 86_400,
            cors_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
            admin_username: "admin".to_string(),
            admin_password_hash: None,
        }
    }
}

impl EnvironmentConfig {
    /// Construye la configuración desde las variables de entorno
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables inyectable
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let config = Self {
            port: parse_or(&var, "PORT", defaults.port)?,
            host: var("HOST").unwrap_or(defaults.host),
            database_url: var("DATABASE_URL"),
            db_max_connections: parse_or(&var, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            jwt_secret: var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_expiration: parse_or(&var, "JWT_EXPIRATION", defaults.jwt_expiration)?,
            cors_origins: var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            request_timeout_secs: parse_or(
                &var,
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            admin_username: var("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_password_hash: var("ADMIN_PASSWORD_HASH"),
            environment: var("ENVIRONMENT").unwrap_or(defaults.environment),
        };

        config.validate()?;
        Ok(config)
    }

    /// En producción los secretos de desarrollo no son aceptables
    fn validate(&self) -> Result<()> {
        if !self.is_production() {
            return Ok(());
        }
        if self.jwt_secret == DEV_JWT_SECRET {
            bail!("JWT_SECRET must be set in production");
        }
        if self.admin_password_hash.is_none() {
            bail!("ADMIN_PASSWORD_HASH must be set in production");
        }
        Ok(())
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// CORS abierto cuando la lista contiene `*`
    pub fn cors_is_permissive(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a valid number, got '{}'", key, raw)),
        None => Ok(default),
    }
}
