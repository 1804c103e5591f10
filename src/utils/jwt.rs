//! Utilidades JWT
//!
//! Emisión y verificación de tokens HS256. Cada token lleva un `jti` único
//! para poder revocarlo en el logout.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    config::environment::EnvironmentConfig,
    models::auth::{Account, JwtClaims},
    utils::errors::AppError,
};

/// Configuración de JWT
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration: u64,
}

impl From<&EnvironmentConfig> for JwtConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration: config.jwt_expiration,
        }
    }
}

/// Token emitido junto con sus claims
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: JwtClaims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        expiry_of(&self.claims)
    }
}

/// Generar JWT token para una cuenta verificada
pub fn generate_token(account: &Account, config: &JwtConfig) -> Result<IssuedToken, AppError> {
    let now = Utc::now();
    let expires_at = now + Duration::seconds(config.expiration as i64);

    let claims = JwtClaims {
        sub: account.id.to_string(),
        username: account.username.clone(),
        role: account.role,
        jti: Uuid::new_v4().to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let encoding_key = EncodingKey::from_secret(config.secret.as_ref());
    let token = encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
        .map_err(|e| AppError::Jwt(format!("Error generando token: {}", e)))?;

    Ok(IssuedToken { token, claims })
}

/// Verificar firma y expiración
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<JwtClaims, AppError> {
    let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let token_data = decode::<JwtClaims>(token, &decoding_key, &validation)
        .map_err(|e| AppError::Jwt(format!("Token inválido: {}", e)))?;

    Ok(token_data.claims)
}

/// Instante de expiración de un token
pub fn expiry_of(claims: &JwtClaims) -> DateTime<Utc> {
    Utc.timestamp_opt(claims.exp, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Extraer token del header Authorization
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .ok_or_else(|| {
            AppError::Jwt("Header Authorization debe comenzar con 'Bearer '".to_string())
        })?
        .trim();

    if token.is_empty() {
        return Err(AppError::Jwt("Token no puede estar vacío".to_string()));
    }

    Ok(token)
}
