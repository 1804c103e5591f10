//! Servicio de autenticación
//!
//! Verifica credenciales contra el `CredentialStore` inyectado, emite tokens
//! firmados y mantiene la lista de revocación del logout. La lista es local
//! al proceso y se purga de entradas ya expiradas en cada revocación.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};
use validator::Validate;

use crate::dto::auth_dto::{CurrentUserResponse, LoginRequest, LoginResponse, LogoutResponse};
use crate::models::auth::JwtClaims;
use crate::repositories::CredentialStore;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{expiry_of, generate_token, verify_token, JwtConfig};

pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    jwt: JwtConfig,
    /// jti revocado -> expiración del token
    revoked: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl AuthService {
    pub fn new(credentials: Arc<dyn CredentialStore>, jwt: JwtConfig) -> Self {
        Self {
            credentials,
            jwt,
            revoked: RwLock::new(HashMap::new()),
        }
    }

    /// Login: credenciales válidas -> token bearer
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        request.validate()?;

        let account = self
            .credentials
            .verify(&request.username, &request.password)
            .await?
            .ok_or_else(|| {
                warn!("🔒 Intento de login fallido para '{}'", request.username);
                AppError::Unauthorized("Nom d'utilisateur ou mot de passe incorrect".to_string())
            })?;

        let issued = generate_token(&account, &self.jwt)?;
        info!("🔑 Login de '{}' ({})", account.username, account.role.as_str());

        Ok(LoginResponse {
            expires_at: issued.expires_at(),
            access_token: issued.token,
            token_type: "bearer".to_string(),
            user_id: account.id,
            username: account.username,
        })
    }

    /// Verifica firma, expiración y revocación
    pub async fn authenticate(&self, token: &str) -> AppResult<JwtClaims> {
        let claims = verify_token(token, &self.jwt)?;

        if self.revoked.read().await.contains_key(&claims.jti) {
            return Err(AppError::Unauthorized("Token révoqué".to_string()));
        }

        Ok(claims)
    }

    pub fn current_user(&self, claims: &JwtClaims) -> AppResult<CurrentUserResponse> {
        let user_id = claims
            .sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Identifiant utilisateur invalide".to_string()))?;

        Ok(CurrentUserResponse {
            user_id,
            username: claims.username.clone(),
            role: claims.role,
            permissions: claims.role.permissions(),
        })
    }

    /// Revoca el token si es válido. Un token ausente o inválido no es un error.
    pub async fn logout(&self, token: Option<&str>) -> LogoutResponse {
        if let Some(claims) = token.and_then(|t| verify_token(t, &self.jwt).ok()) {
            let now = Utc::now();
            let mut revoked = self.revoked.write().await;
            revoked.retain(|_, expires_at| *expires_at > now);
            revoked.insert(claims.jti.clone(), expiry_of(&claims));
            info!("👋 Logout de '{}'", claims.username);
        }

        LogoutResponse {
            message: "Déconnexion réussie".to_string(),
        }
    }

    #[cfg(test)]
    async fn revoked_count(&self) -> usize {
        self.revoked.read().await.len()
    }
}
