//! Middleware de autenticación JWT
//!
//! Extrae el bearer del header Authorization, lo verifica contra el
//! `AuthService` (firma, expiración, revocación) e inyecta el usuario
//! autenticado en las extensions de la request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{
    models::auth::JwtClaims,
    state::AppState,
    utils::{errors::AppError, jwt::extract_token_from_header},
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: JwtClaims,
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token d'autorisation requis".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = state.auth.authenticate(token).await?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { claims });

    Ok(next.run(request).await)
}
