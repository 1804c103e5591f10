use axum::{
    extract::State,
    http::{header, HeaderMap},
    Extension, Json,
};

use crate::dto::auth_dto::{CurrentUserResponse, LoginRequest, LoginResponse, LogoutResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::jwt::extract_token_from_header;

/// Endpoint de login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    Ok(Json(state.auth.login(payload).await?))
}

/// Endpoint de logout. El bearer es opcional.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<LogoutResponse> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| extract_token_from_header(value).ok());

    Json(state.auth.logout(token).await)
}

/// Usuario del token actual
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<CurrentUserResponse>> {
    Ok(Json(state.auth.current_user(&user.claims)?))
}
