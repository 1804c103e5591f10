use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::auth::UserRole;

// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: i32,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

// Usuario autenticado (`/auth/me`)
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
    pub permissions: Vec<String>,
}

// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}
