use serde::{Deserialize, Serialize};

/// Roles del sistema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Dispatcher,
    Lecteur,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Dispatcher => "dispatcher",
            UserRole::Lecteur => "lecteur",
        }
    }

    /// Roles desconocidos de la tabla legacy caen en `Lecteur`
    pub fn from_db(s: Option<&str>) -> Self {
        match s.map(|r| r.trim().to_lowercase()).as_deref() {
            Some("admin") => UserRole::Admin,
            Some("dispatcher") => UserRole::Dispatcher,
            _ => UserRole::Lecteur,
        }
    }

    pub fn permissions(&self) -> Vec<String> {
        let perms: &[&str] = match self {
            UserRole::Admin => &["read", "write", "delete"],
            UserRole::Dispatcher => &["read", "write"],
            UserRole::Lecteur => &["read"],
        };
        perms.iter().map(|p| p.to_string()).collect()
    }
}

/// Cuenta verificada por un `CredentialStore`
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub role: UserRole,
}

/// Claims del JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // user_id
    pub username: String,
    pub role: UserRole,
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}
