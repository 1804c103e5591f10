use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Local, NaiveDate};
use serde_json::Value;
use tower::ServiceExt;

use ipsco_fleet::build_router;
use ipsco_fleet::config::EnvironmentConfig;
use ipsco_fleet::repositories::{ConfigCredentialStore, MemoryStore};
use ipsco_fleet::state::AppState;

pub const ADMIN_PASSWORD: &str = "admin123";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Configuración de test: desarrollo, sin base de datos
pub fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        jwt_secret: "integration-test-secret".to_string(),
        jwt_expiration: 600,
        ..Default::default()
    }
}

/// Router completo sobre el store en memoria con los datos de demostración.
///
/// Mismas capas que en `main.rs`; el hash bcrypt usa coste mínimo.
pub async fn build_test_app() -> Router {
    let store = MemoryStore::with_demo_data(today()).await.unwrap();
    build_test_app_with(store)
}

pub fn build_test_app_with(store: MemoryStore) -> Router {
    let hash = bcrypt::hash(ADMIN_PASSWORD, 4).unwrap();
    let credentials = Arc::new(ConfigCredentialStore::new("admin", hash));
    build_router(AppState::with_parts(store, credentials, test_config()))
}

/// Ejecuta una request y devuelve status + body JSON (`Value::Null` si vacío)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body), None).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None, None).await
}
