use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::controllers::auth_controller::{login, logout, me};
use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Configura las rutas de autenticación. Solo `/me` exige bearer.
pub fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .merge(protected)
}
