use anyhow::Result;
use chrono::Local;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ipsco_fleet::build_router;
use ipsco_fleet::config::{DatabaseConfig, EnvironmentConfig};
use ipsco_fleet::database::DatabaseConnection;
use ipsco_fleet::repositories::MemoryStore;
use ipsco_fleet::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    info!("🚗 IPSCO Fleet API v{}", env!("CARGO_PKG_VERSION"));
    info!("================================================");

    let config = EnvironmentConfig::from_env()?;
    info!("⚙️ Entorno: {}", config.environment);

    // Almacenamiento: PostgreSQL si hay DATABASE_URL, si no modo demostración
    let app_state = match DatabaseConfig::from_environment(&config) {
        Some(db_config) => {
            let connection = DatabaseConnection::connect(&db_config).await.map_err(|e| {
                error!("❌ Error conectando a la base de datos: {}", e);
                e
            })?;
            AppState::postgres(connection.pool().clone(), config.clone())
        }
        None => {
            warn!("⚠️ DATABASE_URL no definido: modo demostración en memoria");
            let store = MemoryStore::with_demo_data(Local::now().date_naive()).await?;
            AppState::memory(store, config.clone())?
        }
    };
    info!("💾 Almacenamiento: {}", app_state.storage.name());

    let app = build_router(app_state);
    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  / - Información de la API");
    info!("   GET  /health - Health check");
    info!("   GET  /stats - Estadísticas globales");
    info!("🔐 Autenticación:");
    info!("   POST /auth/login - Login");
    info!("   POST /auth/logout - Logout");
    info!("   GET  /auth/me - Usuario actual");
    info!("🚗 Véhicules:");
    info!("   GET  /api/vehicules - Listar vehículos");
    info!("   POST /api/vehicules - Crear vehículo");
    info!("   GET  /api/vehicules/stats - Resumen de alertas de la flota");
    info!("   GET  /api/vehicules/:id - Obtener vehículo");
    info!("   PUT  /api/vehicules/:id - Actualizar vehículo");
    info!("   DELETE /api/vehicules/:id - Eliminar vehículo");
    info!("   GET  /api/vehicules/:id/stats - Alertas de vencimiento");
    info!("👤 Chauffeurs:");
    info!("   GET  /api/chauffeurs - Listar choferes");
    info!("   GET  /api/chauffeurs/:id - Detalle de chofer");
    info!("   GET  /api/chauffeurs/:id/missions - Historial de missions");
    info!("📋 Missions:");
    info!("   GET  /api/missions - Listar missions (filtros)");
    info!("   POST /api/missions - Crear mission");
    info!("   GET  /api/missions/stats/dashboard - Dashboard");
    info!("   GET  /api/missions/:id - Detalle con timeline");
    info!("   PUT  /api/missions/:id - Actualizar mission");
    info!("   PUT  /api/missions/:id/statut - Cambiar statut");
    info!("   DELETE /api/missions/:id - Eliminar mission");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
