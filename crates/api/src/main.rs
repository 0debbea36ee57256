use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use locker_core::store::memory::MemoryStore;
use locker_core::store::Store;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use locker_api::config::{ServerConfig, StoreBackend};
use locker_api::router::build_app_router;
use locker_api::state::AppState;
use locker_api::ws;
use locker_events::EventBus;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "locker_api=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        store = %config.store_backend,
        "Loaded server configuration",
    );

    // --- Store ---
    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL must be set");

            let pool = locker_db::create_pool(database_url, config.db_max_connections)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            locker_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            locker_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");

            Arc::new(locker_db::PgStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // --- App state ---
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    let drain = tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        ws_manager.shutdown_all(),
    );
    if drain.await.is_err() {
        tracing::warn!("Timed out closing WebSocket connections");
    }

    heartbeat_handle.abort();
    drop(event_bus);

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
