use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use innkeep_db::repositories::BulkActivityLogRepo;
use innkeep_pipeline::{BulkIngestionPipeline, PgActivityLogStore, WholesalerRouter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use innkeep_api::config::ServerConfig;
use innkeep_api::router::build_app_router;
use innkeep_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "innkeep_api=debug,innkeep_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = innkeep_db::create_pool(&database_url, config.database_max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!(
        max_connections = config.database_max_connections,
        "Database connection pool created"
    );

    innkeep_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    innkeep_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // Records left open by a previous process are reported, never closed.
    match BulkActivityLogRepo::list_open_started_before(&pool, Utc::now()).await {
        Ok(orphans) if !orphans.is_empty() => {
            let ids: Vec<_> = orphans.iter().map(|log| log.id).collect();
            tracing::warn!(count = ids.len(), ?ids, "Found activity logs left open by a previous run");
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to scan for open activity logs"),
    }

    // --- Bulk ingestion pipeline ---
    let router = WholesalerRouter::staging(&pool);
    tracing::info!(routes = router.routes().len(), "Wholesaler routes registered");
    let pipeline = Arc::new(BulkIngestionPipeline::new(
        router,
        Arc::new(PgActivityLogStore::new(pool.clone())),
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        pipeline: Arc::clone(&pipeline),
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
    let in_flight = pipeline.in_flight();
    tracing::info!(in_flight, "Server stopped accepting connections, draining bulk jobs");

    let timeout = Duration::from_secs(config.shutdown_timeout_secs);
    if pipeline.drain(timeout).await {
        tracing::info!("Bulk jobs drained");
    } else {
        tracing::warn!(
            remaining = pipeline.in_flight(),
            timeout_secs = config.shutdown_timeout_secs,
            "Shutdown timeout reached with bulk jobs still running; their activity logs stay open"
        );
    }

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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
