use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use topichub_api::config::ServerConfig;
use topichub_api::router::build_app_router;
use topichub_api::state::AppState;
use topichub_core::TopicStore;
use topichub_db::{JsonFileRepository, TopicRepository};
use topichub_events::{EventBus, EventLogger};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "topichub_api=debug,tower_http=debug".into()),
        )
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.log_json).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Storage ---
    let repo: Arc<dyn TopicRepository> = Arc::new(JsonFileRepository::new(&config.data_file));
    repo.health_check()
        .await
        .expect("Data directory is not accessible");

    let snapshot = repo.load_all().await.expect("Failed to read topic data");
    let store = TopicStore::from_snapshot(snapshot).expect("Topic data failed validation");
    tracing::info!(
        topics = store.len(),
        path = %config.data_file.display(),
        "Topic store loaded"
    );

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let logger_handle = tokio::spawn(EventLogger::run(event_bus.subscribe()));

    // --- App state ---
    let state = AppState::new(
        Arc::new(store),
        repo,
        Arc::clone(&event_bus),
        Arc::new(config.clone()),
    );

    let app = build_app_router(state.clone(), &config);

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

    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    match tokio::time::timeout(shutdown_timeout, state.persist()).await {
        Ok(Ok(())) => tracing::info!("Final snapshot saved"),
        Ok(Err(e)) => tracing::error!(error = %e, "Failed to save final snapshot"),
        Err(_) => tracing::error!("Timed out saving final snapshot"),
    }

    // Dropping every bus handle closes the channel and stops the logger.
    drop(state);
    drop(event_bus);
    match tokio::time::timeout(Duration::from_secs(5), logger_handle).await {
        Ok(Ok(logged)) => tracing::info!(logged, "Event logger shut down"),
        _ => tracing::warn!("Event logger did not shut down cleanly"),
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM to initiate graceful shutdown.
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
