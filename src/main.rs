use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_relay::{
    health, spawn_dispatcher, websockets::websocket_handler, AppError, AppState, EventRouter,
    InMemoryConnectionManager, RelayConfig,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Chat relay exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = RelayConfig::from_env()?;
    info!(?config, "Starting chat relay");

    let connection_manager = Arc::new(InMemoryConnectionManager::new());
    let router = EventRouter::new(connection_manager.clone(), config.eviction_policy);
    let (dispatcher, _dispatcher_task) = spawn_dispatcher(router, config.queue_capacity);

    let app_state = AppState::new(connection_manager, dispatcher);

    let app = Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .route("/ws", get(websocket_handler))
        .layer(config.cors_layer()?)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let address = config.bind_address()?;
    let listener = tokio::net::TcpListener::bind(address).await.map_err(|e| {
        error!(%address, error = %e, "Failed to bind listener");
        AppError::Internal
    })?;
    info!("Chat relay listening on ws://{}/ws", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "Server error");
            AppError::Internal
        })?;

    info!("Chat relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
