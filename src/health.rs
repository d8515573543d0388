use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::event::RelayStats;
use crate::shared::{AppError, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub stats: RelayStats,
}

pub async fn index() -> &'static str {
    "Chat relay is running"
}

/// GET /health - answered by the dispatcher so counts are consistent
#[instrument(name = "health", skip(state))]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let stats = state.dispatcher.stats().await?;
    debug!(rooms = stats.rooms, connections = stats.connections, "Health check");

    Ok(Json(HealthResponse {
        status: "ok",
        stats,
    }))
}
