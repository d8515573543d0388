use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ConfigError;
use crate::event::{DispatcherHandle, RouterError};
use crate::websockets::ConnectionManager;

/// Shared application state handed to every HTTP/WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub dispatcher: DispatcherHandle,
}

impl AppState {
    pub fn new(connection_manager: Arc<dyn ConnectionManager>, dispatcher: DispatcherHandle) -> Self {
        Self {
            connection_manager,
            dispatcher,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error")]
    Internal,
}

impl From<RouterError> for AppError {
    fn from(err: RouterError) -> Self {
        AppError::Unavailable(err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
