use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::event::{ConnectionId, DispatcherHandle, InboundEvent};
use crate::shared::AppState;

use super::socket::{Connection, MessageHandler};

/// Message handler for receiving WebSocket messages from the client.
///
/// Parses each frame and enqueues it on the dispatcher; it never touches
/// relay state itself.
pub struct WebsocketReceiveHandler {
    dispatcher: DispatcherHandle,
}

impl WebsocketReceiveHandler {
    pub fn new(dispatcher: DispatcherHandle) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, connection_id: ConnectionId, message: String) {
        debug!(
            connection_id = %connection_id,
            message = %message,
            "Received message"
        );

        let submitted = match InboundEvent::parse(&message) {
            Ok(event) => self.dispatcher.inbound(connection_id, event).await,
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Rejected WebSocket frame"
                );
                self.dispatcher
                    .rejected(connection_id, e.to_string())
                    .await
            }
        };

        if let Err(e) = submitted {
            warn!(
                connection_id = %connection_id,
                error = %e,
                "Failed to enqueue relay command"
            );
        }
    }
}

/// WebSocket endpoint: GET /ws
///
/// Rooms are joined with `join_chat` frames after the upgrade, so the
/// endpoint itself takes no parameters.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    info!("WebSocket connection requested");
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    let connection_id = ConnectionId::new();
    info!(connection_id = %connection_id, "WebSocket connection established");

    // Create the outbound channel (relay -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    app_state
        .connection_manager
        .add_connection(connection_id, outbound_sender)
        .await;

    if let Err(e) = app_state.dispatcher.connected(connection_id).await {
        warn!(connection_id = %connection_id, error = %e, "Dispatcher unavailable, dropping connection");
        app_state
            .connection_manager
            .remove_connection(&connection_id)
            .await;
        return;
    }

    let message_handler = Arc::new(WebsocketReceiveHandler::new(app_state.dispatcher.clone()));

    let connection = Connection::new(
        connection_id,
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(connection_id = %connection_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(
                connection_id = %connection_id,
                error = %e,
                "WebSocket connection error"
            );
        }
    }

    // Cleanup: remove from connection manager and let the dispatcher release presence
    app_state
        .connection_manager
        .remove_connection(&connection_id)
        .await;

    if let Err(e) = app_state.dispatcher.disconnected(connection_id).await {
        warn!(connection_id = %connection_id, error = %e, "Failed to enqueue disconnect");
    }

    info!(connection_id = %connection_id, "WebSocket disconnect event emitted");
}
