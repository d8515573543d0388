use serde_json::{json, Value};

use chat_relay::{EventKind, MessageHandler, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Feed a raw text frame through the receive handler and wait until the
    /// dispatcher has applied it
    pub async fn send_raw(&self, client: &str, frame: &str) {
        self.input_handler
            .handle_message(self.connection(client), frame.to_string())
            .await;
        self.settle().await;
    }

    /// Send a WebSocket message and wait for processing
    pub async fn send_message(&self, client: &str, message: WebSocketMessage) {
        let message_json = serde_json::to_string(&message).unwrap();
        self.send_raw(client, &message_json).await;
    }

    pub async fn send_event(&self, client: &str, kind: EventKind, payload: Value) {
        self.send_message(client, WebSocketMessage::new(kind, payload))
            .await;
    }

    /// The queue is FIFO, so a stats round-trip means everything before it is done
    pub async fn settle(&self) {
        self.dispatcher.stats().await.unwrap();
    }

    /// Clear all recorded messages
    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn join(&self, client: &str, room: &str, identity: &str) {
        self.send_event(
            client,
            EventKind::JoinChat,
            json!({"roomId": room, "identity": identity}),
        )
        .await;
    }

    /// Join `room` as an identity equal to the client name
    pub async fn join_as_self(&self, client: &str, room: &str) {
        self.join(client, room, client).await;
    }

    pub async fn leave(&self, client: &str, room: &str, identity: &str) {
        self.send_event(
            client,
            EventKind::LeaveChat,
            json!({"roomId": room, "identity": identity}),
        )
        .await;
    }

    pub async fn send_chat(&self, client: &str, room: &str, message_id: &str, text: &str) {
        self.send_event(
            client,
            EventKind::NewMessage,
            json!({
                "roomId": room,
                "message": {
                    "id": message_id,
                    "roomId": room,
                    "text": text,
                    "sender": client,
                    "createdAt": "2024-05-01T12:00:00Z"
                }
            }),
        )
        .await;
    }

    pub async fn mark_read(&self, client: &str, room: &str, message_ids: Vec<&str>) {
        self.send_event(
            client,
            EventKind::MarkRead,
            json!({"roomId": room, "identity": client, "messageIds": message_ids}),
        )
        .await;
    }

    pub async fn typing(&self, client: &str, room: &str, typing: bool) {
        self.send_event(
            client,
            EventKind::Typing,
            json!({"roomId": room, "identity": client, "typing": typing}),
        )
        .await;
    }

    /// Mirror the transport's disconnect sequence
    pub async fn disconnect(&self, client: &str) {
        let connection_id = self.connection(client);
        chat_relay::ConnectionManager::remove_connection(
            self.mock_conn_manager.as_ref(),
            &connection_id,
        )
        .await;
        self.dispatcher.disconnected(connection_id).await.unwrap();
        self.settle().await;
    }
}
