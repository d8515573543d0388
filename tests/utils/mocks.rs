use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use chat_relay::{
    websockets::{ConnectionManager, DeliveryError},
    ConnectionId, WebSocketMessage,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

#[derive(Clone, Default)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<ConnectionId, Vec<String>>>>,
    connected: Arc<RwLock<HashSet<ConnectionId>>>,
    failing: Arc<RwLock<HashSet<ConnectionId>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send to this connection fails from now on
    pub async fn break_connection(&self, connection_id: ConnectionId) {
        self.failing.write().await.insert(connection_id);
    }

    pub async fn get_messages_for(&self, connection_id: &ConnectionId) -> Vec<WebSocketMessage> {
        self.sent_messages
            .read()
            .await
            .get(connection_id)
            .map(|frames| {
                frames
                    .iter()
                    .map(|frame| serde_json::from_str(frame).unwrap())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(&self, connection_id: ConnectionId, _sender: mpsc::UnboundedSender<String>) {
        self.connected.write().await.insert(connection_id);
    }

    async fn remove_connection(&self, connection_id: &ConnectionId) {
        self.connected.write().await.remove(connection_id);
    }

    async fn send_to_connection(
        &self,
        connection_id: &ConnectionId,
        message: &str,
    ) -> Result<(), DeliveryError> {
        if self.failing.read().await.contains(connection_id) {
            return Err(DeliveryError::ChannelClosed(*connection_id));
        }
        if !self.connected.read().await.contains(connection_id) {
            return Err(DeliveryError::ConnectionNotFound(*connection_id));
        }

        self.sent_messages
            .write()
            .await
            .entry(*connection_id)
            .or_default()
            .push(message.to_string());
        Ok(())
    }

    async fn count_connections(&self) -> usize {
        self.connected.read().await.len()
    }
}
