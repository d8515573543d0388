use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use chat_relay::{
    spawn_dispatcher, ConnectionId, ConnectionManager, DispatcherHandle, EventRouter,
    EvictionPolicy, WebsocketReceiveHandler,
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub dispatcher: DispatcherHandle,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub input_handler: WebsocketReceiveHandler,
    /// client name -> connection id
    pub clients: HashMap<String, ConnectionId>,
    pub _dispatcher_handle: JoinHandle<()>,
}

impl TestSetup {
    pub fn connection(&self, client: &str) -> ConnectionId {
        *self
            .clients
            .get(client)
            .unwrap_or_else(|| panic!("unknown test client {}", client))
    }
}

pub struct TestSetupBuilder {
    clients: Vec<String>,
    policy: EvictionPolicy,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            clients: vec![],
            policy: EvictionPolicy::PruneEmpty,
        }
    }

    pub fn with_clients(mut self, clients: Vec<&str>) -> Self {
        self.clients = clients.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_three_clients(self) -> Self {
        self.with_clients(vec!["alice", "bob", "carol"])
    }

    pub fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn build(self) -> TestSetup {
        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let router = EventRouter::new(mock_conn_manager.clone(), self.policy);
        let (dispatcher, dispatcher_handle) = spawn_dispatcher(router, 64);

        let mut clients = HashMap::new();
        for client in &self.clients {
            let connection_id = ConnectionId::new();
            let (sender, _receiver) = mpsc::unbounded_channel();
            mock_conn_manager.add_connection(connection_id, sender).await;
            dispatcher.connected(connection_id).await.unwrap();
            clients.insert(client.clone(), connection_id);
        }

        let input_handler = WebsocketReceiveHandler::new(dispatcher.clone());

        TestSetup {
            dispatcher,
            mock_conn_manager,
            input_handler,
            clients,
            _dispatcher_handle: dispatcher_handle,
        }
    }
}
