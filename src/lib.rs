// Library crate for the chat relay
// This file exposes the public API for integration tests

pub mod config;
pub mod event;
pub mod health;
pub mod relay;
pub mod roster;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::RelayConfig;
pub use event::{spawn_dispatcher, ConnectionId, DispatcherHandle, InboundEvent, OutboundEvent};
pub use relay::EventRouter;
pub use roster::{EvictionPolicy, RosterRegistry};
pub use shared::{AppError, AppState};
pub use websockets::{
    ConnectionManager, EventKind, InMemoryConnectionManager, MessageHandler, WebSocketMessage,
    WebsocketReceiveHandler,
};
