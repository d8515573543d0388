// Public API
pub use connection_manager::{ConnectionManager, DeliveryError, InMemoryConnectionManager};
pub use handler::{websocket_handler, WebsocketReceiveHandler};
pub use messages::{EventKind, WebSocketMessage, WebSocketMessageMeta};
pub use socket::{Connection, MessageHandler, SocketError, SocketWrapper};

// Internal modules
mod connection_manager;
mod handler;
mod messages;
mod socket;
