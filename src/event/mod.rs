// Relay event vocabulary and the single-dispatcher command queue
//
// Inbound frames are parsed into `InboundEvent`s, wrapped in `RelayCommand`s
// and funnelled through one queue so every roster mutation and snapshot is
// applied in receive order.

// Public API - what other modules can use
pub use error::RouterError;
pub use events::{
    ActiveUsersPayload, ChatMessage, ConnectionId, ErrorPayload, InboundEvent, MarkReadPayload,
    MembershipPayload, MessagesReadPayload, NewMessagePayload, OutboundEvent, TypingPayload,
};
pub use queue::{spawn_dispatcher, DispatcherHandle, RelayCommand, RelayStats};

// Internal modules
mod error;
mod events;
mod queue;
