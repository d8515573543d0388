use std::sync::Arc;
use tracing::info;

use super::{broadcast::MessageBroadcaster, channels::RoomChannels, enrollments::Enrollments};
use crate::{
    event::{ConnectionId, InboundEvent, RelayCommand, RelayStats, RouterError},
    roster::{EvictionPolicy, RosterRegistry},
    websockets::ConnectionManager,
};

/// Routes relay commands to their handlers and owns all relay state.
///
/// Handlers are split by concern:
/// - membership_events: join_chat, leave_chat, active_users fan-out
/// - chat_events: new_message, mark_read, typing
/// - connection_events: connect, disconnect, rejected frames
///
/// The router is meant to be owned by a single dispatcher task, so it takes
/// `&mut self` and holds no locks.
pub struct EventRouter {
    pub(super) roster: RosterRegistry,
    pub(super) channels: RoomChannels,
    pub(super) enrollments: Enrollments,
    pub(super) broadcaster: MessageBroadcaster,
}

impl EventRouter {
    pub fn new(connection_manager: Arc<dyn ConnectionManager>, policy: EvictionPolicy) -> Self {
        Self {
            roster: RosterRegistry::with_policy(policy),
            channels: RoomChannels::new(),
            enrollments: Enrollments::new(),
            broadcaster: MessageBroadcaster::new(connection_manager),
        }
    }

    pub fn roster(&self) -> &RosterRegistry {
        &self.roster
    }

    pub async fn apply(&mut self, command: RelayCommand) -> Result<(), RouterError> {
        match command {
            RelayCommand::Connected { connection_id } => {
                self.handle_connected(connection_id);
                Ok(())
            }
            RelayCommand::Inbound {
                connection_id,
                event,
            } => self.dispatch(connection_id, event).await,
            RelayCommand::Rejected {
                connection_id,
                reason,
            } => self.handle_rejected(connection_id, &reason).await,
            RelayCommand::Disconnected { connection_id } => {
                self.handle_disconnected(connection_id).await
            }
            RelayCommand::Stats { reply } => {
                // The caller may have given up waiting
                let _ = reply.send(self.stats());
                Ok(())
            }
        }
    }

    /// Event kind -> handler table
    pub async fn dispatch(
        &mut self,
        connection_id: ConnectionId,
        event: InboundEvent,
    ) -> Result<(), RouterError> {
        info!(
            connection_id = %connection_id,
            room_id = %event.room_id(),
            event = %event.kind(),
            "Routing inbound event"
        );

        match event {
            InboundEvent::JoinChat(payload) => self.handle_join(connection_id, payload).await,
            InboundEvent::LeaveChat(payload) => self.handle_leave(connection_id, payload).await,
            InboundEvent::NewMessage(payload) => self.handle_new_message(payload).await,
            InboundEvent::MarkRead(payload) => self.handle_mark_read(payload).await,
            InboundEvent::Typing(payload) => self.handle_typing(connection_id, payload).await,
        }
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            rooms: self.roster.room_count(),
            connections: self.enrollments.connection_count(),
            identities: self.roster.identity_count(),
        }
    }
}
