use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::{
    event::{ConnectionId, OutboundEvent, RouterError},
    relay::EventRouter,
};

impl EventRouter {
    pub(in crate::relay) fn handle_connected(&mut self, connection_id: ConnectionId) {
        self.enrollments.register(connection_id);
        info!(connection_id = %connection_id, "Connection registered");
    }

    /// Tells only the offending connection that its frame was dropped
    pub(in crate::relay) async fn handle_rejected(
        &mut self,
        connection_id: ConnectionId,
        reason: &str,
    ) -> Result<(), RouterError> {
        warn!(
            connection_id = %connection_id,
            reason = %reason,
            "Frame rejected"
        );
        self.broadcaster
            .send_to(connection_id, &OutboundEvent::error(reason))
            .await?;
        Ok(())
    }

    /// Releases presence held through this connection.
    ///
    /// An identity still held by another live connection keeps whatever that
    /// connection holds; an identity held by no one is purged from every room.
    /// Only rooms whose roster changed get an `active_users` update.
    pub(in crate::relay) async fn handle_disconnected(
        &mut self,
        connection_id: ConnectionId,
    ) -> Result<(), RouterError> {
        let released = self.enrollments.release(&connection_id);
        self.channels.withdraw_all(&connection_id);

        let identities: BTreeSet<&str> = released.iter().map(|(_, i)| i.as_str()).collect();
        let mut affected_rooms = BTreeSet::new();

        for identity in identities {
            if !self.enrollments.holds_identity(identity) {
                affected_rooms.extend(self.roster.purge_connection(identity));
                continue;
            }

            for (room_id, _) in released.iter().filter(|(_, i)| i == identity) {
                if !self.enrollments.holds_pair(room_id, identity)
                    && self.roster.leave(room_id, identity)
                {
                    affected_rooms.insert(room_id.clone());
                }
            }
        }

        info!(
            connection_id = %connection_id,
            released_pairs = released.len(),
            affected_rooms = affected_rooms.len(),
            "Connection disconnected"
        );

        for room_id in &affected_rooms {
            // One failing room must not stop updates to the others
            if let Err(e) = self.broadcast_active_users(room_id).await {
                warn!(room_id = %room_id, error = %e, "Failed to broadcast roster after disconnect");
            }
        }

        Ok(())
    }
}
