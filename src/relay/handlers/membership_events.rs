use tracing::{info, instrument};

use crate::{
    event::{ActiveUsersPayload, ConnectionId, MembershipPayload, OutboundEvent, RouterError},
    relay::EventRouter,
};

impl EventRouter {
    #[instrument(skip(self))]
    pub(in crate::relay) async fn handle_join(
        &mut self,
        connection_id: ConnectionId,
        payload: MembershipPayload,
    ) -> Result<(), RouterError> {
        let MembershipPayload { room_id, identity } = payload;

        self.roster.join(&room_id, &identity);
        self.channels.enroll(&room_id, connection_id);
        self.enrollments.enroll(connection_id, &room_id, &identity);

        info!(
            room_id = %room_id,
            identity = %identity,
            connection_id = %connection_id,
            "Identity joined room"
        );

        self.broadcast_active_users(&room_id).await
    }

    #[instrument(skip(self))]
    pub(in crate::relay) async fn handle_leave(
        &mut self,
        connection_id: ConnectionId,
        payload: MembershipPayload,
    ) -> Result<(), RouterError> {
        let MembershipPayload { room_id, identity } = payload;

        let was_present = self.roster.leave(&room_id, &identity);
        self.enrollments
            .withdraw(&connection_id, &room_id, &identity);
        if !self
            .enrollments
            .connection_holds_room(&connection_id, &room_id)
        {
            self.channels.withdraw(&room_id, &connection_id);
        }

        info!(
            room_id = %room_id,
            identity = %identity,
            connection_id = %connection_id,
            was_present = was_present,
            "Identity left room"
        );

        self.broadcast_active_users(&room_id).await
    }

    /// Sends the current roster of `room_id` to every connection in the room
    pub(in crate::relay) async fn broadcast_active_users(
        &self,
        room_id: &str,
    ) -> Result<(), RouterError> {
        let event = OutboundEvent::ActiveUsers(ActiveUsersPayload {
            room_id: room_id.to_string(),
            identities: self.roster.snapshot(room_id),
        });
        let recipients = self.channels.recipients(room_id);

        self.broadcaster.broadcast(&recipients, &event).await?;
        Ok(())
    }
}
