use tracing::info;

use crate::{
    event::{
        ConnectionId, MarkReadPayload, MessagesReadPayload, NewMessagePayload, OutboundEvent,
        RouterError, TypingPayload,
    },
    relay::EventRouter,
};

impl EventRouter {
    /// Stamps the message with the room roster and echoes it to the whole room.
    ///
    /// `read_by` records who was present when the message arrived, not who
    /// has rendered it.
    pub(in crate::relay) async fn handle_new_message(
        &mut self,
        payload: NewMessagePayload,
    ) -> Result<(), RouterError> {
        let NewMessagePayload {
            room_id,
            mut message,
        } = payload;

        message.read_by = self.roster.snapshot(&room_id);

        info!(
            room_id = %room_id,
            message_id = %message.id,
            sender = %message.sender,
            read_by = message.read_by.len(),
            "Relaying new message"
        );

        let recipients = self.channels.recipients(&room_id);
        self.broadcaster
            .broadcast(&recipients, &OutboundEvent::NewMessage(message))
            .await?;
        Ok(())
    }

    pub(in crate::relay) async fn handle_mark_read(
        &mut self,
        payload: MarkReadPayload,
    ) -> Result<(), RouterError> {
        let MarkReadPayload {
            room_id,
            identity,
            message_ids,
        } = payload;

        info!(
            room_id = %room_id,
            identity = %identity,
            message_count = message_ids.len(),
            "Relaying read receipt"
        );

        let recipients = self.channels.recipients(&room_id);
        let event = OutboundEvent::MessagesRead(MessagesReadPayload {
            room_id,
            identity,
            message_ids,
        });
        self.broadcaster.broadcast(&recipients, &event).await?;
        Ok(())
    }

    /// Typing indicators go to everyone in the room except the sending connection
    pub(in crate::relay) async fn handle_typing(
        &mut self,
        connection_id: ConnectionId,
        payload: TypingPayload,
    ) -> Result<(), RouterError> {
        info!(
            room_id = %payload.room_id,
            identity = %payload.identity,
            typing = payload.typing,
            "Relaying typing indicator"
        );

        let recipients = self
            .channels
            .recipients_except(&payload.room_id, &connection_id);
        self.broadcaster
            .broadcast(&recipients, &OutboundEvent::Typing(payload))
            .await?;
        Ok(())
    }
}
