use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    event::{ConnectionId, OutboundEvent, RouterError},
    websockets::ConnectionManager,
};

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Serializes an event once and hands it to each recipient.
///
/// A failed send to one recipient is logged and skipped; the rest of the
/// fan-out still goes out.
pub struct MessageBroadcaster {
    connection_manager: Arc<dyn ConnectionManager>,
}

impl MessageBroadcaster {
    pub fn new(connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    pub async fn broadcast(
        &self,
        recipients: &[ConnectionId],
        event: &OutboundEvent,
    ) -> Result<FanoutReport, RouterError> {
        let message_json = event.to_json()?;
        let mut report = FanoutReport::default();

        for connection_id in recipients {
            match self
                .connection_manager
                .send_to_connection(connection_id, &message_json)
                .await
            {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(
                        connection_id = %connection_id,
                        event = %event.kind(),
                        error = %e,
                        "Delivery failed, continuing fan-out"
                    );
                    report.failed += 1;
                }
            }
        }

        debug!(
            event = %event.kind(),
            delivered = report.delivered,
            failed = report.failed,
            "Fan-out complete"
        );
        Ok(report)
    }

    pub async fn send_to(
        &self,
        connection_id: ConnectionId,
        event: &OutboundEvent,
    ) -> Result<FanoutReport, RouterError> {
        self.broadcast(&[connection_id], event).await
    }
}
