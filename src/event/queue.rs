use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{
    error::RouterError,
    events::{ConnectionId, InboundEvent},
};
use crate::relay::EventRouter;

/// Work items for the dispatcher, applied strictly in arrival order
#[derive(Debug)]
pub enum RelayCommand {
    Connected {
        connection_id: ConnectionId,
    },
    Inbound {
        connection_id: ConnectionId,
        event: InboundEvent,
    },
    /// A frame from this connection could not be parsed
    Rejected {
        connection_id: ConnectionId,
        reason: String,
    },
    Disconnected {
        connection_id: ConnectionId,
    },
    Stats {
        reply: oneshot::Sender<RelayStats>,
    },
}

impl RelayCommand {
    fn name(&self) -> &'static str {
        match self {
            RelayCommand::Connected { .. } => "connected",
            RelayCommand::Inbound { .. } => "inbound",
            RelayCommand::Rejected { .. } => "rejected",
            RelayCommand::Disconnected { .. } => "disconnected",
            RelayCommand::Stats { .. } => "stats",
        }
    }
}

/// Point-in-time counters reported by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    pub rooms: usize,
    pub connections: usize,
    pub identities: usize,
}

/// Cloneable sending side of the dispatcher queue
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    sender: mpsc::Sender<RelayCommand>,
}

impl DispatcherHandle {
    pub async fn submit(&self, command: RelayCommand) -> Result<(), RouterError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| RouterError::QueueClosed)
    }

    pub async fn connected(&self, connection_id: ConnectionId) -> Result<(), RouterError> {
        self.submit(RelayCommand::Connected { connection_id }).await
    }

    pub async fn inbound(
        &self,
        connection_id: ConnectionId,
        event: InboundEvent,
    ) -> Result<(), RouterError> {
        self.submit(RelayCommand::Inbound {
            connection_id,
            event,
        })
        .await
    }

    pub async fn rejected(
        &self,
        connection_id: ConnectionId,
        reason: String,
    ) -> Result<(), RouterError> {
        self.submit(RelayCommand::Rejected {
            connection_id,
            reason,
        })
        .await
    }

    pub async fn disconnected(&self, connection_id: ConnectionId) -> Result<(), RouterError> {
        self.submit(RelayCommand::Disconnected { connection_id })
            .await
    }

    /// Asks the dispatcher for its counters. Answered in queue order, so the
    /// result reflects every command submitted before it.
    pub async fn stats(&self) -> Result<RelayStats, RouterError> {
        let (reply, response) = oneshot::channel();
        self.submit(RelayCommand::Stats { reply }).await?;
        response.await.map_err(|_| RouterError::QueueClosed)
    }
}

/// Spawns the dispatcher task that owns `router` exclusively.
///
/// The task runs until every `DispatcherHandle` has been dropped.
pub fn spawn_dispatcher(
    mut router: EventRouter,
    capacity: usize,
) -> (DispatcherHandle, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::channel::<RelayCommand>(capacity.max(1));

    info!(capacity = capacity, "Starting relay dispatcher");

    let handle = tokio::spawn(async move {
        while let Some(command) = receiver.recv().await {
            let command_name = command.name();
            debug!(command = command_name, "Dispatching relay command");

            if let Err(e) = router.apply(command).await {
                warn!(
                    command = command_name,
                    error = %e,
                    "Relay command failed"
                );
            }
        }

        info!("Relay dispatcher stopped - all handles dropped");
    });

    (DispatcherHandle { sender }, handle)
}
