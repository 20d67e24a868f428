use crate::channel::{ChannelEvent, RendezvousChannel};
use crate::error::SessionError;
use crate::media::MediaCapture;
use crate::session::coordinator::SignalingCoordinator;
use crate::session::session_event::{SessionCommand, SessionEvent};
use crate::transport::TransportFactory;
use sinae_core::RoomCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Entry point wiring the channel, transport factory and media capture
/// into a running session.
pub struct Session;

impl Session {
    /// Acquire local media, join the room and spawn the coordinator.
    ///
    /// Media is acquired first: a capture failure is surfaced here,
    /// before any rendezvous join is attempted, and never reaches the
    /// negotiation state machine.
    pub async fn start(
        room: RoomCode,
        factory: Arc<dyn TransportFactory>,
        media: Arc<dyn MediaCapture>,
        channel: Arc<dyn RendezvousChannel>,
        channel_rx: mpsc::Receiver<ChannelEvent>,
    ) -> Result<SessionHandle, SessionError> {
        let local_tracks = match media.acquire_local_tracks().await {
            Ok(tracks) => tracks,
            Err(e) => {
                error!("could not acquire local media: {e}");
                channel.close().await;
                return Err(SessionError::Capability(e.to_string()));
            }
        };
        info!(room = %room, tracks = local_tracks.len(), "starting session");

        let (command_tx, command_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let coordinator = SignalingCoordinator::new(
            room,
            channel,
            channel_rx,
            factory,
            media,
            local_tracks,
            command_rx,
            event_tx,
        );
        let task = tokio::spawn(coordinator.run());

        Ok(SessionHandle {
            command_tx,
            event_rx,
            task: Some(task),
        })
    }
}

/// Disposable handle to a running session.
pub struct SessionHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    event_rx: mpsc::UnboundedReceiver<SessionEvent>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Next application-facing notification, or `None` once the
    /// session is gone and all events have been read.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.event_rx.recv().await
    }

    /// Tear the session down: release media, transport and channel in
    /// order. Idempotent, and safe to call while an asynchronous
    /// negotiation step is still in flight (the shutdown is serialized
    /// into the same event stream; late completions are discarded).
    /// When this returns the event loop has exited, so nothing fires
    /// afterwards.
    pub async fn stop(&mut self) {
        let _ = self.command_tx.send(SessionCommand::Shutdown).await;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}
