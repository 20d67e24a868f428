use async_trait::async_trait;
use sinae_core::{RoomCode, SignalMessage};
use std::time::Duration;

/// Inbound traffic from the rendezvous relay, already serialized into
/// a single stream so the coordinator processes one event at a time.
#[derive(Debug)]
pub enum ChannelEvent {
    Signal(SignalMessage),
    /// The link dropped and a reconnect attempt is in progress.
    /// Surfaced rather than hidden so the caller can observe outages.
    Reconnecting { attempt: u32 },
    /// Reconnect attempts exhausted; the link is gone for good.
    Down,
}

/// Bounded reconnect/backoff policy for the rendezvous link.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl ReconnectPolicy {
    /// Exponential backoff: base * 2^(attempt-1).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Bidirectional message link to the rendezvous relay.
///
/// Delivery is best-effort: messages sent while the link is down are
/// dropped with a warning, and no ordering across message kinds is
/// promised. Inbound events arrive on the `mpsc::Receiver` handed out
/// at construction time.
#[async_trait]
pub trait RendezvousChannel: Send + Sync {
    /// Send a signaling message to the relay. Best-effort.
    async fn send(&self, msg: SignalMessage);

    /// Announce ourselves in a room. The relay responds with a roster
    /// snapshot and starts forwarding the room's traffic.
    async fn join_room(&self, room: RoomCode) {
        self.send(SignalMessage::JoinRoom { room }).await;
    }

    /// Release the link and detach the reader. Calling it twice is a
    /// no-op.
    async fn close(&self);
}
