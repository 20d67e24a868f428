use super::{MockChannel, MockTransportFactory, init_tracing};
use async_trait::async_trait;
use sinae_client::{
    CaptureError, ChannelEvent, LocalTrack, MediaCapture, NullCapture, Session, SessionHandle,
};
use sinae_core::{CandidateInit, PeerId, RoomCode, SessionDescription, SignalMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Timeout for expected signals and events (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

/// Settle delay used when asserting that something did NOT happen (ms).
pub const QUIET_MS: u64 = 100;

/// One session under test, driven entirely through mocks: inbound
/// relay traffic is injected, outbound traffic and transport calls are
/// captured.
pub struct TestSession {
    pub room: RoomCode,
    pub channel: Arc<MockChannel>,
    pub factory: Arc<MockTransportFactory>,
    pub handle: SessionHandle,
    pub sent_rx: mpsc::UnboundedReceiver<SignalMessage>,
    inject_tx: mpsc::Sender<ChannelEvent>,
}

impl TestSession {
    /// Start a session against mocks and wait until it has joined the
    /// room (so the first transport exists and the loop is running).
    pub async fn start(room: &str) -> Self {
        init_tracing();

        let (channel, sent_rx) = MockChannel::new();
        let (inject_tx, channel_rx) = mpsc::channel(64);
        let factory = MockTransportFactory::new();

        let handle = Session::start(
            RoomCode::from(room),
            factory.clone(),
            Arc::new(NullCapture),
            channel.clone(),
            channel_rx,
        )
        .await
        .expect("session should start");

        let mut session = Self {
            room: RoomCode::from(room),
            channel,
            factory,
            handle,
            sent_rx,
            inject_tx,
        };

        let joined = session.expect_signal().await;
        assert!(
            matches!(joined, SignalMessage::JoinRoom { .. }),
            "first outbound message must be join-room, got {joined:?}"
        );
        session
    }

    /// Feed an inbound relay message into the session.
    pub async fn inject(&self, msg: SignalMessage) {
        self.inject_tx
            .send(ChannelEvent::Signal(msg))
            .await
            .expect("coordinator should be running");
    }

    /// Like `inject`, but tolerates the session being gone already.
    pub async fn try_inject(&self, msg: SignalMessage) {
        let _ = self.inject_tx.send(ChannelEvent::Signal(msg)).await;
    }

    pub async fn inject_event(&self, event: ChannelEvent) {
        self.inject_tx
            .send(event)
            .await
            .expect("coordinator should be running");
    }

    /// Next outbound message, or panic after the timeout.
    pub async fn expect_signal(&mut self) -> SignalMessage {
        tokio::time::timeout(Duration::from_millis(SIGNAL_TIMEOUT_MS), self.sent_rx.recv())
            .await
            .expect("timed out waiting for an outbound signal")
            .expect("channel mock dropped")
    }

    /// Give the event loop time to process already-injected events.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(QUIET_MS)).await;
    }

    pub fn roster(&self, peers: &[&str]) -> SignalMessage {
        SignalMessage::Roster {
            room: self.room.clone(),
            peers: peers.iter().map(|p| PeerId::from(*p)).collect(),
        }
    }

    pub fn peer_joined(&self, peer: &str) -> SignalMessage {
        SignalMessage::PeerJoined {
            room: self.room.clone(),
            peer: PeerId::from(peer),
        }
    }

    pub fn peer_left(&self, peer: &str) -> SignalMessage {
        SignalMessage::PeerLeft {
            room: self.room.clone(),
            peer: PeerId::from(peer),
        }
    }

    pub fn offer_from(&self, peer: &str, sdp: &str) -> SignalMessage {
        SignalMessage::Offer {
            room: self.room.clone(),
            peer: Some(PeerId::from(peer)),
            sdp: SessionDescription::offer(sdp),
        }
    }

    pub fn answer_from(&self, peer: &str, sdp: &str) -> SignalMessage {
        SignalMessage::Answer {
            room: self.room.clone(),
            peer: Some(PeerId::from(peer)),
            sdp: SessionDescription::answer(sdp),
        }
    }

    pub fn candidate(&self, candidate: &str) -> SignalMessage {
        SignalMessage::IceCandidate {
            room: self.room.clone(),
            peer: None,
            candidate: CandidateInit::new(candidate),
        }
    }
}

/// Capture stub that always fails, for the capability-failure path.
pub struct FailingCapture;

#[async_trait]
impl MediaCapture for FailingCapture {
    async fn acquire_local_tracks(&self) -> Result<Vec<LocalTrack>, CaptureError> {
        Err(CaptureError::PermissionDenied("camera blocked".to_string()))
    }

    async fn release(&self) {}
}
