use crate::media::LocalTrack;
use anyhow::Result;
use async_trait::async_trait;
use sinae_core::{CandidateInit, SessionDescription};
use tokio::sync::mpsc;

/// Where the transport stands in the offer/answer exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationPhase {
    Idle,
    HaveLocalOffer,
    HaveRemoteOffer,
    Stable,
}

/// Connectivity as reported by the transport itself. Authoritative:
/// the coordinator never infers "connected" from signaling alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Descriptor for a remote track that started arriving. Rendering is
/// the embedding application's job.
#[derive(Debug, Clone)]
pub struct RemoteMediaInfo {
    pub track_id: String,
    pub kind: String,
}

/// Events the transport feeds back into the session event loop.
#[derive(Debug)]
pub enum TransportEvent {
    /// A local network candidate was generated and should be relayed
    /// to the peer.
    CandidateGenerated(CandidateInit),
    Connectivity(ConnectivityState),
    RemoteMedia(RemoteMediaInfo),
}

/// The external peer-transport capability (NAT traversal, encoding and
/// media transport live behind it). The core only drives negotiation
/// through this interface.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: CandidateInit) -> Result<()>;

    async fn current_phase(&self) -> NegotiationPhase;

    async fn close(&self) -> Result<()>;
}

/// Creates fresh transports. A new transport is needed both at session
/// start and when a peer leaves mid-offer and negotiation must restart
/// from a clean slate.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        local_tracks: &[LocalTrack],
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>>;
}
