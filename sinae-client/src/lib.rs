pub mod channel;
pub mod error;
pub mod media;
pub mod session;
pub mod transport;

pub use channel::{ChannelEvent, ReconnectPolicy, RendezvousChannel, WsChannel};
pub use error::SessionError;
pub use media::{CaptureError, LocalTrack, MediaCapture, MediaKind, NullCapture};
pub use session::{
    CandidateBuffer, EndReason, NegotiationState, Session, SessionEvent, SessionHandle,
    SignalingCoordinator,
};
pub use transport::{
    ConnectivityState, NegotiationPhase, PeerTransport, RemoteMediaInfo, TransportConfig,
    TransportEvent, TransportFactory, WebRtcTransport, WebRtcTransportFactory,
};
