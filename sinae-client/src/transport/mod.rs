mod peer_transport;
mod transport_config;
mod webrtc_transport;

pub use peer_transport::{
    ConnectivityState, NegotiationPhase, PeerTransport, RemoteMediaInfo, TransportEvent,
    TransportFactory,
};
pub use transport_config::TransportConfig;
pub use webrtc_transport::{WebRtcTransport, WebRtcTransportFactory};
