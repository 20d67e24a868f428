mod description;
mod peer;
mod room;
mod signaling;

pub use description::{CandidateInit, SdpKind, SessionDescription};
pub use peer::PeerId;
pub use room::RoomCode;
pub use signaling::{IceServerConfig, SignalMessage};
