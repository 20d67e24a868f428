use crate::error::SessionError;
use crate::transport::RemoteMediaInfo;

/// Why a session ended normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    PeerLeft,
    LocalTeardown,
}

/// Notifications delivered to the embedding application (UI layer).
/// At most one terminal event (`Ended` or `Failed`) is ever emitted.
#[derive(Debug)]
pub enum SessionEvent {
    /// The transport reported end-to-end connectivity.
    Connected,
    /// Remote media started arriving.
    RemoteMedia(RemoteMediaInfo),
    Ended(EndReason),
    Failed(SessionError),
}

/// Local control commands serialized into the session event stream.
#[derive(Debug)]
pub enum SessionCommand {
    Shutdown,
}
