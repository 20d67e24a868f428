use thiserror::Error;

/// The only failures that cross the session boundary to the caller.
///
/// Recoverable signaling conditions (stale answers, glare offers,
/// individual candidate apply failures) are logged and dropped inside
/// the coordinator and never show up here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Local media could not be acquired. Fatal before a session even
    /// starts; no rendezvous join is attempted.
    #[error("media capture failed: {0}")]
    Capability(String),

    /// The rendezvous relay is unreachable and reconnect attempts are
    /// exhausted.
    #[error("cannot reach peer: {0}")]
    Link(String),

    /// The peer transport rejected a description or lost connectivity.
    /// Never retried automatically; recovery requires a fresh join.
    #[error("peer transport failed: {0}")]
    Transport(String),
}
