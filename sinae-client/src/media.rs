use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

/// Descriptor for a locally captured track. Capture itself lives with
/// the embedding application; the core only needs to know which media
/// lines to negotiate.
#[derive(Debug, Clone)]
pub struct LocalTrack {
    pub id: String,
    pub kind: MediaKind,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("media device unavailable: {0}")]
    Unavailable(String),
    #[error("media permission denied: {0}")]
    PermissionDenied(String),
}

/// Boundary to the platform capture layer (camera/microphone).
///
/// A capture failure is user-visible and fatal to starting a session,
/// but it never leaks into the negotiation state machine.
#[async_trait]
pub trait MediaCapture: Send + Sync {
    async fn acquire_local_tracks(&self) -> Result<Vec<LocalTrack>, CaptureError>;

    /// Stop and release any acquired tracks. Must tolerate being
    /// called without a prior successful acquire.
    async fn release(&self);
}

/// Capture stand-in that reports one audio and one video track without
/// touching any device. Used by the CLI demo and in tests.
pub struct NullCapture;

#[async_trait]
impl MediaCapture for NullCapture {
    async fn acquire_local_tracks(&self) -> Result<Vec<LocalTrack>, CaptureError> {
        Ok(vec![
            LocalTrack {
                id: format!("audio-{}", Uuid::new_v4()),
                kind: MediaKind::Audio,
            },
            LocalTrack {
                id: format!("video-{}", Uuid::new_v4()),
                kind: MediaKind::Video,
            },
        ])
    }

    async fn release(&self) {}
}
