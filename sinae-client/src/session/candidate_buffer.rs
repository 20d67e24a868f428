use crate::transport::PeerTransport;
use sinae_core::CandidateInit;
use tracing::{debug, warn};

/// Holds network candidates that arrive before a remote description is
/// installed. Owned exclusively by the coordinator.
#[derive(Default)]
pub struct CandidateBuffer {
    pending: Vec<CandidateInit>,
}

impl CandidateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate in arrival order.
    pub fn push(&mut self, candidate: CandidateInit) {
        debug!("buffering early candidate ({} pending)", self.pending.len() + 1);
        self.pending.push(candidate);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Apply every buffered candidate to the transport, in original
    /// arrival order, then leave the buffer empty. Path discovery is
    /// best-effort: a candidate the transport rejects is logged and
    /// skipped, never aborting the drain.
    pub async fn drain_into(&mut self, transport: &dyn PeerTransport) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let total = pending.len();
        let mut applied = 0;
        for candidate in pending {
            match transport.add_ice_candidate(candidate).await {
                Ok(()) => applied += 1,
                Err(e) => warn!("skipping buffered candidate: {e}"),
            }
        }
        if total > 0 {
            debug!("drained candidate buffer: {applied}/{total} applied");
        }
        applied
    }
}
