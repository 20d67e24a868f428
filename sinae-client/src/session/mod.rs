mod candidate_buffer;
mod coordinator;
mod lifecycle;
mod session_event;
mod state;

pub use candidate_buffer::CandidateBuffer;
pub use coordinator::SignalingCoordinator;
pub use lifecycle::{Session, SessionHandle};
pub use session_event::{EndReason, SessionCommand, SessionEvent};
pub use state::NegotiationState;
