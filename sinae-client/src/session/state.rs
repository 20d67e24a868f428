/// Negotiation state of the local session. Mutated only by the
/// coordinator, from its single event-loop task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    /// Session created, room not joined yet.
    Idle,
    /// In the room; either alone or second-in with no offer yet.
    AwaitingPeer,
    /// Local offer created and sent, answer outstanding.
    Offering,
    /// Remote offer applied, local answer sent.
    Answering,
    /// The transport reported connectivity.
    Connected,
    /// Terminal. The session object is discarded after this.
    Closed,
}

impl NegotiationState {
    /// An incoming Offer is honored only when no local offer is
    /// outstanding. A side in `Offering` does not yield (glare), and a
    /// connected side ignores renegotiation attempts.
    pub fn accepts_offer(self) -> bool {
        matches!(self, Self::AwaitingPeer | Self::Answering)
    }

    /// An Answer is only meaningful while our own offer is out.
    pub fn accepts_answer(self) -> bool {
        self == Self::Offering
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Closed
    }
}
