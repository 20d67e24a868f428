use crate::model::description::{CandidateInit, SessionDescription};
use crate::model::peer::PeerId;
use crate::model::room::RoomCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }

    pub fn turn(
        url: impl Into<String>,
        username: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            urls: vec![url.into()],
            username: Some(username.into()),
            credential: Some(credential.into()),
        }
    }
}

/// Everything that crosses the rendezvous relay, scoped to a room.
///
/// The relay guarantees at-most-once delivery but no ordering across
/// message kinds; the coordinator must tolerate arbitrary interleaving.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum SignalMessage {
    JoinRoom {
        room: RoomCode,
    },
    /// Membership snapshot sent by the relay right after a join. Empty
    /// means we are first into the room.
    Roster {
        room: RoomCode,
        peers: Vec<PeerId>,
    },
    PeerJoined {
        room: RoomCode,
        peer: PeerId,
    },
    PeerLeft {
        room: RoomCode,
        peer: PeerId,
    },
    Offer {
        room: RoomCode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        peer: Option<PeerId>,
        sdp: SessionDescription,
    },
    Answer {
        room: RoomCode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        peer: Option<PeerId>,
        sdp: SessionDescription,
    },
    IceCandidate {
        room: RoomCode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        peer: Option<PeerId>,
        candidate: CandidateInit,
    },
}

impl SignalMessage {
    pub fn room(&self) -> &RoomCode {
        match self {
            SignalMessage::JoinRoom { room }
            | SignalMessage::Roster { room, .. }
            | SignalMessage::PeerJoined { room, .. }
            | SignalMessage::PeerLeft { room, .. }
            | SignalMessage::Offer { room, .. }
            | SignalMessage::Answer { room, .. }
            | SignalMessage::IceCandidate { room, .. } => room,
        }
    }
}
