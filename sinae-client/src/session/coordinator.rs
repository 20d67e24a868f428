use crate::channel::{ChannelEvent, RendezvousChannel};
use crate::error::SessionError;
use crate::media::{LocalTrack, MediaCapture};
use crate::session::candidate_buffer::CandidateBuffer;
use crate::session::session_event::{EndReason, SessionCommand, SessionEvent};
use crate::session::state::NegotiationState;
use crate::transport::{ConnectivityState, NegotiationPhase, TransportEvent, TransportFactory};
use anyhow::{Result, bail};
use sinae_core::{CandidateInit, PeerId, RoomCode, SessionDescription, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Owns the negotiation state machine for one two-party session.
///
/// Runs as a single event-loop task: rendezvous messages, transport
/// reports and local commands are consumed one at a time, and every
/// async transport call is awaited inline, so no two description
/// installations are ever in flight concurrently and the state is
/// never touched from two places.
pub struct SignalingCoordinator {
    room: RoomCode,
    state: NegotiationState,
    /// Fixed for the lifetime of the active negotiation once known.
    peer: Option<PeerId>,
    /// Whether we were alone in the room when we joined. The first
    /// participant in is the one that offers when a peer arrives; the
    /// second one in waits for that offer. Arrival order is the sole
    /// input to role election, so two sides can never both offer.
    first_in_room: bool,
    remote_description_set: bool,
    transport: Option<Box<dyn crate::transport::PeerTransport>>,
    factory: Arc<dyn TransportFactory>,
    buffer: CandidateBuffer,
    channel: Arc<dyn RendezvousChannel>,
    media: Arc<dyn MediaCapture>,
    local_tracks: Vec<LocalTrack>,
    command_rx: mpsc::Receiver<SessionCommand>,
    channel_rx: mpsc::Receiver<ChannelEvent>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    transport_tx: mpsc::Sender<TransportEvent>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SignalingCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        room: RoomCode,
        channel: Arc<dyn RendezvousChannel>,
        channel_rx: mpsc::Receiver<ChannelEvent>,
        factory: Arc<dyn TransportFactory>,
        media: Arc<dyn MediaCapture>,
        local_tracks: Vec<LocalTrack>,
        command_rx: mpsc::Receiver<SessionCommand>,
        event_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::channel(256);

        Self {
            room,
            state: NegotiationState::Idle,
            peer: None,
            first_in_room: false,
            remote_description_set: false,
            transport: None,
            factory,
            buffer: CandidateBuffer::new(),
            channel,
            media,
            local_tracks,
            command_rx,
            channel_rx,
            transport_rx,
            transport_tx,
            event_tx,
        }
    }

    pub async fn run(mut self) {
        info!(room = %self.room, "session event loop started");

        match self
            .factory
            .create(&self.local_tracks, self.transport_tx.clone())
            .await
        {
            Ok(transport) => self.transport = Some(transport),
            Err(e) => {
                error!("failed to create peer transport: {e:#}");
                self.teardown(Some(SessionEvent::Failed(SessionError::Transport(
                    e.to_string(),
                ))))
                .await;
                return;
            }
        }

        self.channel.join_room(self.room.clone()).await;
        self.set_state(NegotiationState::AwaitingPeer);

        while !self.state.is_terminal() {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(SessionCommand::Shutdown) | None => {
                        self.teardown(Some(SessionEvent::Ended(EndReason::LocalTeardown)))
                            .await;
                    }
                },
                evt = self.channel_rx.recv() => match evt {
                    Some(e) => self.handle_channel_event(e).await,
                    None => {
                        warn!("rendezvous channel closed unexpectedly");
                        self.teardown(Some(SessionEvent::Failed(SessionError::Link(
                            "rendezvous channel closed".to_string(),
                        ))))
                        .await;
                    }
                },
                evt = self.transport_rx.recv() => {
                    // We hold a sender, so this arm never yields None.
                    if let Some(e) = evt {
                        self.handle_transport_event(e).await;
                    }
                }
            }
        }

        info!(room = %self.room, "session event loop finished");
    }

    async fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Signal(msg) => self.handle_signal(msg).await,
            ChannelEvent::Reconnecting { attempt } => {
                warn!(attempt, "rendezvous link lost, reconnecting");
            }
            ChannelEvent::Down => {
                error!("rendezvous link is down");
                self.teardown(Some(SessionEvent::Failed(SessionError::Link(
                    "reconnect attempts exhausted".to_string(),
                ))))
                .await;
            }
        }
    }

    async fn handle_signal(&mut self, msg: SignalMessage) {
        if msg.room() != &self.room {
            debug!(room = %msg.room(), "ignoring signal for another room");
            return;
        }

        match msg {
            SignalMessage::Roster { peers, .. } => self.handle_roster(peers).await,
            SignalMessage::PeerJoined { peer, .. } => self.handle_peer_joined(peer).await,
            SignalMessage::PeerLeft { peer, .. } => self.handle_peer_left(peer).await,
            SignalMessage::Offer { peer, sdp, .. } => self.handle_offer(peer, sdp).await,
            SignalMessage::Answer { sdp, .. } => self.handle_answer(sdp).await,
            SignalMessage::IceCandidate { candidate, .. } => {
                self.handle_remote_candidate(candidate).await;
            }
            SignalMessage::JoinRoom { .. } => {
                debug!("ignoring echoed join-room");
            }
        }
    }

    /// Membership snapshot delivered by the relay right after joining.
    /// An empty roster makes us the future offerer; a populated one
    /// means a peer got here first and we wait for their offer.
    async fn handle_roster(&mut self, peers: Vec<PeerId>) {
        if self.state != NegotiationState::AwaitingPeer {
            debug!(state = ?self.state, "ignoring late roster");
            return;
        }
        self.first_in_room = peers.is_empty();
        if let Some(peer) = peers.into_iter().next() {
            info!(%peer, "peer already present, awaiting their offer");
            self.fix_peer(peer);
        } else {
            info!("alone in the room, waiting for a peer");
        }
    }

    /// Only the participant that arrived first reacts to this: it
    /// becomes the offerer. The newcomer got us in its roster and is
    /// already waiting for our offer.
    async fn handle_peer_joined(&mut self, peer: PeerId) {
        if self.state != NegotiationState::AwaitingPeer {
            debug!(%peer, state = ?self.state, "ignoring peer-joined");
            return;
        }
        if self.peer.is_some() {
            debug!(%peer, "peer already fixed, ignoring duplicate peer-joined");
            return;
        }
        // The relay announces arrivals only to participants already in
        // the room, so this report alone proves we got here first. It
        // may outrun the roster snapshot.
        self.first_in_room = true;
        info!(%peer, "peer arrived, initiating offer");
        self.fix_peer(peer);
        self.send_offer().await;
    }

    async fn handle_peer_left(&mut self, peer: PeerId) {
        match &self.peer {
            None => {
                debug!(%peer, "no active peer, ignoring peer-left");
                return;
            }
            Some(current) if current != &peer => {
                debug!(%peer, "peer-left for an unknown participant, ignoring");
                return;
            }
            Some(_) => {}
        }
        match self.state {
            NegotiationState::Offering => {
                // The peer vanished before answering: drop the
                // outstanding offer and wait for a new arrival.
                info!(%peer, "peer left before answering, resetting");
                self.reset_to_awaiting().await;
            }
            NegotiationState::Closed => {}
            // Covers Connected as well as the answerer abandoned
            // before the offer arrived (still AwaitingPeer).
            _ => {
                info!(%peer, "peer left, ending session");
                self.teardown(Some(SessionEvent::Ended(EndReason::PeerLeft)))
                    .await;
            }
        }
    }

    async fn handle_offer(&mut self, peer: Option<PeerId>, sdp: SessionDescription) {
        if !self.state.accepts_offer() {
            warn!(state = ?self.state, "dropping offer received while busy (glare)");
            return;
        }
        if let Some(peer) = peer {
            self.fix_peer(peer);
        }

        match self.apply_remote_offer(sdp).await {
            Ok(answer) => {
                self.remote_description_set = true;
                self.channel
                    .send(SignalMessage::Answer {
                        room: self.room.clone(),
                        peer: self.peer.clone(),
                        sdp: answer,
                    })
                    .await;
                self.set_state(NegotiationState::Answering);
                self.drain_buffered_candidates().await;
            }
            Err(e) => {
                error!("failed to answer offer: {e:#}");
                self.teardown(Some(SessionEvent::Failed(SessionError::Transport(
                    e.to_string(),
                ))))
                .await;
            }
        }
    }

    async fn handle_answer(&mut self, sdp: SessionDescription) {
        if !self.state.accepts_answer() {
            warn!(state = ?self.state, "dropping stale or duplicate answer");
            return;
        }
        let Some(transport) = self.transport.as_deref() else {
            return;
        };
        // The transport knows whether a local proposal is still
        // outstanding; a duplicate answer meets a stable transport.
        if transport.current_phase().await != NegotiationPhase::HaveLocalOffer {
            warn!("no outstanding local proposal, dropping answer");
            return;
        }
        match transport.set_remote_description(sdp).await {
            Ok(()) => {
                // Connected is driven by the transport's own
                // connectivity report, not by the answer arriving.
                self.remote_description_set = true;
                self.drain_buffered_candidates().await;
            }
            Err(e) => {
                error!("failed to apply answer: {e:#}");
                self.teardown(Some(SessionEvent::Failed(SessionError::Transport(
                    e.to_string(),
                ))))
                .await;
            }
        }
    }

    async fn handle_remote_candidate(&mut self, candidate: CandidateInit) {
        if self.state.is_terminal() {
            return;
        }
        if !self.remote_description_set {
            self.buffer.push(candidate);
            return;
        }
        let Some(transport) = self.transport.as_deref() else {
            return;
        };
        if let Err(e) = transport.add_ice_candidate(candidate).await {
            warn!("failed to apply remote candidate: {e}");
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateGenerated(candidate) => {
                if self.state.is_terminal() {
                    return;
                }
                self.channel
                    .send(SignalMessage::IceCandidate {
                        room: self.room.clone(),
                        peer: self.peer.clone(),
                        candidate,
                    })
                    .await;
            }
            TransportEvent::Connectivity(ConnectivityState::Connected) => {
                if matches!(
                    self.state,
                    NegotiationState::Offering | NegotiationState::Answering
                ) {
                    self.set_state(NegotiationState::Connected);
                    let _ = self.event_tx.send(SessionEvent::Connected);
                } else {
                    debug!(state = ?self.state, "ignoring connectivity report");
                }
            }
            TransportEvent::Connectivity(connectivity) => {
                if self.state.is_terminal() {
                    return;
                }
                error!(?connectivity, "transport lost connectivity");
                self.teardown(Some(SessionEvent::Failed(SessionError::Transport(
                    format!("connectivity {connectivity:?}"),
                ))))
                .await;
            }
            TransportEvent::RemoteMedia(info) => {
                if self.state.is_terminal() {
                    return;
                }
                let _ = self.event_tx.send(SessionEvent::RemoteMedia(info));
            }
        }
    }

    /// Create the local offer, install it and send it. Guarded so at
    /// most one local proposal is ever outstanding.
    async fn send_offer(&mut self) {
        if self.state != NegotiationState::AwaitingPeer {
            warn!(state = ?self.state, "offer already outstanding, not sending another");
            return;
        }
        match self.build_local_offer().await {
            Ok(offer) => {
                self.channel
                    .send(SignalMessage::Offer {
                        room: self.room.clone(),
                        peer: self.peer.clone(),
                        sdp: offer,
                    })
                    .await;
                self.set_state(NegotiationState::Offering);
            }
            Err(e) => {
                error!("failed to create offer: {e:#}");
                self.teardown(Some(SessionEvent::Failed(SessionError::Transport(
                    e.to_string(),
                ))))
                .await;
            }
        }
    }

    async fn build_local_offer(&mut self) -> Result<SessionDescription> {
        let Some(transport) = self.transport.as_deref() else {
            bail!("transport not initialized");
        };
        let offer = transport.create_offer().await?;
        transport.set_local_description(offer.clone()).await?;
        Ok(offer)
    }

    async fn apply_remote_offer(&mut self, sdp: SessionDescription) -> Result<SessionDescription> {
        let Some(transport) = self.transport.as_deref() else {
            bail!("transport not initialized");
        };
        transport.set_remote_description(sdp).await?;
        let answer = transport.create_answer().await?;
        transport.set_local_description(answer.clone()).await?;
        Ok(answer)
    }

    async fn drain_buffered_candidates(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        if let Some(transport) = self.transport.as_deref() {
            self.buffer.drain_into(transport).await;
        }
    }

    /// The peer identifier is fixed for the active negotiation once
    /// known; a conflicting value is a relay anomaly and is ignored.
    fn fix_peer(&mut self, peer: PeerId) {
        match &self.peer {
            None => self.peer = Some(peer),
            Some(current) if current != &peer => {
                warn!(%peer, %current, "conflicting peer id, keeping the fixed one");
            }
            Some(_) => {}
        }
    }

    /// Back to square one after the peer left mid-offer: fresh
    /// transport, empty buffer, no peer, and we are alone again.
    async fn reset_to_awaiting(&mut self) {
        if let Some(transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                warn!("failed to close stale transport: {e}");
            }
        }
        self.buffer.clear();
        self.peer = None;
        self.remote_description_set = false;
        self.first_in_room = true;

        // Fresh event channel: the retired transport keeps the old
        // sender, so its late reports never reach the new negotiation.
        let (transport_tx, transport_rx) = mpsc::channel(256);
        self.transport_tx = transport_tx;
        self.transport_rx = transport_rx;

        match self
            .factory
            .create(&self.local_tracks, self.transport_tx.clone())
            .await
        {
            Ok(transport) => {
                self.transport = Some(transport);
                self.set_state(NegotiationState::AwaitingPeer);
            }
            Err(e) => {
                error!("failed to recreate peer transport: {e:#}");
                self.teardown(Some(SessionEvent::Failed(SessionError::Transport(
                    e.to_string(),
                ))))
                .await;
            }
        }
    }

    /// Idempotent release of everything, in order: media capture,
    /// transport, channel, buffers. Emits at most one terminal event.
    async fn teardown(&mut self, terminal: Option<SessionEvent>) {
        if self.state.is_terminal() {
            return;
        }
        self.set_state(NegotiationState::Closed);

        self.media.release().await;
        if let Some(transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                warn!("failed to close transport: {e}");
            }
        }
        self.channel.close().await;
        self.buffer.clear();

        if let Some(event) = terminal {
            let _ = self.event_tx.send(event);
        }
    }

    fn set_state(&mut self, next: NegotiationState) {
        debug!(from = ?self.state, to = ?next, "negotiation state change");
        self.state = next;
    }
}
