use crate::channel::{ChannelEvent, ReconnectPolicy, RendezvousChannel};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use sinae_core::{RoomCode, SignalMessage};
use std::sync::{Arc, Mutex};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum Outbound {
    Signal(SignalMessage),
    Close,
}

/// WebSocket rendezvous link with bounded reconnect.
///
/// A single spawned task owns the socket: outbound messages are queued
/// through a channel and inbound frames are parsed and forwarded as
/// `ChannelEvent`s. When the link drops the task retries with
/// exponential backoff, surfacing each attempt as
/// `ChannelEvent::Reconnecting` and the give-up as `ChannelEvent::Down`.
pub struct WsChannel {
    out_tx: mpsc::UnboundedSender<Outbound>,
    last_room: Arc<Mutex<Option<RoomCode>>>,
}

impl WsChannel {
    /// Connect to the relay. Returns the channel handle plus the
    /// receiver for inbound events; the receiver is handed out exactly
    /// once, to whoever runs the session event loop.
    pub async fn connect(
        url: &str,
        policy: ReconnectPolicy,
    ) -> Result<(Self, mpsc::Receiver<ChannelEvent>)> {
        let (ws, _) = connect_async(url)
            .await
            .with_context(|| format!("failed to connect to rendezvous relay at {url}"))?;
        info!(%url, "rendezvous link established");

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(256);
        let last_room = Arc::new(Mutex::new(None));

        tokio::spawn(run_link(
            ws,
            url.to_string(),
            policy,
            out_rx,
            event_tx,
            last_room.clone(),
        ));

        Ok((Self { out_tx, last_room }, event_rx))
    }
}

#[async_trait]
impl RendezvousChannel for WsChannel {
    async fn send(&self, msg: SignalMessage) {
        // Remembered so the link can rejoin the room after a reconnect.
        if let SignalMessage::JoinRoom { room } = &msg {
            if let Ok(mut guard) = self.last_room.lock() {
                *guard = Some(room.clone());
            }
        }
        if self.out_tx.send(Outbound::Signal(msg)).is_err() {
            warn!("rendezvous link is closed, dropping outbound message");
        }
    }

    async fn close(&self) {
        let _ = self.out_tx.send(Outbound::Close);
    }
}

async fn run_link(
    mut ws: WsStream,
    url: String,
    policy: ReconnectPolicy,
    mut out_rx: mpsc::UnboundedReceiver<Outbound>,
    event_tx: mpsc::Sender<ChannelEvent>,
    last_room: Arc<Mutex<Option<RoomCode>>>,
) {
    loop {
        let (mut sink, mut stream) = ws.split();

        // Connected: pump frames in both directions until the socket
        // breaks or the channel is closed locally.
        loop {
            tokio::select! {
                out = out_rx.recv() => match out {
                    Some(Outbound::Signal(msg)) => match serde_json::to_string(&msg) {
                        Ok(json) => {
                            if sink.send(Message::Text(json)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => error!("failed to serialize signal message: {e}"),
                    },
                    Some(Outbound::Close) | None => {
                        let _ = sink.send(Message::Close(None)).await;
                        return;
                    }
                },
                inbound = stream.next() => match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<SignalMessage>(&text) {
                            Ok(signal) => {
                                if event_tx.send(ChannelEvent::Signal(signal)).await.is_err() {
                                    return;
                                }
                            }
                            Err(e) => warn!("invalid signal message from relay: {e}"),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("websocket error: {e}");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }

        // Link broke: bounded backoff, each attempt observable.
        let mut attempt = 0;
        ws = loop {
            attempt += 1;
            if attempt > policy.max_attempts {
                let _ = event_tx.send(ChannelEvent::Down).await;
                return;
            }
            if event_tx
                .send(ChannelEvent::Reconnecting { attempt })
                .await
                .is_err()
            {
                return;
            }
            tokio::time::sleep(policy.delay_for(attempt)).await;
            match connect_async(&url).await {
                Ok((ws, _)) => break ws,
                Err(e) => warn!(attempt, "reconnect failed: {e}"),
            }
        };
        info!("rendezvous link re-established");

        // Rejoin the room we were in; the relay treats it as a fresh
        // membership announcement.
        let room = last_room.lock().ok().and_then(|guard| guard.clone());
        if let Some(room) = room {
            if let Ok(json) = serde_json::to_string(&SignalMessage::JoinRoom { room }) {
                // A failure here shows up as a broken socket on the
                // next iteration.
                let _ = ws.send(Message::Text(json)).await;
            }
        }
    }
}
