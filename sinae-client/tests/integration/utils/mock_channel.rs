use async_trait::async_trait;
use sinae_client::RendezvousChannel;
use sinae_core::SignalMessage;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, mpsc};

/// Mock rendezvous channel that captures everything the coordinator
/// sends to the relay.
pub struct MockChannel {
    tx: mpsc::UnboundedSender<SignalMessage>,
    sent: Arc<Mutex<Vec<SignalMessage>>>,
    close_count: AtomicUsize,
}

impl MockChannel {
    /// Create the mock and the receiver on which every outbound
    /// message is forwarded, in send order.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<SignalMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let channel = Arc::new(Self {
            tx,
            sent: Arc::new(Mutex::new(Vec::new())),
            close_count: AtomicUsize::new(0),
        });
        (channel, rx)
    }

    pub async fn sent(&self) -> Vec<SignalMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn offers_sent(&self) -> usize {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| matches!(m, SignalMessage::Offer { .. }))
            .count()
    }

    pub async fn answers_sent(&self) -> usize {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| matches!(m, SignalMessage::Answer { .. }))
            .count()
    }

    pub fn times_closed(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RendezvousChannel for MockChannel {
    async fn send(&self, msg: SignalMessage) {
        tracing::debug!("[MockChannel] send {msg:?}");
        self.sent.lock().await.push(msg.clone());
        let _ = self.tx.send(msg);
    }

    async fn close(&self) {
        self.close_count.fetch_add(1, Ordering::SeqCst);
    }
}
