use crate::utils::{
    FailingCapture, MockChannel, MockTransportFactory, SIGNAL_TIMEOUT_MS, TestSession,
};
use sinae_client::{
    ChannelEvent, ConnectivityState, Session, SessionError, SessionEvent, TransportEvent,
};
use sinae_core::{RoomCode, SignalMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

async fn next_event(s: &mut TestSession) -> SessionEvent {
    tokio::time::timeout(
        Duration::from_millis(SIGNAL_TIMEOUT_MS),
        s.handle.next_event(),
    )
    .await
    .expect("timed out waiting for a session event")
    .expect("session ended early")
}

#[tokio::test]
async fn capture_failure_aborts_before_the_room_is_joined() {
    let (channel, mut sent_rx) = MockChannel::new();
    let (_inject_tx, channel_rx) = mpsc::channel(64);
    let factory = MockTransportFactory::new();

    let result = Session::start(
        RoomCode::from("R1"),
        factory.clone(),
        Arc::new(FailingCapture),
        channel.clone(),
        channel_rx,
    )
    .await;

    assert!(matches!(result, Err(SessionError::Capability(_))));
    assert!(sent_rx.try_recv().is_err(), "no join may have gone out");
    assert_eq!(factory.created_count(), 0);
    assert_eq!(channel.times_closed(), 1);
}

#[tokio::test]
async fn exhausted_reconnects_fail_the_session() {
    let mut s = TestSession::start("R1").await;
    s.inject(s.roster(&[])).await;

    s.inject_event(ChannelEvent::Down).await;

    let event = next_event(&mut s).await;
    assert!(matches!(event, SessionEvent::Failed(SessionError::Link(_))));
    assert_eq!(s.factory.latest_log().times_closed(), 1);
    assert_eq!(s.channel.times_closed(), 1);
}

#[tokio::test]
async fn reconnecting_is_tolerated_mid_negotiation() {
    let mut s = TestSession::start("R1").await;
    s.inject(s.roster(&[])).await;

    s.inject_event(ChannelEvent::Reconnecting { attempt: 1 }).await;
    s.inject_event(ChannelEvent::Reconnecting { attempt: 2 }).await;

    // The link came back; negotiation proceeds as if nothing happened.
    s.inject(s.peer_joined("peer-b")).await;
    let offer = s.expect_signal().await;
    assert!(matches!(offer, SignalMessage::Offer { .. }));
    assert_eq!(s.channel.times_closed(), 0);
}

#[tokio::test]
async fn rejected_remote_description_fails_the_session() {
    let mut s = TestSession::start("R1").await;
    s.inject(s.roster(&["peer-a"])).await;
    s.settle().await;

    s.factory.reject_remote_descriptions();
    s.inject(s.offer_from("peer-a", "bad-offer")).await;

    let event = next_event(&mut s).await;
    assert!(matches!(
        event,
        SessionEvent::Failed(SessionError::Transport(_))
    ));
    assert_eq!(s.channel.answers_sent().await, 0);
    assert_eq!(s.channel.times_closed(), 1);
}

#[tokio::test]
async fn transport_connectivity_failure_fails_the_session() {
    let mut s = TestSession::start("R1").await;
    s.inject(s.roster(&[])).await;
    s.inject(s.peer_joined("peer-b")).await;
    let offer = s.expect_signal().await;
    assert!(matches!(offer, SignalMessage::Offer { .. }));

    s.factory
        .latest_event_tx()
        .send(TransportEvent::Connectivity(ConnectivityState::Failed))
        .await
        .unwrap();

    let event = next_event(&mut s).await;
    assert!(matches!(
        event,
        SessionEvent::Failed(SessionError::Transport(_))
    ));
    assert_eq!(s.factory.latest_log().times_closed(), 1);
}
