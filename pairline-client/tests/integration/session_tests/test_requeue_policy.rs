use std::time::Duration;

use pairline_client::{RequeuePolicy, SessionPhase};
use pairline_core::{ClientMessage, PeerId, ServerMessage, SignalPayload};
use tokio::time::Instant;

use crate::integration::{init_tracing, is_join_queue, spawn_session};

#[tokio::test(start_paused = true)]
async fn test_partner_left_requeues_after_debounce() {
    init_tracing();

    let mut session = spawn_session(RequeuePolicy::default());
    let partner = PeerId::new();
    session.connect_as_offerer(&partner).await;

    let left_at = Instant::now();
    session.deliver(ServerMessage::PartnerLeft);
    session.wait_phase(SessionPhase::Disconnected).await;

    session.wait_sent(is_join_queue).await;
    assert!(left_at.elapsed() >= RequeuePolicy::DEFAULT_DEBOUNCE);
    session.wait_phase(SessionPhase::AwaitingMatch).await;
    assert_eq!(session.link.count_sent(is_join_queue), 2);
}

#[tokio::test(start_paused = true)]
async fn test_debounce_is_configurable() {
    init_tracing();

    let debounce = Duration::from_millis(300);
    let mut session = spawn_session(RequeuePolicy::with_debounce(debounce));
    let partner = PeerId::new();
    session.connect_as_offerer(&partner).await;

    let left_at = Instant::now();
    session.deliver(ServerMessage::PartnerLeft);
    session.wait_sent(is_join_queue).await;

    let waited = left_at.elapsed();
    assert!(waited >= debounce);
    assert!(waited < RequeuePolicy::DEFAULT_DEBOUNCE);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_debounce_cancels_requeue() {
    init_tracing();

    let mut session = spawn_session(RequeuePolicy::default());
    let partner = PeerId::new();
    session.connect_as_offerer(&partner).await;

    session.deliver(ServerMessage::PartnerLeft);
    session.wait_phase(SessionPhase::Disconnected).await;
    session.handle.stop().unwrap();
    session.wait_sent(|m| *m == ClientMessage::Leave).await;
    session.wait_phase(SessionPhase::Idle).await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(session.link.count_sent(is_join_queue), 1);
}

#[tokio::test(start_paused = true)]
async fn test_match_during_debounce_cancels_requeue() {
    init_tracing();

    let mut session = spawn_session(RequeuePolicy::default());
    let first = PeerId::new();
    session.connect_as_offerer(&first).await;

    session.deliver(ServerMessage::PartnerLeft);
    session.wait_phase(SessionPhase::Disconnected).await;

    let second = PeerId::new();
    session.deliver(ServerMessage::Matched {
        partner_id: second.clone(),
        initiator: false,
    });
    session.wait_phase(SessionPhase::AwaitingMatch).await;
    session.deliver_signal(&second, SignalPayload::Offer { sdp: "offer".into() });
    session.wait_phase(SessionPhase::Connected).await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(session.link.count_sent(is_join_queue), 1);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_policy_never_requeues() {
    init_tracing();

    let mut session = spawn_session(RequeuePolicy::disabled());
    let partner = PeerId::new();
    session.connect_as_offerer(&partner).await;

    session.deliver(ServerMessage::PartnerLeft);
    session.wait_phase(SessionPhase::Disconnected).await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(session.link.count_sent(is_join_queue), 1);

    // A manual start still works.
    session.handle.start().unwrap();
    session.wait_sent(is_join_queue).await;
    session.wait_phase(SessionPhase::AwaitingMatch).await;
}

#[tokio::test(start_paused = true)]
async fn test_match_after_stop_is_declined() {
    init_tracing();

    let mut session = spawn_session(RequeuePolicy::default());
    session.start().await;
    session.handle.stop().unwrap();
    session.wait_phase(SessionPhase::Idle).await;

    let partner = PeerId::new();
    session.deliver(ServerMessage::Matched {
        partner_id: partner,
        initiator: true,
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(session.link.count_sent(|m| *m == ClientMessage::Leave), 2);
    assert_eq!(session.transports.created(), 0);
}
