use pairline_client::{RequeuePolicy, SessionPhase};
use pairline_core::{ClientMessage, PeerId, ServerMessage, SignalPayload};

use crate::integration::{init_tracing, spawn_session};
use crate::utils::TransportCall;

#[tokio::test]
async fn test_stop_abandons_offer_in_flight() {
    init_tracing();

    let mut session = spawn_session(RequeuePolicy::default());
    session.transports.hold_offers();
    let partner = PeerId::new();
    session.start().await;

    session.deliver(ServerMessage::Matched {
        partner_id: partner.clone(),
        initiator: true,
    });
    session.wait_phase(SessionPhase::Offering).await;
    session.transports.wait_for_log(0, 2).await;
    assert_eq!(session.media.held(), 1);

    session.handle.stop().unwrap();
    session.wait_sent(|m| *m == ClientMessage::Leave).await;
    session.wait_phase(SessionPhase::Idle).await;

    assert_eq!(session.media.held(), 0);
    assert_eq!(
        session.transports.log(0),
        vec![
            TransportCall::AttachMedia,
            TransportCall::CreateOffer,
            TransportCall::Close,
        ]
    );
    assert_eq!(
        session.link.count_sent(|m| matches!(
            m,
            ClientMessage::Signal {
                signal: SignalPayload::Offer { .. },
                ..
            }
        )),
        0
    );
}

#[tokio::test]
async fn test_next_during_offer_starts_clean_call() {
    init_tracing();

    let mut session = spawn_session(RequeuePolicy::default());
    session.transports.hold_offers();
    let first = PeerId::new();
    session.start().await;

    session.deliver(ServerMessage::Matched {
        partner_id: first.clone(),
        initiator: true,
    });
    session.transports.wait_for_log(0, 2).await;

    session.handle.next().unwrap();
    session.wait_sent(|m| *m == ClientMessage::Next).await;
    assert_eq!(session.media.held(), 0);

    // The first partner's answer to an offer never sent is ignored.
    session.deliver_signal(&first, SignalPayload::Answer { sdp: "late".into() });

    let second = PeerId::new();
    session.deliver(ServerMessage::Matched {
        partner_id: second.clone(),
        initiator: false,
    });
    session.deliver_signal(&second, SignalPayload::Offer { sdp: "offer".into() });
    session.wait_phase(SessionPhase::Connected).await;

    assert!(
        !session
            .transports
            .log(0)
            .iter()
            .any(|c| matches!(c, TransportCall::ApplyAnswer(_)))
    );
    assert_eq!(session.media.held(), 1);
}
