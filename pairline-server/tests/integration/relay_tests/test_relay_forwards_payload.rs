use pairline_core::{IceCandidateDescriptor, ServerMessage, SignalPayload};
use pairline_server::LobbyCommand;

use crate::integration::{create_test_lobby, init_tracing};
use crate::utils::take_deliveries;

#[tokio::test]
async fn test_relay_forwards_payload() {
    init_tracing();

    let (cmd_tx, output, mut delivery_rx) = create_test_lobby();
    let (a, b) = (output.connect(), output.connect());

    let signals = vec![
        SignalPayload::Offer {
            sdp: "v=0\r\no=- 1 1 IN IP4 0.0.0.0\r\n".to_string(),
        },
        SignalPayload::Candidate {
            candidate: Some(IceCandidateDescriptor {
                candidate: "candidate:1 1 udp 2122260223 10.0.0.2 50000 typ host".to_string(),
                sdp_mid: Some("0".to_string()),
                sdp_m_line_index: Some(0),
                username_fragment: None,
            }),
        },
        SignalPayload::Candidate { candidate: None },
    ];

    for signal in signals.clone() {
        cmd_tx
            .send(LobbyCommand::Signal {
                from_id: a.clone(),
                target_id: b.clone(),
                signal,
            })
            .await
            .unwrap();
    }

    let deliveries = take_deliveries(&mut delivery_rx, 3).await;
    for (delivery, signal) in deliveries.into_iter().zip(signals) {
        assert_eq!(delivery.peer_id, b);
        assert_eq!(
            delivery.msg,
            ServerMessage::Signal {
                from_id: a.clone(),
                signal,
            }
        );
    }
}

#[tokio::test]
async fn test_relay_does_not_require_pairing() {
    init_tracing();

    let (cmd_tx, output, mut delivery_rx) = create_test_lobby();
    let (a, stranger) = (output.connect(), output.connect());

    cmd_tx
        .send(LobbyCommand::Signal {
            from_id: a.clone(),
            target_id: stranger.clone(),
            signal: SignalPayload::Answer { sdp: "v=0".into() },
        })
        .await
        .unwrap();

    let delivery = take_deliveries(&mut delivery_rx, 1).await;
    assert_eq!(delivery[0].peer_id, stranger);
}
