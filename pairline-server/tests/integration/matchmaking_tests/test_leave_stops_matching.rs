use pairline_core::ServerMessage;
use pairline_server::LobbyCommand;

use crate::integration::{create_test_lobby, init_tracing, lobby_stats};
use crate::utils::take_deliveries;

#[tokio::test]
async fn test_leave_stops_matching() {
    init_tracing();

    let (cmd_tx, output, mut delivery_rx) = create_test_lobby();
    let (a, b) = (output.connect(), output.connect());

    for peer_id in [&a, &b] {
        cmd_tx
            .send(LobbyCommand::JoinQueue {
                peer_id: peer_id.clone(),
            })
            .await
            .unwrap();
    }
    take_deliveries(&mut delivery_rx, 2).await;

    cmd_tx
        .send(LobbyCommand::Leave { peer_id: a.clone() })
        .await
        .unwrap();
    take_deliveries(&mut delivery_rx, 1).await;

    // Only b waits; the leaver is not put back in line.
    let stats = lobby_stats(&cmd_tx).await;
    assert_eq!(stats.waiting, 1);
    assert_eq!(stats.active_pairs, 0);
    assert_eq!(output.deliveries_to(&b).last(), Some(&ServerMessage::PartnerLeft));
    assert_eq!(output.deliveries_to(&a).len(), 1, "a only ever saw its match");
}

#[tokio::test]
async fn test_leave_while_waiting() {
    init_tracing();

    let (cmd_tx, output, _delivery_rx) = create_test_lobby();
    let a = output.connect();

    cmd_tx
        .send(LobbyCommand::JoinQueue { peer_id: a.clone() })
        .await
        .unwrap();
    cmd_tx
        .send(LobbyCommand::Leave { peer_id: a.clone() })
        .await
        .unwrap();

    assert_eq!(lobby_stats(&cmd_tx).await.waiting, 0);
    assert_eq!(output.delivery_count(), 0);
}
