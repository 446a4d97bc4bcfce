pub mod relay_tests;

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::Level;

use pairline_server::{Lobby, LobbyCommand, MatchStats};

use crate::utils::{Delivery, MockSignalingOutput};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_lobby() -> (
    mpsc::Sender<LobbyCommand>,
    MockSignalingOutput,
    mpsc::UnboundedReceiver<Delivery>,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<LobbyCommand>(100);
    let (output, delivery_rx) = MockSignalingOutput::new();

    let lobby = Lobby::new(cmd_rx, Arc::new(output.clone()));

    tokio::spawn(async move {
        lobby.run().await;
    });

    (cmd_tx, output, delivery_rx)
}

/// Round-trips a stats request; everything sent before it has been handled
/// once this returns.
pub async fn lobby_stats(cmd_tx: &mpsc::Sender<LobbyCommand>) -> MatchStats {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(LobbyCommand::Stats { reply })
        .await
        .expect("Lobby is gone");
    rx.await.expect("Lobby dropped the stats request")
}
