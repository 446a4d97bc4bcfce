use crate::lobby::LobbyCommand;
use crate::signaling::SignalingService;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use pairline_core::{ClientMessage, PeerId, ServerMessage};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    let peer_id = PeerId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, peer_id, service))
}

async fn handle_socket(socket: WebSocket, peer_id: PeerId, service: SignalingService) {
    info!("New connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_peer(peer_id.clone(), tx);

    let welcome = ServerMessage::Welcome {
        peer_id: peer_id.clone(),
        ice_servers: service.get_ice_servers(),
    };
    if let Err(e) = service.send_message(&peer_id, &welcome) {
        error!("Failed to greet {}: {}", peer_id, e);
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let peer_id = peer_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => {
                        let client_msg = match serde_json::from_str::<ClientMessage>(text.as_str()) {
                            Ok(m) => m,
                            Err(e) => {
                                warn!("Invalid frame from {}: {}", peer_id, e);
                                continue;
                            }
                        };

                        let cmd = into_command(peer_id.clone(), client_msg);
                        if let Err(e) = service.lobby_tx.send(cmd).await {
                            error!("Lobby died: {}", e);
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.remove_peer(&peer_id);
    let _ = service
        .lobby_tx
        .send(LobbyCommand::Disconnect {
            peer_id: peer_id.clone(),
        })
        .await;

    info!("Connection closed: {}", peer_id);
}

fn into_command(peer_id: PeerId, msg: ClientMessage) -> LobbyCommand {
    match msg {
        ClientMessage::JoinQueue => LobbyCommand::JoinQueue { peer_id },
        ClientMessage::Next => LobbyCommand::Next { peer_id },
        ClientMessage::Leave => LobbyCommand::Leave { peer_id },
        ClientMessage::Signal { target_id, signal } => {
            debug!("Signal {} from {} to {}", signal.kind(), peer_id, target_id);
            LobbyCommand::Signal {
                from_id: peer_id,
                target_id,
                signal,
            }
        }
    }
}
