use crate::lobby::lobby_command::LobbyCommand;
use crate::matchmaking::{MatchEvent, Matchmaker};
use crate::relay::Relay;
use crate::signaling::SignalingOutput;
use pairline_core::{PeerId, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Single owner of matchmaking state.
///
/// Every connection task funnels its requests into one channel and this
/// loop handles them one at a time, so queue and pair table are only ever
/// touched from here.
pub struct Lobby {
    matchmaker: Matchmaker,
    relay: Relay,
    output: Arc<dyn SignalingOutput>,
    command_rx: mpsc::Receiver<LobbyCommand>,
}

impl Lobby {
    pub fn new(command_rx: mpsc::Receiver<LobbyCommand>, output: Arc<dyn SignalingOutput>) -> Self {
        Self {
            matchmaker: Matchmaker::new(),
            relay: Relay::new(output.clone()),
            output,
            command_rx,
        }
    }

    /// Must be spawned; returns once every command sender is dropped.
    pub async fn run(mut self) {
        info!("Lobby event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Lobby event loop finished");
    }

    async fn handle_command(&mut self, cmd: LobbyCommand) {
        let output = self.output.clone();
        let is_live = |id: &PeerId| output.is_connected(id);

        let events = match cmd {
            LobbyCommand::JoinQueue { peer_id } => {
                info!("Peer {} joined queue", peer_id);
                if !is_live(&peer_id) {
                    return;
                }
                self.matchmaker.try_match(&peer_id, is_live)
            }

            LobbyCommand::Next { peer_id } => {
                info!("Peer {} requested next partner", peer_id);
                if !is_live(&peer_id) {
                    return;
                }
                self.matchmaker.next(&peer_id, is_live)
            }

            LobbyCommand::Leave { peer_id } => {
                info!("Peer {} leaving", peer_id);
                self.matchmaker.force_leave(&peer_id, is_live)
            }

            LobbyCommand::Disconnect { peer_id } => {
                info!("Peer {} disconnected", peer_id);
                self.matchmaker.disconnect(&peer_id, is_live)
            }

            LobbyCommand::Signal {
                from_id,
                target_id,
                signal,
            } => {
                if let Err(e) = self.relay.relay(from_id, &target_id, signal).await {
                    warn!("Dropped signal for {}: {}", target_id, e);
                }
                return;
            }

            LobbyCommand::Stats { reply } => {
                let _ = reply.send(self.matchmaker.stats());
                return;
            }
        };

        self.dispatch(events).await;
    }

    async fn dispatch(&self, events: Vec<MatchEvent>) {
        for event in events {
            let recipient = event.recipient().clone();
            let msg = match event {
                MatchEvent::Matched {
                    partner_id,
                    initiator,
                    ..
                } => ServerMessage::Matched {
                    partner_id,
                    initiator,
                },
                MatchEvent::PartnerLeft { .. } => ServerMessage::PartnerLeft,
            };

            if let Err(e) = self.output.deliver(&recipient, msg).await {
                warn!("Failed to notify {}: {}", recipient, e);
            }
        }
    }
}
