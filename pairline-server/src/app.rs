use crate::config::ServerConfig;
use crate::lobby::{Lobby, LobbyCommand};
use crate::matchmaking::MatchStats;
use crate::signaling::{SignalingService, ws_handler};
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use pairline_core::utils::HEALTH_MESSAGE;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Creates the signaling registry and spawns the lobby that serves it.
pub fn spawn_lobby(config: &ServerConfig) -> SignalingService {
    let (lobby_tx, lobby_rx) = mpsc::channel(config.lobby_capacity);
    let service = SignalingService::new(lobby_tx, config.ice_servers.clone());

    let lobby = Lobby::new(lobby_rx, Arc::new(service.clone()));
    tokio::spawn(lobby.run());

    service
}

pub fn router(service: SignalingService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .layer(cors)
        .with_state(service)
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, config: ServerConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let service = spawn_lobby(&config);
    let app = router(service);

    info!(
        "Signaling server listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let addr = config.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    serve_on(listener, config, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown requested");
    })
    .await
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: HEALTH_MESSAGE,
    })
}

async fn stats(State(service): State<SignalingService>) -> Result<Json<MatchStats>, StatusCode> {
    let (reply, rx) = oneshot::channel();
    service
        .lobby_tx
        .send(LobbyCommand::Stats { reply })
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    rx.await
        .map(Json)
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)
}
