use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Select;
use pairline::client::{
    ConnectionSession, RequeuePolicy, RtcTransportFactory, SessionConfig, SessionHandle,
    SessionPhase, SessionUpdate, SyntheticMedia, WsSignalingClient,
};
use pairline::model::IceServerConfig;
use pairline::server::{ServerConfig, serve};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pairline")]
#[command(about = "Random video chat: signaling server and headless client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the matchmaking and signaling server.
    Serve(ServeArgs),
    /// Join the queue as a headless peer with synthetic media.
    Chat(ChatArgs),
}

#[derive(clap::Args)]
struct ServeArgs {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// TURN relay announced to clients next to the default STUN server.
    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME", requires = "turn_url")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL", requires = "turn_url")]
    turn_credential: Option<String>,
}

impl ServeArgs {
    fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig {
            host: self.host,
            port: self.port,
            ..Default::default()
        };

        if let Some(url) = self.turn_url {
            config.ice_servers.push(IceServerConfig {
                urls: vec![url],
                username: self.turn_username,
                credential: self.turn_credential,
            });
        }

        config
    }
}

#[derive(clap::Args)]
struct ChatArgs {
    /// WebSocket endpoint of the signaling server.
    #[arg(long, env = "PAIRLINE_SERVER", default_value = "ws://127.0.0.1:3001/ws")]
    server: String,

    /// Delay before rejoining the queue after a partner leaves.
    #[arg(long, default_value_t = 2000)]
    requeue_ms: u64,

    #[arg(long)]
    no_requeue: bool,
}

impl ChatArgs {
    fn requeue_policy(&self) -> RequeuePolicy {
        let debounce = Duration::from_millis(self.requeue_ms);
        if self.no_requeue {
            RequeuePolicy {
                enabled: false,
                debounce,
            }
        } else {
            RequeuePolicy::with_debounce(debounce)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Commands::Serve(args) => {
            println!("{}", "🚀 Starting Pairline signaling server...".green().bold());
            serve(args.into_config()).await
        }
        Commands::Chat(args) => run_chat(args).await,
    }
}

async fn run_chat(args: ChatArgs) -> Result<()> {
    println!("{} {}", "📡 Connecting to".cyan(), args.server);

    let (signaling, inbound) = WsSignalingClient::connect(&args.server).await?;
    let config = SessionConfig {
        requeue: args.requeue_policy(),
        ..Default::default()
    };
    let (session, handle, updates) = ConnectionSession::new(
        config,
        Arc::new(signaling),
        inbound,
        Arc::new(SyntheticMedia::new()),
        Arc::new(RtcTransportFactory),
    );

    let session_task = tokio::spawn(session.run());
    tokio::spawn(print_updates(updates));

    tokio::task::spawn_blocking(move || prompt_loop(handle))
        .await
        .context("Prompt task failed")??;

    session_task.await.context("Session task failed")?;
    info!("Chat finished");
    Ok(())
}

/// Blocks on terminal input; dropping the handle at the end stops the session.
fn prompt_loop(handle: SessionHandle) -> Result<()> {
    let actions = ["Start", "Next", "Stop", "Quit"];

    loop {
        let choice = Select::new()
            .with_prompt("Action")
            .items(&actions)
            .default(0)
            .interact()?;

        match choice {
            0 => handle.start()?,
            1 => handle.next()?,
            2 => handle.stop()?,
            _ => {
                let _ = handle.stop();
                return Ok(());
            }
        }
    }
}

async fn print_updates(mut updates: mpsc::UnboundedReceiver<SessionUpdate>) {
    while let Some(update) = updates.recv().await {
        match update {
            SessionUpdate::Phase(SessionPhase::Connected) => {
                println!("{}", "✨ Connected".green().bold())
            }
            SessionUpdate::Phase(phase) => println!("   {:?}", phase),
            SessionUpdate::Matched {
                partner_id,
                initiator,
            } => {
                let role = if initiator { "calling" } else { "answering" };
                println!("{} {} ({})", "🤝 Matched with".cyan(), partner_id, role);
            }
            SessionUpdate::Error(e) => println!("{} {}", "⚠️  Error:".red().bold(), e),
        }
    }
}
