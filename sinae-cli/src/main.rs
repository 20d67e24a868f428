use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use dialoguer::Input;
use sinae_client::{
    NullCapture, ReconnectPolicy, Session, SessionEvent, TransportConfig, WsChannel,
    WebRtcTransportFactory,
};
use sinae_core::RoomCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Join a two-party call room and print session events.
#[derive(Parser)]
#[command(name = "sinae")]
struct Cli {
    /// Rendezvous relay WebSocket URL.
    #[arg(long, default_value = "wss://sinaes.up.railway.app/ws")]
    url: String,

    /// Room code to join. Prompted for when omitted.
    #[arg(long)]
    room: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let room = match cli.room {
        Some(room) => room,
        None => Input::new()
            .with_prompt("Room code")
            .interact_text()
            .context("failed to read room code")?,
    };

    let (channel, channel_rx) = WsChannel::connect(&cli.url, ReconnectPolicy::default())
        .await
        .context("could not reach the rendezvous relay")?;

    let factory = Arc::new(WebRtcTransportFactory::new(TransportConfig::default()));
    let media = Arc::new(NullCapture);

    let mut session = Session::start(
        RoomCode::from(room.clone()),
        factory,
        media,
        Arc::new(channel),
        channel_rx,
    )
    .await
    .with_context(|| format!("could not start a session in room '{room}'"))?;

    println!("{} {}", "Joined room".green().bold(), room.cyan());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Leaving room...".yellow());
                session.stop().await;
                break;
            }
            event = session.next_event() => match event {
                Some(SessionEvent::Connected) => {
                    println!("{}", "Peer connected".green().bold());
                }
                Some(SessionEvent::RemoteMedia(info)) => {
                    println!("{} {} ({})", "Remote media:".cyan(), info.track_id, info.kind);
                }
                Some(SessionEvent::Ended(reason)) => {
                    println!("{} {:?}", "Session ended:".yellow().bold(), reason);
                    break;
                }
                Some(SessionEvent::Failed(err)) => {
                    println!("{} {}", "Session failed:".red().bold(), err);
                    break;
                }
                None => break,
            }
        }
    }

    Ok(())
}
