//! Joins a Skirmish server, fetches the map, and logs what happens until
//! interrupted.

use clap::Parser;
use skirmish::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Server address
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
    /// Server port
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
    /// Player number to ask for; the next free one is tried if it's taken
    #[arg(long, default_value_t = 0)]
    player: i32,
}

#[tokio::main]
async fn main() -> Result<(), SkirmishError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let url = format!("ws://{}:{}", args.host, args.port);
    let conn = WebSocketConnection::connect(&url).await?;
    tracing::info!(%url, id = %conn.id(), "connected");

    let mut client =
        ClientConnection::start(conn, JsonCodec, ClientMirror::new(PlayerNumber(args.player)));

    loop {
        tokio::select! {
            event = client.next_event() => {
                let Some(message) = event else {
                    tracing::info!("server closed the connection");
                    return Ok(());
                };
                log_event(&client, &message);
                if client.mirror().server_quit() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    client.quit().await?;
    Ok(())
}

fn log_event(client: &ClientConnection<WebSocketConnection>, message: &Message) {
    let mirror = client.mirror();
    match &message.kind {
        MessageKind::Acknowledged => {
            tracing::info!(player = %mirror.player(), "joined");
        }
        MessageKind::TurnEnded { next } => {
            tracing::info!(
                %next,
                mine = mirror.is_my_turn(),
                cells = mirror.board().len(),
                fixtures = mirror.board().fixture_count(),
                "turn"
            );
        }
        MessageKind::ProtocolError { reason } => {
            tracing::warn!(%reason, "server rejected request");
        }
        _ => tracing::debug!(%message, "event"),
    }
}
