//! Serves a randomly generated board over WebSockets.

use clap::Parser;
use skirmish::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
    /// Board height
    #[arg(long, default_value_t = 10)]
    rows: i32,
    /// Board width
    #[arg(long, default_value_t = 10)]
    cols: i32,
}

#[tokio::main]
async fn main() -> Result<(), SkirmishError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let board = Board::random(args.rows, args.cols, &mut rand::rng());
    tracing::info!(rows = args.rows, cols = args.cols, "generated board");

    let server = SkirmishServer::builder()
        .bind(&format!("{}:{}", args.host, args.port))
        .board(board)
        .build()
        .await?;
    tracing::info!(addr = %server.local_addr().map_err(TransportError::AcceptFailed)?, "listening");

    let game = server.game();
    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            game.shutdown().await?;
            Ok(())
        }
    }
}
