//! `SkirmishServer` builder and accept loop.
//!
//! Ties the layers together: a WebSocket transport accepts connections,
//! each one gets a [`Session`] speaking JSON, and every session talks to
//! the one game actor.

use skirmish_game::{GameConfig, GameHandle, GameServer, spawn_game};
use skirmish_map::Board;
use skirmish_protocol::JsonCodec;
use skirmish_session::{Session, SessionConfig};
use skirmish_transport::{Connection, Transport, WebSocketTransport};

use crate::SkirmishError;

/// Board used when the builder isn't given one.
const DEFAULT_ROWS: i32 = 10;
const DEFAULT_COLUMNS: i32 = 10;

/// Builder for configuring and starting a Skirmish server.
///
/// # Example
///
/// ```rust,no_run
/// use skirmish::prelude::*;
///
/// # async fn serve() -> Result<(), SkirmishError> {
/// let server = SkirmishServer::builder()
///     .bind("0.0.0.0:8080")
///     .board(Board::filled(8, 8, TileType::Lawn))
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct SkirmishServerBuilder {
    bind_addr: String,
    board: Option<Board>,
    session_config: SessionConfig,
    game_config: GameConfig,
}

impl SkirmishServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            board: None,
            session_config: SessionConfig::default(),
            game_config: GameConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the board the game starts with. Fixtures already on it keep
    /// their IDs. Without one, the server generates a random
    /// 10x10 board.
    pub fn board(mut self, board: Board) -> Self {
        self.board = Some(board);
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Starts the game actor and binds the listener.
    ///
    /// # Errors
    /// Fails if the board holds duplicate fixture IDs or the address
    /// can't be bound.
    pub async fn build(self) -> Result<SkirmishServer, SkirmishError> {
        let board = match self.board {
            Some(board) => board,
            None => Board::random(DEFAULT_ROWS, DEFAULT_COLUMNS, &mut rand::rng()),
        };
        let game = GameServer::new(board)?;
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let game = spawn_game(game, &self.game_config);

        Ok(SkirmishServer {
            transport,
            game,
            session_config: self.session_config,
        })
    }
}

impl Default for SkirmishServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Skirmish server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SkirmishServer {
    transport: WebSocketTransport,
    game: GameHandle,
    session_config: SessionConfig,
}

impl SkirmishServer {
    /// Creates a new builder.
    pub fn builder() -> SkirmishServerBuilder {
        SkirmishServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the running game, e.g. for changing terrain from the
    /// host or shutting the game down.
    pub fn game(&self) -> GameHandle {
        self.game.clone()
    }

    /// Runs the accept loop.
    ///
    /// Spawns one session per accepted connection. A failed accept is
    /// logged and the loop keeps going. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), SkirmishError> {
        tracing::info!("Skirmish server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let conn_id = conn.id();
                    let session = Session::new(
                        conn,
                        self.game.clone(),
                        JsonCodec,
                        self.session_config.clone(),
                    );
                    tokio::spawn(async move {
                        if let Err(e) = session.run().await {
                            tracing::debug!(%conn_id, error = %e, "session ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
