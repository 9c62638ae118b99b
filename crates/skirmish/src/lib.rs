//! # Skirmish
//!
//! A small turn-based tactics game played over WebSockets. The server
//! owns the authoritative board; each player sees their own units in
//! full and everyone else's through the fog of war.
//!
//! This crate wires the layers together and re-exports what an
//! application needs:
//!
//! - `skirmish-map`: board, terrain, fixtures, ID allocation
//! - `skirmish-protocol`: the message taxonomy and codec
//! - `skirmish-transport`: WebSocket and in-memory connections
//! - `skirmish-game`: the game rules behind a single actor task
//! - `skirmish-session`: one server-side session per connection
//! - `skirmish-client`: the client's replica and connection driver
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skirmish::prelude::*;
//!
//! # async fn serve() -> Result<(), SkirmishError> {
//! let server = SkirmishServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod server;

pub use error::SkirmishError;
pub use server::{SkirmishServer, SkirmishServerBuilder};

/// Everything most applications need, in one import.
pub mod prelude {
    pub use crate::{SkirmishError, SkirmishServer, SkirmishServerBuilder};

    pub use skirmish_client::{ClientConnection, ClientError, ClientMirror};
    pub use skirmish_game::{GameConfig, GameError, GameHandle, GameServer};
    pub use skirmish_map::{
        Board, Dice, Feature, Fixture, FixtureId, HealthTier, IdAllocator, MapError, PlayerNumber,
        Point, ProxyUnit, TileType, Unit, UnitKind,
    };
    pub use skirmish_protocol::{
        Codec, JsonCodec, Message, MessageContext, MessageKind, ProtocolError,
    };
    pub use skirmish_session::{SessionConfig, SessionError};
    pub use skirmish_transport::{
        Connection, ConnectionId, Transport, TransportError, WebSocketConnection,
        WebSocketTransport,
    };
}
