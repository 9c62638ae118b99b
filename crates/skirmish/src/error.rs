//! Unified error type for Skirmish.

use skirmish_client::ClientError;
use skirmish_game::GameError;
use skirmish_map::MapError;
use skirmish_protocol::ProtocolError;
use skirmish_session::SessionError;
use skirmish_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors, so code
/// using the `skirmish` crate only has to name this one type.
#[derive(Debug, thiserror::Error)]
pub enum SkirmishError {
    /// Board construction or lookup failed.
    #[error(transparent)]
    Map(#[from] MapError),

    /// A transport-level error (bind, accept, connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A message couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The game refused a command or has shut down.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A server-side connection session failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The client driver failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}
