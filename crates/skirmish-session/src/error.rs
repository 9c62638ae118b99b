//! Error types for the session layer.

use std::time::Duration;

use skirmish_game::GameError;
use skirmish_protocol::ProtocolError;

/// Why a session ended abnormally.
///
/// Client mistakes (bad frames, illegal commands) never show up here;
/// those are answered with a `ProtocolError` message and the session
/// carries on.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The connection failed while sending or receiving.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An outgoing message couldn't be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The game actor has gone away.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Nothing arrived within the configured idle timeout.
    #[error("no traffic for {0:?}")]
    IdleTimeout(Duration),
}

impl SessionError {
    pub(crate) fn transport(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(e))
    }
}
