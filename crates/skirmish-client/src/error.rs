//! Error types for the client layer.

use skirmish_protocol::ProtocolError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The connection failed while sending or receiving.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A message couldn't be encoded or a frame couldn't be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The connection has already been shut down.
    #[error("connection closed")]
    Closed,
}

impl ClientError {
    pub(crate) fn transport(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(e))
    }
}
