//! Client side of Skirmish.
//!
//! [`ClientMirror`] is a pure state machine: it keeps the local replica
//! of the board and decides what to send back for each server message.
//! [`ClientConnection`] runs a mirror over a live [`Connection`]
//! (`skirmish_transport::Connection`) with the same reader/writer task
//! split the server uses.

mod connection;
mod error;
mod mirror;

pub use connection::ClientConnection;
pub use error::ClientError;
pub use mirror::ClientMirror;
