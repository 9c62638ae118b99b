//! The authoritative side of a Skirmish game.
//!
//! - [`GameServer`] owns the board and the turn order and decides whether
//!   each command is legal.
//! - [`MapUpdateListener`] is how connected players hear about changes.
//! - [`dispatch`] maps a decoded client message onto a server operation
//!   and produces the reply.
//! - [`spawn_game`] runs a `GameServer` as an actor; [`GameHandle`] is
//!   the cloneable way to talk to it from connection tasks.

mod actor;
mod config;
mod dispatch;
mod error;
mod listener;
mod server;
mod turn;

pub use actor::{GameHandle, spawn_game};
pub use config::GameConfig;
pub use dispatch::dispatch;
pub use error::GameError;
pub use listener::{ListenerId, MapUpdateListener};
pub use server::GameServer;
pub use turn::TurnQueue;
