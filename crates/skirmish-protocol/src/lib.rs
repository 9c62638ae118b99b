//! Wire protocol for Skirmish.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Messages** ([`Message`], [`MessageKind`], [`MessageContext`]):
//!   one closed set of message variants, each carrying an explicit
//!   context (which player it concerns, or everyone).
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become
//!   bytes and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing that.
//!
//! ```text
//! Transport (frames) → Protocol (Message) → Session (player identity)
//! ```
//!
//! The board types that appear inside messages ([`Point`], [`Fixture`],
//! ...) are re-exported from `skirmish-map` for convenience.

mod codec;
mod error;
mod message;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{Message, MessageContext, MessageKind};

pub use skirmish_map::{Fixture, FixtureId, PlayerNumber, Point, TileType, UnitKind};
