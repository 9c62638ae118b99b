//! Board model for Skirmish.
//!
//! Everything that lives on the shared map is defined here:
//!
//! - **Geometry** ([`Point`], [`TileType`]): where things are and what
//!   the ground looks like.
//! - **Fixtures** ([`Fixture`], [`Unit`], [`ProxyUnit`], [`Feature`]):
//!   anything occupying a cell, including the redacted view of an
//!   opponent's unit.
//! - **Board** ([`Board`]): terrain plus fixtures, with per-player view
//!   derivation (fog of war).
//! - **Identifiers** ([`IdAllocator`]): unique fixture IDs for one game.
//!
//! This crate is pure data. It knows nothing about turns, connections or
//! the wire format.

mod board;
mod error;
mod fixture;
mod ids;
mod player;
mod point;
mod tile;

pub use board::Board;
pub use error::MapError;
pub use fixture::{Dice, Feature, Fixture, HealthTier, ProxyUnit, Unit, UnitKind};
pub use ids::IdAllocator;
pub use player::{FixtureId, PlayerNumber};
pub use point::Point;
pub use tile::TileType;
