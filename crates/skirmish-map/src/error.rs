//! Error types for the map layer.

use crate::{FixtureId, Point};

/// Errors raised by the board model and the identifier allocator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// The point has no terrain, so it is not part of the board.
    #[error("{0} is not on the board")]
    NotOnBoard(Point),

    /// A fixture was supplied for a point that has no terrain.
    #[error("can't have a fixture at {0}, which has no terrain")]
    FixtureOffBoard(Point),

    /// The identifier has already been handed out or registered.
    #[error("duplicate fixture ID {0}")]
    DuplicateId(FixtureId),

    /// Every identifier below the allocator's limit is in use.
    #[error("exhausted all fixture IDs")]
    IdsExhausted,
}
