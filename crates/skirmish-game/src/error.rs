//! Error types for the game layer.
//!
//! The `Display` text of each variant is what a rejected client sees in
//! its `ProtocolError` message.

use skirmish_map::{FixtureId, MapError, PlayerNumber, Point};

/// Why a game operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The player number is already in the turn queue.
    /// Negative numbers are reserved; `PlayerNumber::NONE` owns neutral
    /// features.
    #[error("{0} is not a valid player number")]
    InvalidPlayer(PlayerNumber),

    #[error("{0} already joined")]
    PlayerPresent(PlayerNumber),

    /// Only the player at the head of the turn queue may act.
    #[error("Not your turn")]
    NotYourTurn,

    #[error("No such unit {0}")]
    NoSuchUnit(FixtureId),

    #[error("Only units can move")]
    OnlyUnitsCanMove,

    #[error("You don't own that unit")]
    NotYourUnit,

    /// The client's idea of where the unit is doesn't match the board.
    #[error("Starting point {claimed} doesn't match unit's location {actual}")]
    LocationMismatch { claimed: Point, actual: Point },

    #[error("Destination {0} isn't empty")]
    DestinationOccupied(Point),

    #[error("Can't move a proxy unit")]
    CannotMoveProxy,

    #[error("Something already there at {0}")]
    Occupied(Point),

    #[error("Proxy units not allowed in server map")]
    ProxyNotAllowed,

    #[error("Nothing there at {0}")]
    NothingThere(Point),

    #[error("You don't own that fixture")]
    NotYourFixture,

    /// A message that has no meaning as a game command.
    #[error("Can't handle {0} here")]
    UnexpectedMessage(&'static str),

    /// A board-level failure (off the board, ID exhaustion, ...).
    #[error(transparent)]
    Map(#[from] MapError),

    /// The game actor has stopped.
    #[error("game is unavailable")]
    Unavailable,
}
