//! Identity newtypes shared by every layer above the map.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The number a player negotiated during the handshake.
///
/// `#[serde(transparent)]` keeps it a bare integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerNumber(pub i32);

impl PlayerNumber {
    /// Owner of neutral fixtures such as trees and walls.
    pub const NONE: PlayerNumber = PlayerNumber(-1);

    /// The next number to propose after this one was taken.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.0)
    }
}

/// Identifier of a fixture on the board.
///
/// The server only ever hands out non-negative IDs. Negative IDs are
/// placeholders a client may use before the server has confirmed an
/// object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureId(pub i32);

impl FixtureId {
    /// Returns `true` for server-issued (non-negative) IDs.
    pub fn is_confirmed(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_number_display() {
        assert_eq!(PlayerNumber(3).to_string(), "player 3");
        assert_eq!(PlayerNumber::NONE.to_string(), "player -1");
    }

    #[test]
    fn test_player_number_next_increments() {
        assert_eq!(PlayerNumber(4).next(), PlayerNumber(5));
    }

    #[test]
    fn test_fixture_id_negative_is_unconfirmed() {
        assert!(FixtureId(0).is_confirmed());
        assert!(FixtureId(17).is_confirmed());
        assert!(!FixtureId(-1).is_confirmed());
    }

    #[test]
    fn test_identity_serializes_as_bare_integer() {
        assert_eq!(serde_json::to_string(&PlayerNumber(2)).unwrap(), "2");
        assert_eq!(serde_json::to_string(&FixtureId(9)).unwrap(), "9");
    }
}
