//! Terrain types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of ground at a board point. Every point on the board has
/// exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Road,
    Lawn,
    Brush,
    Impassible,
}

impl TileType {
    /// Every tile type, in declaration order.
    pub const ALL: [TileType; 4] = [Self::Road, Self::Lawn, Self::Brush, Self::Impassible];
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Road => write!(f, "road"),
            Self::Lawn => write!(f, "lawn"),
            Self::Brush => write!(f, "brush"),
            Self::Impassible => write!(f, "impassible"),
        }
    }
}
