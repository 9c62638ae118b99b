//! Game actor configuration.

use serde::{Deserialize, Serialize};

/// Tuning for the game actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Capacity of the actor's command channel. When it is full, callers
    /// wait (bounded channel backpressure).
    pub command_channel_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            command_channel_size: 64,
        }
    }
}
