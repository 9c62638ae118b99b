//! Turn order.

use std::collections::VecDeque;

use skirmish_map::PlayerNumber;

use crate::GameError;

/// Players in turn order. The head is the player whose turn it is.
///
/// A player appears at most once.
#[derive(Debug, Clone, Default)]
pub struct TurnQueue {
    players: VecDeque<PlayerNumber>,
}

impl TurnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `player` at the back.
    ///
    /// # Errors
    /// `GameError::InvalidPlayer` for a negative number,
    /// `GameError::PlayerPresent` if the player is already queued.
    pub fn join(&mut self, player: PlayerNumber) -> Result<(), GameError> {
        if player.0 < 0 {
            return Err(GameError::InvalidPlayer(player));
        }
        if self.players.contains(&player) {
            return Err(GameError::PlayerPresent(player));
        }
        self.players.push_back(player);
        Ok(())
    }

    /// Removes `player`; returns whether it was present.
    pub fn leave(&mut self, player: PlayerNumber) -> bool {
        let before = self.players.len();
        self.players.retain(|p| *p != player);
        self.players.len() != before
    }

    pub fn current(&self) -> Option<PlayerNumber> {
        self.players.front().copied()
    }

    /// Moves the head to the back and returns the new head.
    pub fn rotate(&mut self) -> Option<PlayerNumber> {
        if let Some(head) = self.players.pop_front() {
            self.players.push_back(head);
        }
        self.current()
    }

    pub fn contains(&self, player: PlayerNumber) -> bool {
        self.players.contains(&player)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Players from the current one onwards.
    pub fn iter(&self) -> impl Iterator<Item = PlayerNumber> + '_ {
        self.players.iter().copied()
    }
}
