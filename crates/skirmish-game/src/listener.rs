//! How the game tells connected players about changes.

use std::fmt;

use skirmish_map::{Fixture, PlayerNumber, Point, TileType};
use skirmish_protocol::Message;

/// Identifies a registered listener so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Receives map and turn events from a [`GameServer`](crate::GameServer).
///
/// The fixture handed to each callback has already been filtered for
/// [`player`](Self::player): their own units arrive in full, everyone
/// else's as proxies.
///
/// Callbacks run inside the game actor, so they must not block.
/// Enqueue and return.
pub trait MapUpdateListener: Send + Sync {
    /// The player this listener reports to.
    fn player(&self) -> PlayerNumber;

    fn terrain_changed(&self, point: Point, tile: TileType);

    fn fixture_added(&self, point: Point, fixture: &Fixture);

    fn fixture_removed(&self, point: Point, fixture: &Fixture);

    fn fixture_moved(&self, source: Point, dest: Point, fixture: &Fixture);

    /// It is now `next`'s turn.
    fn turn_ended(&self, next: PlayerNumber);

    /// A direct answer to this listener's player: the `Acknowledged` for
    /// a join, or the reply to a dispatched command.
    ///
    /// Delivered from the actor, between events, so a listener that
    /// forwards both to one connection sees them in the order the game
    /// applied them. A snapshot can then never arrive after an event it
    /// predates. Listeners that don't stand for a connection can ignore
    /// replies.
    fn reply(&self, message: Message) {
        let _ = message;
    }
}
