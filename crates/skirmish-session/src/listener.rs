//! Bridges game events onto a connection's outbound queue.

use std::sync::Arc;

use skirmish_game::MapUpdateListener;
use skirmish_map::{Fixture, PlayerNumber, Point, TileType};
use skirmish_protocol::{Message, MessageKind};

use crate::OutboundQueue;

/// A [`MapUpdateListener`] that turns every event into a [`Message`]
/// addressed to its player and pushes it onto the session's queue.
///
/// Never blocks: the queue is unbounded, and a stopped queue silently
/// drops the event.
pub struct SessionListener {
    player: PlayerNumber,
    queue: Arc<OutboundQueue>,
}

impl SessionListener {
    pub fn new(player: PlayerNumber, queue: Arc<OutboundQueue>) -> Self {
        Self { player, queue }
    }

    fn push(&self, kind: MessageKind) {
        if !self.queue.push(Message::to(self.player, kind)) {
            tracing::trace!(player = %self.player, "event dropped, queue stopped");
        }
    }
}

impl MapUpdateListener for SessionListener {
    fn player(&self) -> PlayerNumber {
        self.player
    }

    fn terrain_changed(&self, point: Point, tile: TileType) {
        self.push(MessageKind::TerrainChanged { point, tile });
    }

    fn fixture_added(&self, point: Point, fixture: &Fixture) {
        self.push(MessageKind::FixtureAdded {
            point,
            fixture: fixture.clone(),
        });
    }

    fn fixture_removed(&self, point: Point, fixture: &Fixture) {
        self.push(MessageKind::FixtureRemoved {
            point,
            fixture_id: Some(fixture.id()),
        });
    }

    fn fixture_moved(&self, source: Point, dest: Point, fixture: &Fixture) {
        self.push(MessageKind::FixtureMoved {
            source,
            dest,
            fixture_id: fixture.id(),
        });
    }

    fn turn_ended(&self, next: PlayerNumber) {
        self.push(MessageKind::TurnEnded { next });
    }

    fn reply(&self, message: Message) {
        if !self.queue.push(message) {
            tracing::trace!(player = %self.player, "reply dropped, queue stopped");
        }
    }
}
