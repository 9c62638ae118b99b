//! The authoritative game state machine.

use std::collections::BTreeMap;
use std::sync::Arc;

use skirmish_map::{Board, Fixture, FixtureId, IdAllocator, MapError, PlayerNumber, Point, TileType};
use skirmish_protocol::Message;

use crate::{GameError, ListenerId, MapUpdateListener, TurnQueue};

/// Board, turn order and listeners for one game.
///
/// Every mutating operation either applies completely and notifies the
/// listeners, or returns an error and leaves everything untouched.
/// `GameServer` itself is not synchronized; [`spawn_game`](crate::spawn_game)
/// gives it a single owner task.
pub struct GameServer {
    board: Board,
    turns: TurnQueue,
    listeners: BTreeMap<ListenerId, Arc<dyn MapUpdateListener>>,
    next_listener_id: u64,
    ids: Arc<IdAllocator>,
}

impl GameServer {
    /// A game on `board` with a fresh identifier allocator.
    ///
    /// # Errors
    /// `GameError::Map(MapError::DuplicateId)` if two fixtures on the
    /// board share an ID.
    pub fn new(board: Board) -> Result<Self, GameError> {
        Self::with_ids(board, Arc::new(IdAllocator::new()))
    }

    /// A game on `board` allocating IDs from `ids`. Every fixture already
    /// on the board is registered with the allocator.
    pub fn with_ids(board: Board, ids: Arc<IdAllocator>) -> Result<Self, GameError> {
        for (_, _, fixture) in board.cells() {
            if let Some(fixture) = fixture {
                ids.register(fixture.id())?;
            }
        }
        Ok(Self {
            board,
            turns: TurnQueue::new(),
            listeners: BTreeMap::new(),
            next_listener_id: 1,
            ids,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn ids(&self) -> &Arc<IdAllocator> {
        &self.ids
    }

    // -----------------------------------------------------------------------
    // Players and turns
    // -----------------------------------------------------------------------

    /// Adds `player` to the back of the turn order.
    pub fn join(&mut self, player: PlayerNumber) -> Result<(), GameError> {
        self.turns.join(player)?;
        tracing::info!(%player, players = self.turns.len(), "player joined");
        Ok(())
    }

    /// Removes `player` from the turn order. Removing an absent player is
    /// a no-op. If it was their turn, everyone is told who is next.
    pub fn leave(&mut self, player: PlayerNumber) -> bool {
        let was_current = self.turns.current() == Some(player);
        if !self.turns.leave(player) {
            return false;
        }
        tracing::info!(%player, players = self.turns.len(), "player left");
        if was_current {
            if let Some(next) = self.turns.current() {
                for listener in self.listeners.values() {
                    listener.turn_ended(next);
                }
            }
        }
        true
    }

    pub fn current_player(&self) -> Option<PlayerNumber> {
        self.turns.current()
    }

    pub fn turns(&self) -> &TurnQueue {
        &self.turns
    }

    fn require_turn(&self, requester: PlayerNumber) -> Result<(), GameError> {
        if self.turns.current() == Some(requester) {
            Ok(())
        } else {
            Err(GameError::NotYourTurn)
        }
    }

    /// Ends `requester`'s turn and returns the next player.
    pub fn end_turn(&mut self, requester: PlayerNumber) -> Result<PlayerNumber, GameError> {
        self.require_turn(requester)?;
        let next = self.turns.rotate().ok_or(GameError::NotYourTurn)?;
        tracing::debug!(player = %requester, %next, "turn ended");
        for listener in self.listeners.values() {
            listener.turn_ended(next);
        }
        Ok(next)
    }

    // -----------------------------------------------------------------------
    // Board changes
    // -----------------------------------------------------------------------

    /// Moves unit `id` from `source` to `dest`.
    ///
    /// `source` is where the requester believes the unit is; a stale
    /// belief is rejected rather than corrected.
    pub fn move_unit(
        &mut self,
        requester: PlayerNumber,
        id: FixtureId,
        source: Point,
        dest: Point,
    ) -> Result<(), GameError> {
        self.require_turn(requester)?;
        let (actual, mover) = self
            .board
            .find_fixture(id)
            .and_then(|point| self.board.contents_at(point).map(|f| (point, f)))
            .ok_or(GameError::NoSuchUnit(id))?;
        if !mover.is_unit() {
            return Err(GameError::OnlyUnitsCanMove);
        }
        if mover.owner() != requester {
            return Err(GameError::NotYourUnit);
        }
        if actual != source {
            return Err(GameError::LocationMismatch {
                claimed: source,
                actual,
            });
        }
        if self.board.contents_at(dest).is_some() {
            return Err(GameError::DestinationOccupied(dest));
        }
        if mover.is_proxy() {
            return Err(GameError::CannotMoveProxy);
        }
        if !self.board.contains(dest) {
            return Err(MapError::NotOnBoard(dest).into());
        }

        let Some(mover) = self.board.remove_fixture(source) else {
            return Err(GameError::NoSuchUnit(id));
        };
        self.board.place_fixture(dest, mover.clone())?;
        tracing::debug!(player = %requester, %id, %source, %dest, "unit moved");

        self.announce(&mover, |listener, seen| listener.fixture_moved(source, dest, seen));
        Ok(())
    }

    /// Places `fixture` at `point`.
    pub fn add_fixture(
        &mut self,
        requester: PlayerNumber,
        point: Point,
        fixture: Fixture,
    ) -> Result<(), GameError> {
        self.require_turn(requester)?;
        if !self.board.contains(point) {
            return Err(MapError::NotOnBoard(point).into());
        }
        if self.board.contents_at(point).is_some() {
            return Err(GameError::Occupied(point));
        }
        if fixture.is_proxy() {
            return Err(GameError::ProxyNotAllowed);
        }

        self.board.place_fixture(point, fixture.clone())?;
        tracing::debug!(player = %requester, id = %fixture.id(), %point, "fixture added");

        self.announce(&fixture, |listener, seen| listener.fixture_added(point, seen));
        Ok(())
    }

    /// Removes one of `requester`'s own fixtures from `point`.
    pub fn remove_fixture(
        &mut self,
        requester: PlayerNumber,
        point: Point,
    ) -> Result<Fixture, GameError> {
        self.require_turn(requester)?;
        let owner = self
            .board
            .contents_at(point)
            .map(Fixture::owner)
            .ok_or(GameError::NothingThere(point))?;
        if owner != requester {
            return Err(GameError::NotYourFixture);
        }

        let removed = self
            .board
            .remove_fixture(point)
            .ok_or(GameError::NothingThere(point))?;
        tracing::debug!(player = %requester, id = %removed.id(), %point, "fixture removed");

        self.announce(&removed, |listener, seen| listener.fixture_removed(point, seen));
        Ok(removed)
    }

    /// Changes the terrain at `point`. Administrative, so there's no turn
    /// check.
    pub fn set_terrain(&mut self, point: Point, tile: TileType) {
        self.board.set_terrain(point, tile);
        tracing::debug!(%point, %tile, "terrain changed");
        for listener in self.listeners.values() {
            listener.terrain_changed(point, tile);
        }
    }

    /// The board as `player` may see it.
    pub fn derive_view(&self, player: PlayerNumber) -> Board {
        self.board.derive_view(player)
    }

    // -----------------------------------------------------------------------
    // Listeners
    // -----------------------------------------------------------------------

    pub fn add_listener(&mut self, listener: Arc<dyn MapUpdateListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        tracing::debug!(%id, player = %listener.player(), "listener added");
        self.listeners.insert(id, listener);
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Hands `message` to listener `id`. Returns `false` if no such
    /// listener is registered.
    pub fn reply_to(&self, id: ListenerId, message: Message) -> bool {
        match self.listeners.get(&id) {
            Some(listener) => {
                listener.reply(message);
                true
            }
            None => false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Calls `notify` for every listener with the fixture as that
    /// listener's player may see it. The redacted copy is built once.
    fn announce(&self, fixture: &Fixture, notify: impl Fn(&dyn MapUpdateListener, &Fixture)) {
        let redacted = fixture.redacted();
        for listener in self.listeners.values() {
            let seen = if listener.player() == fixture.owner() {
                fixture
            } else {
                &redacted
            };
            notify(listener.as_ref(), seen);
        }
    }
}
