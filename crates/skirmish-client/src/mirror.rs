//! The client's local replica of the board.

use std::collections::BTreeMap;

use skirmish_map::{Board, FixtureId, PlayerNumber, Point, UnitKind};
use skirmish_protocol::{Message, MessageContext, MessageKind};

/// A player's partial copy of the game.
///
/// Feed every server message to [`handle`](Self::handle) and send
/// whatever it returns. The replica only ever holds what the server chose
/// to show this player, so other players' units are proxies.
///
/// When an update doesn't fit the replica (a move from a cell that
/// doesn't hold the named fixture, say), the mirror doesn't guess. It
/// asks for the whole map again.
#[derive(Debug, Clone)]
pub struct ClientMirror {
    board: Board,
    proposed: PlayerNumber,
    confirmed: Option<PlayerNumber>,
    current_player: Option<PlayerNumber>,
    orders: BTreeMap<FixtureId, Point>,
    last_error: Option<String>,
    server_quit: bool,
}

impl ClientMirror {
    /// A mirror that will first ask to be `proposed`.
    pub fn new(proposed: PlayerNumber) -> Self {
        Self {
            board: Board::new(),
            proposed,
            confirmed: None,
            current_player: None,
            orders: BTreeMap::new(),
            last_error: None,
            server_quit: false,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The confirmed player number, or the one being proposed.
    pub fn player(&self) -> PlayerNumber {
        self.confirmed.unwrap_or(self.proposed)
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed.is_some()
    }

    pub fn current_player(&self) -> Option<PlayerNumber> {
        self.current_player
    }

    pub fn is_my_turn(&self) -> bool {
        self.confirmed.is_some() && self.current_player == self.confirmed
    }

    pub fn orders(&self) -> &BTreeMap<FixtureId, Point> {
        &self.orders
    }

    /// The reason given by the most recent `ProtocolError`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn take_last_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    /// Whether the server has said it is going away.
    pub fn server_quit(&self) -> bool {
        self.server_quit
    }

    fn outgoing(&self, kind: MessageKind) -> Message {
        Message::to(self.player(), kind)
    }

    // -----------------------------------------------------------------------
    // Handshake
    // -----------------------------------------------------------------------

    /// The first message to send: a request for the proposed number.
    pub fn start(&self) -> Message {
        self.outgoing(MessageKind::PlayerNumberRequest {
            number: self.proposed,
        })
    }

    // -----------------------------------------------------------------------
    // Incoming
    // -----------------------------------------------------------------------

    /// Applies one server message and returns what to send in response.
    pub fn handle(&mut self, message: Message) -> Vec<Message> {
        let mut replies = Vec::new();
        let mut need_map = false;
        for part in message.flatten() {
            self.apply(part, &mut replies, &mut need_map);
        }
        if need_map {
            tracing::debug!(player = %self.player(), "replica out of step, requesting full map");
            replies.push(self.outgoing(MessageKind::FullMapRequest));
        }
        replies
    }

    fn apply(&mut self, message: Message, replies: &mut Vec<Message>, need_map: &mut bool) {
        match message.kind {
            MessageKind::PlayerNumberTaken { number } if self.confirmed.is_none() => {
                self.proposed = number.next();
                tracing::debug!(taken = %number, next = %self.proposed, "player number taken");
                replies.push(self.start());
            }
            MessageKind::Acknowledged if self.confirmed.is_none() => {
                let number = match message.context {
                    MessageContext::Player(n) => n,
                    MessageContext::Broadcast => self.proposed,
                };
                self.confirmed = Some(number);
                tracing::info!(player = %number, "player number confirmed");
                replies.push(self.outgoing(MessageKind::FullMapRequest));
            }
            MessageKind::Acknowledged | MessageKind::PlayerNumberTaken { .. } => {}
            MessageKind::TerrainChanged { point, tile } => {
                self.board.set_terrain(point, tile);
            }
            MessageKind::FixtureAdded { point, fixture } => {
                if self.board.place_fixture(point, fixture).is_err() {
                    *need_map = true;
                }
            }
            MessageKind::FixtureMoved {
                source,
                dest,
                fixture_id,
            } => {
                if !self.apply_move(source, dest, fixture_id) {
                    *need_map = true;
                }
            }
            MessageKind::FixtureRemoved { point, fixture_id } => {
                let matches = match (self.board.contents_at(point), fixture_id) {
                    // A named fixture missing from our copy means we
                    // missed its arrival.
                    (None, Some(_)) => false,
                    (_, None) => true,
                    (Some(held), Some(id)) => held.id() == id,
                };
                if matches {
                    self.board.remove_fixture(point);
                } else {
                    *need_map = true;
                }
            }
            MessageKind::TurnEnded { next } => {
                self.current_player = Some(next);
                if self.confirmed == Some(next) {
                    self.orders.clear();
                }
            }
            MessageKind::ProtocolError { reason } => {
                tracing::debug!(%reason, "server rejected request");
                self.last_error = Some(reason);
            }
            MessageKind::Quit => {
                self.server_quit = true;
            }
            other => {
                tracing::debug!(kind = other.name(), "ignoring client-bound request");
            }
        }
    }

    /// Moves `id` from `source` to `dest` if the replica agrees it is at
    /// `source`. Returns `false` when it doesn't.
    fn apply_move(&mut self, source: Point, dest: Point, id: FixtureId) -> bool {
        let here = self.board.contents_at(source).map(|f| f.id());
        if here != Some(id) || !self.board.contains(dest) {
            return false;
        }
        match self.board.remove_fixture(source) {
            Some(mover) => self.board.place_fixture(dest, mover).is_ok(),
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Outgoing
    // -----------------------------------------------------------------------

    /// Orders unit `id` to move to `dest` when orders are next sent.
    pub fn set_order(&mut self, id: FixtureId, dest: Point) {
        self.orders.insert(id, dest);
    }

    pub fn cancel_order(&mut self, id: FixtureId) -> Option<Point> {
        self.orders.remove(&id)
    }

    /// A move request for every order whose unit is on the replica and
    /// whose destination looks empty. Other orders are kept for later.
    pub fn transmit_orders(&self) -> Vec<Message> {
        self.orders
            .iter()
            .filter_map(|(id, dest)| {
                let source = self.board.find_fixture(*id)?;
                if self.board.contents_at(*dest).is_some() {
                    return None;
                }
                Some(self.outgoing(MessageKind::FixtureMoved {
                    source,
                    dest: *dest,
                    fixture_id: *id,
                }))
            })
            .collect()
    }

    pub fn end_turn(&self) -> Message {
        self.outgoing(MessageKind::TurnEnded {
            next: self.player(),
        })
    }

    pub fn request_placement(&self, kind: UnitKind, point: Point) -> Message {
        self.outgoing(MessageKind::FixturePlacementRequest { kind, point })
    }

    pub fn request_full_map(&self) -> Message {
        self.outgoing(MessageKind::FullMapRequest)
    }

    pub fn quit(&self) -> Message {
        self.outgoing(MessageKind::Quit)
    }
}

#[cfg(test)]
mod tests {
    use skirmish_map::{Feature, Fixture, TileType};

    use super::*;

    fn p(n: i32) -> PlayerNumber {
        PlayerNumber(n)
    }

    fn pt(row: i32, column: i32) -> Point {
        Point::new(row, column)
    }

    fn server(kind: MessageKind) -> Message {
        Message::to(p(0), kind)
    }

    /// A confirmed player 0 with a 3x3 lawn, own swordsman #1 at (1,1)
    /// and an opposing proxy #2 at (0,0).
    fn mirror() -> ClientMirror {
        let mut m = ClientMirror::new(p(0));
        m.handle(server(MessageKind::Acknowledged));
        for point in Board::filled(3, 3, TileType::Lawn).points() {
            m.handle(server(MessageKind::TerrainChanged {
                point,
                tile: TileType::Lawn,
            }));
        }
        m.handle(server(MessageKind::FixtureAdded {
            point: pt(1, 1),
            fixture: UnitKind::Swordsman.build(FixtureId(1), p(0)).into(),
        }));
        m.handle(server(MessageKind::FixtureAdded {
            point: pt(0, 0),
            fixture: Fixture::from(UnitKind::Archer.build(FixtureId(2), p(1))).redacted(),
        }));
        m
    }

    fn is_full_map_request(replies: &[Message]) -> bool {
        matches!(replies, [m] if m.kind == MessageKind::FullMapRequest)
    }

    #[test]
    fn test_start_requests_proposed_number() {
        let m = ClientMirror::new(p(4));
        assert_eq!(
            m.start().kind,
            MessageKind::PlayerNumberRequest { number: p(4) }
        );
    }

    #[test]
    fn test_taken_number_retries_next() {
        let mut m = ClientMirror::new(p(0));
        let replies = m.handle(server(MessageKind::PlayerNumberTaken { number: p(0) }));
        assert_eq!(replies.len(), 1);
        assert_eq!(
            replies[0].kind,
            MessageKind::PlayerNumberRequest { number: p(1) }
        );
        assert!(!m.is_confirmed());
    }

    #[test]
    fn test_acknowledged_confirms_and_requests_map() {
        let mut m = ClientMirror::new(p(0));
        m.handle(server(MessageKind::PlayerNumberTaken { number: p(0) }));
        let replies = m.handle(Message::to(p(1), MessageKind::Acknowledged));
        assert!(m.is_confirmed());
        assert_eq!(m.player(), p(1));
        assert!(is_full_map_request(&replies));
        assert_eq!(replies[0].context, MessageContext::Player(p(1)));

        // Later acknowledgements are just acknowledgements.
        assert!(m.handle(Message::to(p(1), MessageKind::Acknowledged)).is_empty());
    }

    #[test]
    fn test_snapshot_batch_builds_replica() {
        let m = mirror();
        assert_eq!(m.board().len(), 9);
        assert!(matches!(m.board().contents_at(pt(1, 1)), Some(Fixture::Unit(_))));
        assert!(matches!(m.board().contents_at(pt(0, 0)), Some(Fixture::Proxy(_))));
    }

    #[test]
    fn test_move_applied_when_replica_agrees() {
        let mut m = mirror();
        let replies = m.handle(server(MessageKind::FixtureMoved {
            source: pt(1, 1),
            dest: pt(2, 1),
            fixture_id: FixtureId(1),
        }));
        assert!(replies.is_empty());
        assert_eq!(m.board().find_fixture(FixtureId(1)), Some(pt(2, 1)));
    }

    #[test]
    fn test_stale_move_requests_full_map() {
        let mut m = mirror();
        let replies = m.handle(server(MessageKind::FixtureMoved {
            source: pt(2, 2),
            dest: pt(2, 1),
            fixture_id: FixtureId(1),
        }));
        assert!(is_full_map_request(&replies));
        assert_eq!(m.board().find_fixture(FixtureId(1)), Some(pt(1, 1)));
    }

    #[test]
    fn test_removal_rules() {
        let mut m = mirror();

        // Wrong ID: don't touch it, resync.
        let replies = m.handle(server(MessageKind::FixtureRemoved {
            point: pt(1, 1),
            fixture_id: Some(FixtureId(9)),
        }));
        assert!(is_full_map_request(&replies));
        assert!(m.board().contents_at(pt(1, 1)).is_some());

        // Named fixture on an empty cell: the replica missed it, resync.
        let replies = m.handle(server(MessageKind::FixtureRemoved {
            point: pt(2, 2),
            fixture_id: Some(FixtureId(9)),
        }));
        assert!(is_full_map_request(&replies));

        // Wildcard on an empty cell: nothing to do.
        let replies = m.handle(server(MessageKind::FixtureRemoved {
            point: pt(2, 2),
            fixture_id: None,
        }));
        assert!(replies.is_empty());

        // Wildcard: whatever is there goes.
        m.handle(server(MessageKind::FixtureRemoved {
            point: pt(0, 0),
            fixture_id: None,
        }));
        assert!(m.board().contents_at(pt(0, 0)).is_none());

        // Matching ID.
        m.handle(server(MessageKind::FixtureRemoved {
            point: pt(1, 1),
            fixture_id: Some(FixtureId(1)),
        }));
        assert_eq!(m.board().fixture_count(), 0);
    }

    #[test]
    fn test_batch_with_several_stale_updates_requests_map_once() {
        let mut m = mirror();
        let stale = |id| {
            server(MessageKind::FixtureMoved {
                source: pt(2, 2),
                dest: pt(2, 0),
                fixture_id: FixtureId(id),
            })
        };
        let replies = m.handle(Message::batch(
            MessageContext::Player(p(0)),
            vec![stale(1), stale(2)],
        ));
        assert!(is_full_map_request(&replies));
    }

    #[test]
    fn test_own_turn_clears_orders() {
        let mut m = mirror();
        m.set_order(FixtureId(1), pt(2, 2));

        m.handle(server(MessageKind::TurnEnded { next: p(1) }));
        assert_eq!(m.orders().len(), 1);
        assert!(!m.is_my_turn());

        m.handle(server(MessageKind::TurnEnded { next: p(0) }));
        assert!(m.orders().is_empty());
        assert!(m.is_my_turn());
    }

    #[test]
    fn test_transmit_orders_skips_unknown_units_and_blocked_cells() {
        let mut m = mirror();
        m.set_order(FixtureId(1), pt(2, 2));
        m.set_order(FixtureId(7), pt(2, 0));
        let orders = m.transmit_orders();
        assert_eq!(
            orders,
            vec![Message::to(
                p(0),
                MessageKind::FixtureMoved {
                    source: pt(1, 1),
                    dest: pt(2, 2),
                    fixture_id: FixtureId(1),
                }
            )]
        );

        m.set_order(FixtureId(1), pt(0, 0));
        assert!(m.transmit_orders().is_empty());
    }

    #[test]
    fn test_protocol_error_recorded() {
        let mut m = mirror();
        m.handle(server(MessageKind::ProtocolError {
            reason: "Not your turn".into(),
        }));
        assert_eq!(m.last_error(), Some("Not your turn"));
        assert_eq!(m.take_last_error().as_deref(), Some("Not your turn"));
        assert_eq!(m.last_error(), None);
    }

    #[test]
    fn test_fixture_added_off_replica_requests_map() {
        let mut m = mirror();
        let replies = m.handle(server(MessageKind::FixtureAdded {
            point: pt(8, 8),
            fixture: Feature::new(FixtureId(3), "Tree", 'T', "tree.png").into(),
        }));
        assert!(is_full_map_request(&replies));
    }

    #[test]
    fn test_outgoing_commands() {
        let m = mirror();
        assert_eq!(m.end_turn().kind, MessageKind::TurnEnded { next: p(0) });
        assert_eq!(
            m.request_placement(UnitKind::Archer, pt(2, 2)).kind,
            MessageKind::FixturePlacementRequest {
                kind: UnitKind::Archer,
                point: pt(2, 2),
            }
        );
        assert_eq!(m.quit().kind, MessageKind::Quit);
    }
}
