//! Command dispatcher: decoded client message in, reply out.
//!
//! The dispatcher never trusts the message's own context. The caller
//! passes the player the connection was confirmed as, and every command
//! is attributed to that player.

use skirmish_map::PlayerNumber;
use skirmish_protocol::{Message, MessageContext, MessageKind};

use crate::{GameError, GameServer};

/// Applies `message` on behalf of `player` and returns the reply.
///
/// | Message | Operation | Reply |
/// |---|---|---|
/// | `TurnEnded` | [`GameServer::end_turn`] | `Acknowledged` |
/// | `FixtureMoved` | [`GameServer::move_unit`] | `Acknowledged` |
/// | `FixturePlacementRequest` | allocate ID, build, [`GameServer::add_fixture`] | `Acknowledged` |
/// | `FixtureRemoved` | [`GameServer::remove_fixture`] | `Acknowledged` |
/// | `FullMapRequest` | [`GameServer::derive_view`] | `Batch` snapshot |
///
/// Anything else, and any rejection, comes back as a `ProtocolError`
/// carrying the reason. Rejections are never fatal to the connection.
pub fn dispatch(game: &mut GameServer, player: PlayerNumber, message: Message) -> Message {
    let kind = message.kind.name();
    match handle(game, player, message.kind) {
        Ok(reply) => reply,
        Err(e) => {
            tracing::debug!(%player, kind, error = %e, "command rejected");
            Message::error(MessageContext::Player(player), e.to_string())
        }
    }
}

fn handle(game: &mut GameServer, player: PlayerNumber, kind: MessageKind) -> Result<Message, GameError> {
    let ack = Message::to(player, MessageKind::Acknowledged);
    match kind {
        MessageKind::TurnEnded { .. } => {
            game.end_turn(player)?;
            Ok(ack)
        }
        MessageKind::FixtureMoved {
            source,
            dest,
            fixture_id,
        } => {
            game.move_unit(player, fixture_id, source, dest)?;
            Ok(ack)
        }
        MessageKind::FixturePlacementRequest { kind, point } => {
            // A rejected placement still burns the ID.
            let id = game.ids().allocate()?;
            game.add_fixture(player, point, kind.build(id, player).into())?;
            Ok(ack)
        }
        MessageKind::FixtureRemoved { point, .. } => {
            game.remove_fixture(player, point)?;
            Ok(ack)
        }
        MessageKind::FullMapRequest => Ok(snapshot(game, player)),
        other => Err(GameError::UnexpectedMessage(other.name())),
    }
}

/// Everything `player` may see, as one batch: for each point in
/// row-major order its terrain, then either its (filtered) contents or a
/// wildcard removal for an empty cell. Ends with whose turn it is.
fn snapshot(game: &GameServer, player: PlayerNumber) -> Message {
    let view = game.derive_view(player);
    let mut messages = Vec::with_capacity(view.len() * 2 + 1);
    for (point, tile, fixture) in view.cells() {
        messages.push(Message::to(player, MessageKind::TerrainChanged { point, tile }));
        let contents = match fixture {
            Some(fixture) => MessageKind::FixtureAdded {
                point,
                fixture: fixture.clone(),
            },
            None => MessageKind::FixtureRemoved {
                point,
                fixture_id: None,
            },
        };
        messages.push(Message::to(player, contents));
    }
    if let Some(next) = game.current_player() {
        messages.push(Message::to(player, MessageKind::TurnEnded { next }));
    }
    tracing::debug!(%player, messages = messages.len(), "map snapshot built");
    Message::batch(MessageContext::Player(player), messages)
}

#[cfg(test)]
mod tests {
    use skirmish_map::{Board, Fixture, FixtureId, Point, TileType, UnitKind};

    use super::*;
    use crate::server::tests::{Event, Recorder};

    fn p(n: i32) -> PlayerNumber {
        PlayerNumber(n)
    }

    fn game() -> GameServer {
        let mut board = Board::filled(3, 3, TileType::Lawn);
        board
            .place_fixture(
                Point::new(1, 1),
                UnitKind::Swordsman.build(FixtureId(0), p(0)).into(),
            )
            .unwrap();
        let mut game = GameServer::new(board).unwrap();
        game.join(p(0)).unwrap();
        game.join(p(1)).unwrap();
        game
    }

    fn reason(reply: &Message) -> &str {
        match &reply.kind {
            MessageKind::ProtocolError { reason } => reason,
            other => panic!("expected ProtocolError, got {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_end_turn_acknowledged() {
        let mut game = game();
        let reply = dispatch(
            &mut game,
            p(0),
            Message::to(p(0), MessageKind::TurnEnded { next: p(0) }),
        );
        assert_eq!(reply, Message::to(p(0), MessageKind::Acknowledged));
        assert_eq!(game.current_player(), Some(p(1)));
    }

    #[test]
    fn test_dispatch_attributes_to_session_player_not_context() {
        let mut game = game();
        // Player 1 claims to be player 0 in the message context.
        let reply = dispatch(
            &mut game,
            p(1),
            Message::to(p(0), MessageKind::TurnEnded { next: p(0) }),
        );
        assert_eq!(reason(&reply), "Not your turn");
        assert_eq!(game.current_player(), Some(p(0)));
    }

    #[test]
    fn test_dispatch_move_rejection_becomes_protocol_error() {
        let mut game = game();
        let reply = dispatch(
            &mut game,
            p(0),
            Message::to(
                p(0),
                MessageKind::FixtureMoved {
                    source: Point::new(0, 0),
                    dest: Point::new(0, 1),
                    fixture_id: FixtureId(0),
                },
            ),
        );
        assert_eq!(reply.context, MessageContext::Player(p(0)));
        assert!(reason(&reply).contains("doesn't match"));
    }

    #[test]
    fn test_dispatch_placement_builds_owned_unit() {
        let mut game = game();
        let rec = Recorder::new(0);
        game.add_listener(rec.clone());

        let reply = dispatch(
            &mut game,
            p(0),
            Message::to(
                p(0),
                MessageKind::FixturePlacementRequest {
                    kind: UnitKind::Archer,
                    point: Point::new(0, 2),
                },
            ),
        );
        assert_eq!(reply.kind, MessageKind::Acknowledged);

        let expected: Fixture = UnitKind::Archer.build(FixtureId(1), p(0)).into();
        assert_eq!(game.board().contents_at(Point::new(0, 2)), Some(&expected));
        assert_eq!(rec.events(), vec![Event::Added(Point::new(0, 2), expected)]);
    }

    #[test]
    fn test_dispatch_rejected_placement_consumes_id() {
        let mut game = game();
        let request = MessageKind::FixturePlacementRequest {
            kind: UnitKind::Swordsman,
            point: Point::new(1, 1),
        };
        let reply = dispatch(&mut game, p(0), Message::to(p(0), request));
        assert!(reason(&reply).contains("Something already there"));
        assert!(game.ids().is_used(FixtureId(1)));
        assert_eq!(game.ids().allocate(), Ok(FixtureId(2)));
    }

    #[test]
    fn test_dispatch_removal_request() {
        let mut game = game();
        let reply = dispatch(
            &mut game,
            p(0),
            Message::to(
                p(0),
                MessageKind::FixtureRemoved {
                    point: Point::new(1, 1),
                    fixture_id: Some(FixtureId(0)),
                },
            ),
        );
        assert_eq!(reply.kind, MessageKind::Acknowledged);
        assert_eq!(game.board().fixture_count(), 0);
    }

    #[test]
    fn test_dispatch_full_map_request_streams_every_point() {
        let mut game = game();
        let reply = dispatch(&mut game, p(1), Message::to(p(1), MessageKind::FullMapRequest));
        let messages = reply.flatten();

        // Two messages per point plus the trailing turn notice.
        assert_eq!(messages.len(), 9 * 2 + 1);
        assert!(messages.iter().all(|m| m.context == MessageContext::Player(p(1))));
        assert_eq!(
            messages[0].kind,
            MessageKind::TerrainChanged {
                point: Point::new(0, 0),
                tile: TileType::Lawn,
            }
        );
        assert_eq!(
            messages[1].kind,
            MessageKind::FixtureRemoved {
                point: Point::new(0, 0),
                fixture_id: None,
            }
        );
        // (1, 1) is the fifth point.
        match &messages[9].kind {
            MessageKind::FixtureAdded { point, fixture } => {
                assert_eq!(*point, Point::new(1, 1));
                assert!(fixture.is_proxy());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            messages.last().map(|m| &m.kind),
            Some(&MessageKind::TurnEnded { next: p(0) })
        );
    }

    #[test]
    fn test_dispatch_non_commands_rejected() {
        let mut game = game();
        for kind in [
            MessageKind::Quit,
            MessageKind::Acknowledged,
            MessageKind::PlayerNumberRequest { number: p(3) },
            MessageKind::Batch { messages: vec![] },
            MessageKind::ProtocolError {
                reason: "x".into(),
            },
        ] {
            let reply = dispatch(&mut game, p(0), Message::to(p(0), kind));
            assert!(reason(&reply).starts_with("Can't handle"));
        }
    }
}
