//! The message taxonomy.
//!
//! Every message is a [`Message`]: an always-present [`MessageContext`]
//! saying which player the message concerns (or that it concerns
//! everyone), plus a [`MessageKind`] saying what happened or what is
//! being asked for.
//!
//! JSON shape:
//!
//! ```json
//! {
//!   "context": { "Player": 2 },
//!   "kind": { "type": "FixtureMoved", "source": {...}, "dest": {...}, "fixture_id": 4 }
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use skirmish_map::{Fixture, FixtureId, PlayerNumber, Point, TileType, UnitKind};

/// Who a message is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageContext {
    /// Concerns one player: the sender of a request, or the player a
    /// reply is addressed to.
    Player(PlayerNumber),
    /// Concerns every player.
    Broadcast,
}

impl MessageContext {
    /// The player this context names, if any.
    pub fn player(self) -> Option<PlayerNumber> {
        match self {
            Self::Player(n) => Some(n),
            Self::Broadcast => None,
        }
    }
}

impl fmt::Display for MessageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(n) => write!(f, "{n}"),
            Self::Broadcast => write!(f, "everyone"),
        }
    }
}

/// What a message says.
///
/// `#[serde(tag = "type")]` puts the variant name inside the object:
/// `{ "type": "TurnEnded", "next": 3 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MessageKind {
    // -- Handshake ---------------------------------------------------------
    /// Client → server: "I'd like to be this player."
    PlayerNumberRequest { number: PlayerNumber },

    /// Server → client: "Someone already has that number."
    PlayerNumberTaken { number: PlayerNumber },

    /// Server → client: the last request succeeded. The context names
    /// the player it was accepted for.
    Acknowledged,

    // -- Map synchronization ----------------------------------------------
    /// Client → server: send me everything I'm allowed to see.
    FullMapRequest,

    /// Server → client: the terrain at `point` is now `tile`.
    TerrainChanged { point: Point, tile: TileType },

    /// Server → client: `fixture` now stands at `point`. Opponents'
    /// units arrive as [`Fixture::Proxy`].
    FixtureAdded { point: Point, fixture: Fixture },

    /// Client → server: place a new unit of `kind` at `point`.
    FixturePlacementRequest { kind: UnitKind, point: Point },

    /// Both directions: a move order (client → server) or a completed
    /// move (server → client).
    FixtureMoved {
        source: Point,
        dest: Point,
        fixture_id: FixtureId,
    },

    /// Server → client: the fixture at `point` is gone. `fixture_id` of
    /// `None` matches whatever is there (used when streaming empty
    /// cells). Client → server it asks for the removal of an own
    /// fixture.
    FixtureRemoved {
        point: Point,
        fixture_id: Option<FixtureId>,
    },

    // -- Turns --------------------------------------------------------------
    /// Both directions: the sender ends their turn (client → server), or
    /// it is now `next`'s turn (server → client).
    TurnEnded { next: PlayerNumber },

    // -- Control --------------------------------------------------------------
    /// Server → client: the last request was rejected.
    ProtocolError { reason: String },

    /// Several messages travelling as one. Expanded into its
    /// constituents before transmission.
    Batch { messages: Vec<Message> },

    /// Either side is leaving.
    Quit,
}

impl MessageKind {
    /// The variant name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlayerNumberRequest { .. } => "PlayerNumberRequest",
            Self::PlayerNumberTaken { .. } => "PlayerNumberTaken",
            Self::Acknowledged => "Acknowledged",
            Self::FullMapRequest => "FullMapRequest",
            Self::TerrainChanged { .. } => "TerrainChanged",
            Self::FixtureAdded { .. } => "FixtureAdded",
            Self::FixturePlacementRequest { .. } => "FixturePlacementRequest",
            Self::FixtureMoved { .. } => "FixtureMoved",
            Self::FixtureRemoved { .. } => "FixtureRemoved",
            Self::TurnEnded { .. } => "TurnEnded",
            Self::ProtocolError { .. } => "ProtocolError",
            Self::Batch { .. } => "Batch",
            Self::Quit => "Quit",
        }
    }
}

/// One unit of communication between a client and the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub context: MessageContext,
    pub kind: MessageKind,
}

impl Message {
    pub fn new(context: MessageContext, kind: MessageKind) -> Self {
        Self { context, kind }
    }

    /// A message concerning one player.
    pub fn to(player: PlayerNumber, kind: MessageKind) -> Self {
        Self::new(MessageContext::Player(player), kind)
    }

    /// A message concerning everyone.
    pub fn broadcast(kind: MessageKind) -> Self {
        Self::new(MessageContext::Broadcast, kind)
    }

    /// Wraps `messages` in a single batch.
    pub fn batch(context: MessageContext, messages: Vec<Message>) -> Self {
        Self::new(context, MessageKind::Batch { messages })
    }

    /// A rejection notice with the given reason.
    pub fn error(context: MessageContext, reason: impl Into<String>) -> Self {
        Self::new(
            context,
            MessageKind::ProtocolError {
                reason: reason.into(),
            },
        )
    }

    /// Expands batches (nested ones included) into their constituents,
    /// preserving order. A non-batch message expands to itself.
    pub fn flatten(self) -> Vec<Message> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<Message>) {
        match self.kind {
            MessageKind::Batch { messages } => {
                for message in messages {
                    message.flatten_into(out);
                }
            }
            _ => out.push(self),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for {}", self.kind.name(), self.context)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use skirmish_map::{Feature, HealthTier, UnitKind};

    use super::*;

    fn round_trip(msg: &Message) -> Message {
        let bytes = serde_json::to_vec(msg).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn every_kind() -> Vec<MessageKind> {
        let unit = UnitKind::Archer.build(FixtureId(3), PlayerNumber(1));
        vec![
            MessageKind::PlayerNumberRequest {
                number: PlayerNumber(0),
            },
            MessageKind::PlayerNumberTaken {
                number: PlayerNumber(0),
            },
            MessageKind::Acknowledged,
            MessageKind::FullMapRequest,
            MessageKind::TerrainChanged {
                point: Point::new(1, 2),
                tile: TileType::Brush,
            },
            MessageKind::FixtureAdded {
                point: Point::new(1, 2),
                fixture: Fixture::Unit(unit.clone()),
            },
            MessageKind::FixtureAdded {
                point: Point::new(1, 2),
                fixture: Fixture::Unit(unit).redacted(),
            },
            MessageKind::FixtureAdded {
                point: Point::new(0, 0),
                fixture: Feature::new(FixtureId(9), "Tree", 'T', "tree.png").into(),
            },
            MessageKind::FixturePlacementRequest {
                kind: UnitKind::Swordsman,
                point: Point::new(4, 4),
            },
            MessageKind::FixtureMoved {
                source: Point::new(2, 2),
                dest: Point::new(3, 2),
                fixture_id: FixtureId(1),
            },
            MessageKind::FixtureRemoved {
                point: Point::new(2, 2),
                fixture_id: Some(FixtureId(1)),
            },
            MessageKind::FixtureRemoved {
                point: Point::new(2, 2),
                fixture_id: None,
            },
            MessageKind::TurnEnded {
                next: PlayerNumber(1),
            },
            MessageKind::ProtocolError {
                reason: "not your turn".into(),
            },
            MessageKind::Batch {
                messages: vec![Message::broadcast(MessageKind::Quit)],
            },
            MessageKind::Quit,
        ]
    }

    #[test]
    fn test_every_kind_survives_round_trip() {
        for kind in every_kind() {
            for context in [MessageContext::Player(PlayerNumber(2)), MessageContext::Broadcast] {
                let msg = Message::new(context, kind.clone());
                assert_eq!(round_trip(&msg), msg, "{}", kind.name());
            }
        }
    }

    #[test]
    fn test_message_json_shape() {
        let msg = Message::to(
            PlayerNumber(2),
            MessageKind::TurnEnded {
                next: PlayerNumber(3),
            },
        );
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["context"]["Player"], 2);
        assert_eq!(json["kind"]["type"], "TurnEnded");
        assert_eq!(json["kind"]["next"], 3);
    }

    #[test]
    fn test_broadcast_context_serializes_as_string() {
        let json = serde_json::to_value(Message::broadcast(MessageKind::Quit)).unwrap();
        assert_eq!(json["context"], "Broadcast");
    }

    #[test]
    fn test_wildcard_removal_serializes_null_id() {
        let msg = Message::broadcast(MessageKind::FixtureRemoved {
            point: Point::new(0, 0),
            fixture_id: None,
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json["kind"]["fixture_id"].is_null());
    }

    #[test]
    fn test_proxy_on_wire_has_no_precise_stats() {
        let unit = UnitKind::Swordsman
            .build(FixtureId(1), PlayerNumber(0))
            .with_hit_points(4);
        let msg = Message::to(
            PlayerNumber(1),
            MessageKind::FixtureAdded {
                point: Point::new(2, 2),
                fixture: Fixture::Unit(unit).redacted(),
            },
        );
        let text = serde_json::to_string(&msg).unwrap();
        assert!(!text.contains("hit_points"));
        assert!(!text.contains("sides"));

        match round_trip(&msg).kind {
            MessageKind::FixtureAdded {
                fixture: Fixture::Proxy(proxy),
                ..
            } => assert_eq!(proxy.health(), HealthTier::Wounded),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_flatten_expands_nested_batches_in_order() {
        let a = Message::broadcast(MessageKind::Acknowledged);
        let b = Message::broadcast(MessageKind::FullMapRequest);
        let c = Message::broadcast(MessageKind::Quit);
        let nested = Message::batch(
            MessageContext::Broadcast,
            vec![
                a.clone(),
                Message::batch(MessageContext::Broadcast, vec![b.clone()]),
                Message::batch(MessageContext::Broadcast, vec![]),
                c.clone(),
            ],
        );

        assert_eq!(nested.flatten(), vec![a, b, c]);
    }

    #[test]
    fn test_flatten_non_batch_is_itself() {
        let msg = Message::to(PlayerNumber(0), MessageKind::Acknowledged);
        assert_eq!(msg.clone().flatten(), vec![msg]);
    }

    #[test]
    fn test_context_player_accessor() {
        assert_eq!(
            MessageContext::Player(PlayerNumber(4)).player(),
            Some(PlayerNumber(4))
        );
        assert_eq!(MessageContext::Broadcast.player(), None);
    }

    #[test]
    fn test_message_display_names_kind_and_context() {
        let msg = Message::to(PlayerNumber(1), MessageKind::FullMapRequest);
        assert_eq!(msg.to_string(), "FullMapRequest for player 1");
    }
}
