//! Fixtures: everything that can occupy a board cell.
//!
//! A [`Fixture`] is one of three things:
//!
//! - [`Unit`]: the full record of a combat unit, including exact hit
//!   points and die sizes. Only the owning player ever sees this.
//! - [`ProxyUnit`]: the redacted projection of a unit that opponents
//!   see: a coarse [`HealthTier`] and dice counts, nothing more.
//! - [`Feature`]: any other board object (a tree, a wall).
//!
//! Fog of war is expressed through [`Fixture::view_for`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{FixtureId, PlayerNumber};

// ---------------------------------------------------------------------------
// Dice and health
// ---------------------------------------------------------------------------

/// An attack roll such as `2d8`: `count` dice with `sides` faces each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dice {
    pub count: u32,
    pub sides: u32,
}

impl Dice {
    /// No attack of this kind.
    pub const NONE: Dice = Dice { count: 0, sides: 0 };

    pub const fn new(count: u32, sides: u32) -> Self {
        Self { count, sides }
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// Coarse health bucket shown to players who don't own a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthTier {
    Hale,
    Bloodied,
    Wounded,
    Critical,
    Dead,
}

impl HealthTier {
    /// Buckets `current` out of `max` hit points.
    ///
    /// Integer arithmetic throughout: Dead at zero or below, then
    /// Critical up to a quarter, Wounded up to a half, Bloodied up to
    /// three quarters, Hale above that.
    pub fn from_hit_points(current: i32, max: i32) -> Self {
        if current <= 0 {
            Self::Dead
        } else if current <= max / 4 {
            Self::Critical
        } else if current <= max / 2 {
            Self::Wounded
        } else if i64::from(current) * 4 <= i64::from(max) * 3 {
            Self::Bloodied
        } else {
            Self::Hale
        }
    }
}

// ---------------------------------------------------------------------------
// Unit
// ---------------------------------------------------------------------------

/// The complete record of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: FixtureId,
    pub owner: PlayerNumber,
    pub description: String,
    pub glyph: char,
    pub image: String,
    pub max_hit_points: i32,
    pub hit_points: i32,
    pub melee: Dice,
    pub ranged: Dice,
}

impl Unit {
    pub fn health_tier(&self) -> HealthTier {
        HealthTier::from_hit_points(self.hit_points, self.max_hit_points)
    }

    /// Returns the same unit with its current hit points replaced.
    pub fn with_hit_points(mut self, hit_points: i32) -> Self {
        self.hit_points = hit_points;
        self
    }
}

/// The unit types a player may ask the server to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Swordsman,
    Archer,
}

impl UnitKind {
    /// Builds a fresh, unhurt unit of this kind.
    pub fn build(self, id: FixtureId, owner: PlayerNumber) -> Unit {
        let (description, glyph, image, hit_points, melee, ranged) = match self {
            Self::Swordsman => (
                "Swordsman",
                'S',
                "swordsman.png",
                12,
                Dice::new(2, 8),
                Dice::NONE,
            ),
            Self::Archer => (
                "Archer",
                'A',
                "archer.png",
                10,
                Dice::new(1, 3),
                Dice::new(2, 6),
            ),
        };
        Unit {
            id,
            owner,
            description: description.to_string(),
            glyph,
            image: image.to_string(),
            max_hit_points: hit_points,
            hit_points,
            melee,
            ranged,
        }
    }
}

// ---------------------------------------------------------------------------
// ProxyUnit
// ---------------------------------------------------------------------------

/// What an opponent is allowed to know about a unit.
///
/// Built from a [`Unit`] and read-only afterwards. Hit points and die
/// sizes never make it into a proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyUnit {
    id: FixtureId,
    owner: PlayerNumber,
    description: String,
    glyph: char,
    image: String,
    health: HealthTier,
    melee_dice: u32,
    ranged_dice: u32,
}

impl ProxyUnit {
    pub fn id(&self) -> FixtureId {
        self.id
    }

    pub fn owner(&self) -> PlayerNumber {
        self.owner
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn glyph(&self) -> char {
        self.glyph
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn health(&self) -> HealthTier {
        self.health
    }

    /// Number of melee dice, without their size.
    pub fn melee_dice(&self) -> u32 {
        self.melee_dice
    }

    /// Number of ranged dice, without their size.
    pub fn ranged_dice(&self) -> u32 {
        self.ranged_dice
    }
}

impl From<&Unit> for ProxyUnit {
    fn from(unit: &Unit) -> Self {
        Self {
            id: unit.id,
            owner: unit.owner,
            description: unit.description.clone(),
            glyph: unit.glyph,
            image: unit.image.clone(),
            health: unit.health_tier(),
            melee_dice: unit.melee.count,
            ranged_dice: unit.ranged.count,
        }
    }
}

// ---------------------------------------------------------------------------
// Feature
// ---------------------------------------------------------------------------

/// A non-unit board object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FixtureId,
    pub owner: PlayerNumber,
    pub description: String,
    pub glyph: char,
    pub image: String,
}

impl Feature {
    /// A neutral feature (owned by [`PlayerNumber::NONE`]).
    pub fn new(
        id: FixtureId,
        description: impl Into<String>,
        glyph: char,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id,
            owner: PlayerNumber::NONE,
            description: description.into(),
            glyph,
            image: image.into(),
        }
    }

    pub fn owned_by(mut self, owner: PlayerNumber) -> Self {
        self.owner = owner;
        self
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// Anything occupying a board cell.
///
/// On the wire this is an internally tagged object, e.g.
/// `{"kind":"Proxy","id":4,"owner":1,...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Fixture {
    Unit(Unit),
    Proxy(ProxyUnit),
    Feature(Feature),
}

impl Fixture {
    pub fn id(&self) -> FixtureId {
        match self {
            Self::Unit(u) => u.id,
            Self::Proxy(p) => p.id(),
            Self::Feature(f) => f.id,
        }
    }

    pub fn owner(&self) -> PlayerNumber {
        match self {
            Self::Unit(u) => u.owner,
            Self::Proxy(p) => p.owner(),
            Self::Feature(f) => f.owner,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Unit(u) => &u.description,
            Self::Proxy(p) => p.description(),
            Self::Feature(f) => &f.description,
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            Self::Unit(u) => u.glyph,
            Self::Proxy(p) => p.glyph(),
            Self::Feature(f) => f.glyph,
        }
    }

    pub fn image(&self) -> &str {
        match self {
            Self::Unit(u) => &u.image,
            Self::Proxy(p) => p.image(),
            Self::Feature(f) => &f.image,
        }
    }

    /// Units and their proxies can move; features can't.
    pub fn is_unit(&self) -> bool {
        matches!(self, Self::Unit(_) | Self::Proxy(_))
    }

    pub fn is_proxy(&self) -> bool {
        matches!(self, Self::Proxy(_))
    }

    /// The projection shown to players who don't own this fixture.
    /// Units become proxies; everything else passes through.
    pub fn redacted(&self) -> Fixture {
        match self {
            Self::Unit(u) => Self::Proxy(ProxyUnit::from(u)),
            other => other.clone(),
        }
    }

    /// The fixture as `viewer` is allowed to see it.
    pub fn view_for(&self, viewer: PlayerNumber) -> Fixture {
        if self.owner() == viewer {
            self.clone()
        } else {
            self.redacted()
        }
    }
}

impl From<Unit> for Fixture {
    fn from(unit: Unit) -> Self {
        Self::Unit(unit)
    }
}

impl From<Feature> for Fixture {
    fn from(feature: Feature) -> Self {
        Self::Feature(feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swordsman(owner: i32) -> Unit {
        UnitKind::Swordsman.build(FixtureId(1), PlayerNumber(owner))
    }

    #[test]
    fn test_health_tier_boundaries() {
        assert_eq!(HealthTier::from_hit_points(12, 12), HealthTier::Hale);
        assert_eq!(HealthTier::from_hit_points(10, 12), HealthTier::Hale);
        assert_eq!(HealthTier::from_hit_points(9, 12), HealthTier::Bloodied);
        assert_eq!(HealthTier::from_hit_points(6, 12), HealthTier::Wounded);
        assert_eq!(HealthTier::from_hit_points(3, 12), HealthTier::Critical);
        assert_eq!(HealthTier::from_hit_points(1, 12), HealthTier::Critical);
        assert_eq!(HealthTier::from_hit_points(0, 12), HealthTier::Dead);
        assert_eq!(HealthTier::from_hit_points(-4, 12), HealthTier::Dead);
    }

    #[test]
    fn test_health_tier_huge_max_does_not_overflow() {
        assert_eq!(HealthTier::from_hit_points(i32::MAX, i32::MAX), HealthTier::Hale);
        assert_eq!(
            HealthTier::from_hit_points(i32::MAX / 4 * 3, i32::MAX),
            HealthTier::Bloodied
        );
        assert_eq!(HealthTier::from_hit_points(1, i32::MAX), HealthTier::Critical);
    }

    #[test]
    fn test_unit_kind_build_templates() {
        let sword = swordsman(0);
        assert_eq!(sword.max_hit_points, 12);
        assert_eq!(sword.hit_points, 12);
        assert_eq!(sword.melee, Dice::new(2, 8));
        assert_eq!(sword.ranged, Dice::NONE);

        let archer = UnitKind::Archer.build(FixtureId(2), PlayerNumber(1));
        assert_eq!(archer.max_hit_points, 10);
        assert_eq!(archer.melee, Dice::new(1, 3));
        assert_eq!(archer.ranged, Dice::new(2, 6));
        assert_eq!(archer.owner, PlayerNumber(1));
    }

    #[test]
    fn test_proxy_from_unit_hides_precise_values() {
        let unit = swordsman(0).with_hit_points(5);
        let proxy = ProxyUnit::from(&unit);

        assert_eq!(proxy.id(), unit.id);
        assert_eq!(proxy.owner(), unit.owner);
        assert_eq!(proxy.health(), HealthTier::Wounded);
        assert_eq!(proxy.melee_dice(), 2);
        assert_eq!(proxy.ranged_dice(), 0);

        let json = serde_json::to_string(&proxy).unwrap();
        assert!(!json.contains("hit_points"));
        assert!(!json.contains("sides"));
    }

    #[test]
    fn test_view_for_owner_is_full_and_others_redacted() {
        let fixture = Fixture::from(swordsman(0));

        assert_eq!(fixture.view_for(PlayerNumber(0)), fixture);
        let other = fixture.view_for(PlayerNumber(1));
        assert!(other.is_proxy());
        assert_eq!(other.id(), fixture.id());
        assert_eq!(other.glyph(), 'S');
    }

    #[test]
    fn test_redacted_passes_features_through() {
        let tree = Fixture::from(Feature::new(FixtureId(7), "Tree", 'T', "tree.png"));
        assert_eq!(tree.redacted(), tree);
        assert_eq!(tree.owner(), PlayerNumber::NONE);
        assert!(!tree.is_unit());
    }

    #[test]
    fn test_fixture_wire_form_is_internally_tagged() {
        let fixture = Fixture::from(swordsman(0)).redacted();
        let value = serde_json::to_value(&fixture).unwrap();
        assert_eq!(value["kind"], "Proxy");
        assert_eq!(value["health"], "Hale");

        let back: Fixture = serde_json::from_value(value).unwrap();
        assert_eq!(back, fixture);
    }
}
