//! The board: terrain for every point plus whatever stands on it.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;

use crate::{Fixture, FixtureId, MapError, PlayerNumber, Point, TileType};

/// Terrain and fixtures for one game.
///
/// The set of points with terrain *is* the board. Every fixture sits on
/// a point that has terrain; [`Board::from_parts`] and
/// [`Board::place_fixture`] enforce that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    terrain: BTreeMap<Point, TileType>,
    contents: HashMap<Point, Fixture>,
}

impl Board {
    /// An empty board with no points at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from terrain and fixtures.
    ///
    /// # Errors
    /// `MapError::FixtureOffBoard` if any fixture sits on a point with no
    /// terrain.
    pub fn from_parts(
        terrain: impl IntoIterator<Item = (Point, TileType)>,
        fixtures: impl IntoIterator<Item = (Point, Fixture)>,
    ) -> Result<Self, MapError> {
        let mut board = Self {
            terrain: terrain.into_iter().collect(),
            contents: HashMap::new(),
        };
        for (point, fixture) in fixtures {
            if !board.terrain.contains_key(&point) {
                return Err(MapError::FixtureOffBoard(point));
            }
            board.contents.insert(point, fixture);
        }
        Ok(board)
    }

    /// A `rows` x `columns` rectangle of a single tile type.
    pub fn filled(rows: i32, columns: i32, tile: TileType) -> Self {
        let terrain = (0..rows)
            .flat_map(|row| (0..columns).map(move |column| (Point::new(row, column), tile)));
        Self {
            terrain: terrain.collect(),
            contents: HashMap::new(),
        }
    }

    /// A `rows` x `columns` rectangle with each tile drawn uniformly from
    /// [`TileType::ALL`].
    pub fn random(rows: i32, columns: i32, rng: &mut impl Rng) -> Self {
        let mut terrain = BTreeMap::new();
        for row in 0..rows {
            for column in 0..columns {
                let tile = TileType::ALL[rng.random_range(0..TileType::ALL.len())];
                terrain.insert(Point::new(row, column), tile);
            }
        }
        Self {
            terrain,
            contents: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn contains(&self, point: Point) -> bool {
        self.terrain.contains_key(&point)
    }

    /// # Errors
    /// `MapError::NotOnBoard` for points outside the board.
    pub fn terrain_at(&self, point: Point) -> Result<TileType, MapError> {
        self.terrain
            .get(&point)
            .copied()
            .ok_or(MapError::NotOnBoard(point))
    }

    pub fn contents_at(&self, point: Point) -> Option<&Fixture> {
        self.contents.get(&point)
    }

    /// Where the fixture with this ID currently stands. Linear in the
    /// number of fixtures.
    pub fn find_fixture(&self, id: FixtureId) -> Option<Point> {
        self.contents
            .iter()
            .find(|(_, fixture)| fixture.id() == id)
            .map(|(point, _)| *point)
    }

    pub fn fixture(&self, id: FixtureId) -> Option<&Fixture> {
        self.contents.values().find(|fixture| fixture.id() == id)
    }

    /// Every point on the board, in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.terrain.keys().copied()
    }

    /// Every point with its terrain and contents, in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Point, TileType, Option<&Fixture>)> + '_ {
        self.terrain
            .iter()
            .map(|(point, tile)| (*point, *tile, self.contents.get(point)))
    }

    /// Number of points on the board.
    pub fn len(&self) -> usize {
        self.terrain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terrain.is_empty()
    }

    pub fn fixture_count(&self) -> usize {
        self.contents.len()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Sets the terrain at `point`, adding the point to the board if it
    /// wasn't there already.
    pub fn set_terrain(&mut self, point: Point, tile: TileType) {
        self.terrain.insert(point, tile);
    }

    /// Puts `fixture` at `point`, replacing whatever was there.
    ///
    /// Occupancy rules belong to the caller; the board only insists the
    /// point exists.
    ///
    /// # Errors
    /// `MapError::NotOnBoard` if `point` has no terrain.
    pub fn place_fixture(&mut self, point: Point, fixture: Fixture) -> Result<(), MapError> {
        if !self.contains(point) {
            return Err(MapError::NotOnBoard(point));
        }
        self.contents.insert(point, fixture);
        Ok(())
    }

    /// Removes and returns whatever stands at `point`.
    pub fn remove_fixture(&mut self, point: Point) -> Option<Fixture> {
        self.contents.remove(&point)
    }

    // -----------------------------------------------------------------------
    // Fog of war
    // -----------------------------------------------------------------------

    /// A copy of the board as `viewer` may see it: same terrain, every
    /// fixture replaced by [`Fixture::view_for`].
    pub fn derive_view(&self, viewer: PlayerNumber) -> Board {
        Board {
            terrain: self.terrain.clone(),
            contents: self
                .contents
                .iter()
                .map(|(point, fixture)| (*point, fixture.view_for(viewer)))
                .collect(),
        }
    }
}
