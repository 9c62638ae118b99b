//! Board coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell on the board, addressed by row and column.
///
/// Points are plain values: two points with the same coordinates are the
/// same point. The derived ordering compares `row` first, then `column`,
/// so a `BTreeMap<Point, _>` iterates in row-major order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    pub row: i32,
    pub column: i32,
}

impl Point {
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }
}

impl From<(i32, i32)> for Point {
    fn from((row, column): (i32, i32)) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_ordering_is_row_major() {
        let mut points = vec![
            Point::new(1, 0),
            Point::new(0, 5),
            Point::new(1, -1),
            Point::new(0, 0),
        ];
        points.sort();
        assert_eq!(
            points,
            vec![
                Point::new(0, 0),
                Point::new(0, 5),
                Point::new(1, -1),
                Point::new(1, 0),
            ]
        );
    }

    #[test]
    fn test_point_equality_is_by_value() {
        assert_eq!(Point::new(3, 4), Point::from((3, 4)));
        assert_ne!(Point::new(3, 4), Point::new(4, 3));
    }

    #[test]
    fn test_point_display() {
        assert_eq!(Point::new(2, -7).to_string(), "(2, -7)");
    }
}
