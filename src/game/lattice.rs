//! The staggered bubble lattice and its world-space metric.
//!
//! Rows sit `1.7 × radius` apart, columns `2 × radius` apart, and every odd
//! row shifts half a column to the right. Cell (0, 0) is the top-left cell,
//! one radius under the ceiling; rows grow downward.

use std::fmt;

use bevy::prelude::*;

/// Radius of a bubble in world units.
pub const BUBBLE_RADIUS: f32 = 20.0;

/// Vertical distance between row centers.
pub const ROW_STEP: f32 = BUBBLE_RADIUS * 1.7;

/// Horizontal distance between column centers within a row.
pub const COL_STEP: f32 = BUBBLE_RADIUS * 2.0;

/// Columns in an even row. Odd rows hold one fewer so their shifted cells
/// stay inside the walls.
pub const GRID_COLS: i32 = 12;

/// Rows of cell capacity before the board runs out below the danger line.
pub const GRID_ROWS: i32 = 14;

pub const LEFT_WALL: f32 = -(GRID_COLS as f32) * BUBBLE_RADIUS;
pub const RIGHT_WALL: f32 = GRID_COLS as f32 * BUBBLE_RADIUS;
pub const TOP_WALL: f32 = 280.0;
pub const BOTTOM_WALL: f32 = -280.0;

/// Row 0 centers sit one radius under the ceiling.
pub const GRID_TOP_Y: f32 = TOP_WALL - BUBBLE_RADIUS;

/// A bubble settling below this line ends the round.
pub const DANGER_LINE_Y: f32 = BOTTOM_WALL + 100.0;

/// Neighbor reach used by the matching rules. On the lattice this captures
/// exactly the six adjacent cells; the tests pin that equivalence down.
pub const NEIGHBOR_REACH: f32 = BUBBLE_RADIUS * 2.5;

/// A cell address on the lattice.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub struct GridCoord {
    pub col: i32,
    pub row: i32,
}

impl GridCoord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    fn in_shifted_row(self) -> bool {
        self.row % 2 != 0
    }

    /// The six adjacent cells. The diagonal partners depend on row parity
    /// because odd rows sit half a column to the right.
    pub fn neighbors(self) -> [GridCoord; 6] {
        let GridCoord { col, row } = self;
        if self.in_shifted_row() {
            [
                GridCoord::new(col + 1, row),
                GridCoord::new(col + 1, row - 1),
                GridCoord::new(col, row - 1),
                GridCoord::new(col - 1, row),
                GridCoord::new(col, row + 1),
                GridCoord::new(col + 1, row + 1),
            ]
        } else {
            [
                GridCoord::new(col + 1, row),
                GridCoord::new(col, row - 1),
                GridCoord::new(col - 1, row - 1),
                GridCoord::new(col - 1, row),
                GridCoord::new(col - 1, row + 1),
                GridCoord::new(col, row + 1),
            ]
        }
    }

    /// World position of this cell's center.
    pub fn to_world(self) -> Vec2 {
        let shift = if self.in_shifted_row() {
            BUBBLE_RADIUS
        } else {
            0.0
        };
        let x = LEFT_WALL + BUBBLE_RADIUS + shift + COL_STEP * self.col as f32;
        let y = GRID_TOP_Y - ROW_STEP * self.row as f32;
        Vec2::new(x, y)
    }

    /// Nearest cell to a world position. The row rounds first; the column
    /// then rounds within that row's shift.
    pub fn from_world(pos: Vec2) -> Self {
        let row = ((GRID_TOP_Y - pos.y) / ROW_STEP).round() as i32;
        let shift = if row % 2 != 0 { BUBBLE_RADIUS } else { 0.0 };
        let col = ((pos.x - LEFT_WALL - BUBBLE_RADIUS - shift) / COL_STEP).round() as i32;
        Self { col, row }
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_roundtrip() {
        let cells = [
            GridCoord::new(0, 0),
            GridCoord::new(11, 0),
            GridCoord::new(0, 1),
            GridCoord::new(10, 1),
            GridCoord::new(5, 6),
            GridCoord::new(7, 13),
        ];
        for cell in cells {
            assert_eq!(GridCoord::from_world(cell.to_world()), cell);
        }
    }

    #[test]
    fn test_odd_rows_shift_half_a_column() {
        let even = GridCoord::new(3, 2).to_world();
        let odd = GridCoord::new(3, 3).to_world();
        assert!((odd.x - even.x - BUBBLE_RADIUS).abs() < 1e-3);
        assert!((even.y - odd.y - ROW_STEP).abs() < 1e-3);
    }

    #[test]
    fn test_only_row_zero_is_ceiling_anchored() {
        let row0 = GridCoord::new(0, 0).to_world().y;
        let row1 = GridCoord::new(0, 1).to_world().y;
        assert!(TOP_WALL - row0 < 2.0 * BUBBLE_RADIUS);
        assert!(TOP_WALL - row1 >= 2.0 * BUBBLE_RADIUS);
    }

    #[test]
    fn test_neighbor_tables_equal_reach_ball() {
        // One even and one odd center; every lattice cell within
        // NEIGHBOR_REACH of the center must be exactly the six table
        // entries.
        for center in [GridCoord::new(5, 4), GridCoord::new(5, 5)] {
            let mut in_reach = Vec::new();
            for col in center.col - 3..=center.col + 3 {
                for row in center.row - 3..=center.row + 3 {
                    let other = GridCoord::new(col, row);
                    if other == center {
                        continue;
                    }
                    if other.to_world().distance(center.to_world()) < NEIGHBOR_REACH {
                        in_reach.push(other);
                    }
                }
            }
            let mut table = center.neighbors().to_vec();
            in_reach.sort_by_key(|c| (c.row, c.col));
            table.sort_by_key(|c| (c.row, c.col));
            assert_eq!(in_reach, table, "reach ball mismatch at {center}");
        }
    }

    #[test]
    fn test_neighbors_are_mutual() {
        for center in [GridCoord::new(4, 6), GridCoord::new(2, 9)] {
            for neighbor in center.neighbors() {
                assert!(
                    neighbor.neighbors().contains(&center),
                    "{neighbor} does not list {center} back"
                );
            }
        }
    }
}
