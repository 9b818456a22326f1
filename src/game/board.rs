//! The board that holds all settled bubbles.
//!
//! Storage is a sparse HashMap keyed by lattice cell, which keeps the common
//! operations cheap and lets the matching algorithms work on plain cell sets.
//! The board records each bubble's mood directly so match and sweep logic
//! never has to consult the ECS.

use bevy::prelude::*;
use std::collections::{HashMap, HashSet};

use super::bubble::Mood;
use super::lattice::{BUBBLE_RADIUS, DANGER_LINE_Y, GRID_COLS, GRID_ROWS, GridCoord};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<BubbleGrid>();
    app.register_type::<BubbleGrid>();
    app.register_type::<GridBounds>();
    app.register_type::<GridCoord>();
}

/// The rectangular cell capacity of the board.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct GridBounds {
    pub cols: i32,
    pub rows: i32,
}

impl Default for GridBounds {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            rows: GRID_ROWS,
        }
    }
}

impl GridBounds {
    /// Highest valid column in a row. Shifted (odd) rows give up their last
    /// column so every cell stays inside the walls.
    pub fn max_col_in_row(&self, row: i32) -> i32 {
        if row % 2 != 0 {
            self.cols - 2
        } else {
            self.cols - 1
        }
    }

    pub fn contains(&self, cell: GridCoord) -> bool {
        cell.row >= 0
            && cell.row < self.rows
            && cell.col >= 0
            && cell.col <= self.max_col_in_row(cell.row)
    }

    /// All cells of one row, left to right.
    pub fn row_cells(&self, row: i32) -> impl Iterator<Item = GridCoord> {
        (0..=self.max_col_in_row(row)).map(move |col| GridCoord::new(col, row))
    }

    /// Every cell of the board, top row first.
    pub fn all_cells(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.rows).flat_map(|row| self.row_cells(row))
    }
}

/// The main board resource.
#[derive(Resource, Debug, Default, Reflect)]
#[reflect(Resource)]
pub struct BubbleGrid {
    /// Mood of the settled bubble in each occupied cell.
    #[reflect(ignore)]
    cells: HashMap<GridCoord, Mood>,

    /// Entity rendering each occupied cell. Kept in lockstep with `cells`.
    #[reflect(ignore)]
    entities: HashMap<GridCoord, Entity>,

    pub bounds: GridBounds,
}

impl BubbleGrid {
    pub fn is_occupied(&self, cell: GridCoord) -> bool {
        self.cells.contains_key(&cell)
    }

    pub fn mood_at(&self, cell: GridCoord) -> Option<Mood> {
        self.cells.get(&cell).copied()
    }

    /// Settle a bubble into a cell. Cells hold at most one bubble; settling
    /// always routes through [`Self::closest_free_cell`], so an occupied
    /// target here is a bug in the caller.
    pub fn place(&mut self, cell: GridCoord, mood: Mood, entity: Entity) {
        let previous = self.cells.insert(cell, mood);
        debug_assert!(previous.is_none(), "cell {cell} double-booked");
        self.entities.insert(cell, entity);
    }

    /// Remove the bubble in a cell, returning its entity.
    pub fn remove(&mut self, cell: GridCoord) -> Option<Entity> {
        self.cells.remove(&cell);
        self.entities.remove(&cell)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.entities.clear();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over occupied cells and their moods.
    pub fn cells(&self) -> impl Iterator<Item = (GridCoord, Mood)> + '_ {
        self.cells.iter().map(|(cell, mood)| (*cell, *mood))
    }

    /// The moods currently on the board, one per bubble.
    pub fn moods(&self) -> impl Iterator<Item = Mood> + '_ {
        self.cells.values().copied()
    }

    /// Cells in the ceiling-anchored row. Connectivity reachability starts
    /// here.
    pub fn anchor_cells(&self) -> Vec<GridCoord> {
        self.cells.keys().filter(|c| c.row == 0).copied().collect()
    }

    /// Whether a free bubble at `pos` is touching any settled bubble.
    pub fn touches(&self, pos: Vec2) -> bool {
        self.cells
            .keys()
            .any(|cell| cell.to_world().distance(pos) < 2.0 * BUBBLE_RADIUS)
    }

    /// Whether any settled bubble has sunk past the danger line.
    pub fn overrun(&self) -> bool {
        self.cells.keys().any(|cell| cell.to_world().y < DANGER_LINE_Y)
    }

    /// Resolve a world position to the nearest free in-bounds cell.
    ///
    /// The rounded target wins when it is free. Otherwise the search walks
    /// expanding neighbor rings, which also redirects targets that rounded
    /// past the walls or above the ceiling. Returns `None` only when the
    /// board has no free cell in reach.
    pub fn closest_free_cell(&self, world_pos: Vec2) -> Option<GridCoord> {
        let target = GridCoord::from_world(world_pos);

        if self.bounds.contains(target) && !self.is_occupied(target) {
            return Some(target);
        }

        let mut checked = HashSet::new();
        let mut to_check = vec![target];

        while !to_check.is_empty() {
            let mut next_ring = Vec::new();

            for cell in to_check {
                if !checked.insert(cell) {
                    continue;
                }

                if self.bounds.contains(cell) && !self.is_occupied(cell) {
                    return Some(cell);
                }

                for neighbor in cell.neighbors() {
                    if !checked.contains(&neighbor) {
                        next_ring.push(neighbor);
                    }
                }
            }

            to_check = next_ring;

            // Safety limit to prevent unbounded ring growth on a full board.
            if checked.len() > 1000 {
                break;
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::lattice::{GRID_TOP_Y, TOP_WALL};

    fn place(grid: &mut BubbleGrid, cell: GridCoord, mood: Mood) {
        grid.place(cell, mood, Entity::PLACEHOLDER);
    }

    #[test]
    fn test_row_capacity_depends_on_parity() {
        let bounds = GridBounds::default();
        assert_eq!(bounds.row_cells(0).count(), 12);
        assert_eq!(bounds.row_cells(1).count(), 11);
        assert!(bounds.contains(GridCoord::new(11, 0)));
        assert!(!bounds.contains(GridCoord::new(11, 1)));
        assert!(!bounds.contains(GridCoord::new(0, -1)));
        assert!(!bounds.contains(GridCoord::new(0, 14)));
    }

    #[test]
    fn test_place_and_remove() {
        let mut grid = BubbleGrid::default();
        let cell = GridCoord::new(3, 2);
        assert!(!grid.is_occupied(cell));

        place(&mut grid, cell, Mood::Sad);
        assert!(grid.is_occupied(cell));
        assert_eq!(grid.mood_at(cell), Some(Mood::Sad));
        assert_eq!(grid.len(), 1);

        assert!(grid.remove(cell).is_some());
        assert!(grid.is_empty());
        assert_eq!(grid.mood_at(cell), None);
    }

    #[test]
    fn test_anchor_cells_are_row_zero_only() {
        let mut grid = BubbleGrid::default();
        place(&mut grid, GridCoord::new(0, 0), Mood::Happy);
        place(&mut grid, GridCoord::new(4, 0), Mood::Angry);
        place(&mut grid, GridCoord::new(2, 1), Mood::Sad);

        let mut anchors = grid.anchor_cells();
        anchors.sort_by_key(|c| c.col);
        assert_eq!(anchors, vec![GridCoord::new(0, 0), GridCoord::new(4, 0)]);
    }

    #[test]
    fn test_touch_distance_is_two_radii() {
        let mut grid = BubbleGrid::default();
        let center = GridCoord::new(0, 0).to_world();
        place(&mut grid, GridCoord::new(0, 0), Mood::Fear);

        assert!(grid.touches(center + Vec2::new(2.0 * BUBBLE_RADIUS - 1.0, 0.0)));
        assert!(!grid.touches(center + Vec2::new(2.0 * BUBBLE_RADIUS + 1.0, 0.0)));
    }

    #[test]
    fn test_overrun_at_danger_line() {
        let mut grid = BubbleGrid::default();
        place(&mut grid, GridCoord::new(5, 12), Mood::Sad);
        assert!(!grid.overrun());

        place(&mut grid, GridCoord::new(5, 13), Mood::Sad);
        assert!(grid.overrun());
    }

    #[test]
    fn test_free_target_snaps_directly() {
        let grid = BubbleGrid::default();
        let cell = GridCoord::new(6, 3);
        assert_eq!(grid.closest_free_cell(cell.to_world()), Some(cell));
    }

    #[test]
    fn test_occupied_target_redirects_to_a_neighbor() {
        let mut grid = BubbleGrid::default();
        let target = GridCoord::new(6, 3);
        place(&mut grid, target, Mood::Angry);

        let landed = grid.closest_free_cell(target.to_world());
        let landed = landed.unwrap();
        assert_ne!(landed, target);
        assert!(target.neighbors().contains(&landed));
        assert!(!grid.is_occupied(landed));
    }

    #[test]
    fn test_ceiling_overshoot_lands_in_row_zero() {
        let grid = BubbleGrid::default();
        // A position slightly above the lattice rounds to row -1 and must
        // be redirected inside the board.
        let pos = Vec2::new(GridCoord::new(0, 0).to_world().x, TOP_WALL + 1.0);
        assert!(pos.y > GRID_TOP_Y);

        let landed = grid.closest_free_cell(pos).unwrap();
        assert_eq!(landed.row, 0);
    }

    #[test]
    fn test_full_board_has_no_free_cell() {
        let mut grid = BubbleGrid::default();
        let bounds = grid.bounds;
        for cell in bounds.all_cells() {
            place(&mut grid, cell, Mood::Surprise);
        }
        assert_eq!(grid.closest_free_cell(Vec2::new(0.0, 0.0)), None);
    }
}
