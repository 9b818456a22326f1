//! Match detection - finding and popping runs of the same mood.
//!
//! Uses flood fill (BFS) over lattice cells to find connected groups
//! of same-mood bubbles. A run of 3+ pops, and shortly afterwards a
//! sweep releases any bubbles left hanging without a path to the
//! ceiling row.

use bevy::prelude::*;
use std::collections::{HashSet, VecDeque};

use super::{
    board::BubbleGrid,
    effects::PopAnimation,
    lattice::GridCoord,
    projectile::BubbleSettled,
    session::GameSession,
};
use crate::{PausableSystems, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.add_message::<MatchPopped>();
    app.add_message::<FloatingCleared>();

    app.configure_sets(
        Update,
        MatchSystems.after(super::projectile::ProjectileSystems),
    );

    // The settling bubble is spawned through commands, so flush them
    // before match detection hands entities to the pop animation.
    app.add_systems(
        Update,
        ApplyDeferred
            .after(super::projectile::ProjectileSystems)
            .before(MatchSystems)
            .run_if(in_state(Screen::Gameplay)),
    );

    app.add_systems(
        Update,
        (detect_matches, tick_float_sweeps)
            .chain()
            .in_set(PausableSystems)
            .in_set(MatchSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// System set for match detection systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchSystems;

/// Minimum run size to pop (match-3).
const MIN_MATCH_SIZE: usize = 3;

/// Pause between a pop and the floating-bubble sweep, in seconds.
const FLOAT_SWEEP_DELAY: f32 = 0.3;

/// Message sent when a run of matching bubbles is popped.
#[derive(Message, Debug, Clone)]
pub struct MatchPopped {
    pub cells: Vec<GridCoord>,
    pub count: usize,
}

/// Message sent when floating bubbles are released.
#[derive(Message, Debug, Clone)]
pub struct FloatingCleared {
    pub count: usize,
}

/// A scheduled floating-bubble sweep.
///
/// The sweep is stamped with the session generation that scheduled it,
/// so a sweep left over from an abandoned round never touches the next
/// round's board.
#[derive(Component, Debug)]
struct FloatSweep {
    timer: Timer,
    session: u64,
}

impl FloatSweep {
    fn is_stale(&self, current_generation: u64) -> bool {
        self.session != current_generation
    }
}

/// Detect and pop matching runs when a bubble settles.
fn detect_matches(
    mut commands: Commands,
    mut grid: ResMut<BubbleGrid>,
    session: Res<GameSession>,
    mut settled_events: MessageReader<BubbleSettled>,
    mut popped_events: MessageWriter<MatchPopped>,
) {
    for event in settled_events.read() {
        let matched = find_match(&grid, event.cell);
        if matched.len() < MIN_MATCH_SIZE {
            continue;
        }

        info!(
            "Found a run of {} {:?} bubbles at {}",
            matched.len(),
            event.mood,
            event.cell
        );

        for &cell in &matched {
            if let Some(entity) = grid.remove(cell) {
                commands.entity(entity).insert(PopAnimation::default());
            }
        }

        popped_events.write(MatchPopped {
            cells: matched.clone(),
            count: matched.len(),
        });

        commands.spawn((
            Name::new("Float Sweep"),
            FloatSweep {
                timer: Timer::from_seconds(FLOAT_SWEEP_DELAY, TimerMode::Once),
                session: session.generation,
            },
            DespawnOnExit(Screen::Gameplay),
        ));
    }
}

/// Find all connected bubbles of the same mood using flood fill (BFS).
///
/// Returns an empty list when the start cell is vacant.
fn find_match(grid: &BubbleGrid, start: GridCoord) -> Vec<GridCoord> {
    let Some(target) = grid.mood_at(start) else {
        return Vec::new();
    };

    let mut matched = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        if grid.mood_at(cell) != Some(target) {
            continue;
        }
        matched.push(cell);

        for neighbor in cell.neighbors() {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    matched
}

/// Run pending sweeps and release any bubbles without a path to the ceiling.
fn tick_float_sweeps(
    time: Res<Time>,
    mut commands: Commands,
    mut grid: ResMut<BubbleGrid>,
    session: Res<GameSession>,
    mut sweeps: Query<(Entity, &mut FloatSweep)>,
    mut floating_events: MessageWriter<FloatingCleared>,
) {
    for (sweep_entity, mut sweep) in &mut sweeps {
        sweep.timer.tick(time.delta());
        if !sweep.timer.finished() {
            continue;
        }

        commands.entity(sweep_entity).despawn();

        if sweep.is_stale(session.generation) {
            continue;
        }

        let floating = find_floating(&grid);
        if floating.is_empty() {
            continue;
        }

        info!("Releasing {} floating bubbles", floating.len());

        for &cell in &floating {
            if let Some(entity) = grid.remove(cell) {
                commands.entity(entity).insert(PopAnimation::default());
            }
        }

        floating_events.write(FloatingCleared {
            count: floating.len(),
        });
    }
}

/// Find all bubbles connected to the ceiling row using BFS.
fn find_anchored(grid: &BubbleGrid) -> HashSet<GridCoord> {
    let mut anchored = HashSet::new();
    let mut queue = VecDeque::new();

    for cell in grid.anchor_cells() {
        anchored.insert(cell);
        queue.push_back(cell);
    }

    while let Some(cell) = queue.pop_front() {
        for neighbor in cell.neighbors() {
            if grid.is_occupied(neighbor) && anchored.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    anchored
}

/// Find all occupied cells with no path to the ceiling row.
fn find_floating(grid: &BubbleGrid) -> Vec<GridCoord> {
    let anchored = find_anchored(grid);
    grid.cells()
        .map(|(cell, _)| cell)
        .filter(|cell| !anchored.contains(cell))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::bubble::Mood;
    use super::*;

    fn seed(grid: &mut BubbleGrid, cells: &[(i32, i32)], mood: Mood) {
        for &(col, row) in cells {
            grid.place(GridCoord::new(col, row), mood, Entity::PLACEHOLDER);
        }
    }

    #[test]
    fn test_match_stops_at_a_different_mood() {
        let mut grid = BubbleGrid::default();
        seed(&mut grid, &[(0, 0), (1, 0), (2, 0)], Mood::Angry);
        seed(&mut grid, &[(3, 0)], Mood::Sad);
        seed(&mut grid, &[(4, 0)], Mood::Angry);

        let matched = find_match(&grid, GridCoord::new(0, 0));

        assert_eq!(matched.len(), 3);
        assert!(!matched.contains(&GridCoord::new(3, 0)));
        assert!(!matched.contains(&GridCoord::new(4, 0)));
    }

    #[test]
    fn test_match_from_a_vacant_cell_is_empty() {
        let grid = BubbleGrid::default();
        assert!(find_match(&grid, GridCoord::new(3, 3)).is_empty());
    }

    #[test]
    fn test_a_pair_stays_below_the_pop_threshold() {
        let mut grid = BubbleGrid::default();
        seed(&mut grid, &[(0, 0), (1, 0)], Mood::Happy);

        let matched = find_match(&grid, GridCoord::new(1, 0));

        assert_eq!(matched.len(), 2);
        assert!(matched.len() < MIN_MATCH_SIZE);
    }

    #[test]
    fn test_settling_bubble_joins_the_run_it_lands_on() {
        let mut grid = BubbleGrid::default();
        seed(&mut grid, &[(0, 0), (1, 0), (2, 0)], Mood::Angry);

        // A bubble drifting in just under the left end of the run
        let landing = grid
            .closest_free_cell(GridCoord::new(0, 1).to_world())
            .unwrap();
        assert_eq!(landing, GridCoord::new(0, 1));
        grid.place(landing, Mood::Angry, Entity::PLACEHOLDER);

        let matched = find_match(&grid, landing);
        assert_eq!(matched.len(), 4);
    }

    #[test]
    fn test_removing_the_anchor_strands_the_column() {
        let mut grid = BubbleGrid::default();
        seed(&mut grid, &[(0, 0), (0, 1), (0, 2)], Mood::Fear);

        assert!(find_floating(&grid).is_empty());

        grid.remove(GridCoord::new(0, 0));
        let floating = find_floating(&grid);

        assert_eq!(floating.len(), 2);
        assert!(floating.contains(&GridCoord::new(0, 1)));
        assert!(floating.contains(&GridCoord::new(0, 2)));
    }

    #[test]
    fn test_sweep_leaves_no_stranded_bubbles_behind() {
        let mut grid = BubbleGrid::default();
        seed(&mut grid, &[(0, 0), (0, 1)], Mood::Happy);
        seed(&mut grid, &[(5, 5), (5, 6)], Mood::Surprise);

        for cell in find_floating(&grid) {
            grid.remove(cell);
        }

        assert!(find_floating(&grid).is_empty());
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn test_sweep_from_an_earlier_session_is_stale() {
        let sweep = FloatSweep {
            timer: Timer::from_seconds(FLOAT_SWEEP_DELAY, TimerMode::Once),
            session: 1,
        };

        assert!(!sweep.is_stale(1));
        assert!(sweep.is_stale(2));
    }
}
