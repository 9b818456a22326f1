//! Bubble entities and the mood palette they carry.
//!
//! Every bubble holds one of six moods. Popping connected moods is the whole
//! game, so the palette doubles as the input to the calm scoring.

use bevy::prelude::*;
use rand::Rng;

use super::board::{BubbleGrid, GridBounds};
use super::lattice::{BUBBLE_RADIUS, GridCoord};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Bubble>();
    app.register_type::<Mood>();

    // Fill the board when entering gameplay.
    app.add_systems(OnEnter(Screen::Gameplay), spawn_initial_bubbles);

    // Cleanup bubbles when leaving gameplay.
    app.add_systems(OnExit(Screen::Gameplay), cleanup_bubbles);
}

/// The six moods a bubble can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub enum Mood {
    Angry,
    Fear,
    Sad,
    Disgust,
    Surprise,
    #[default]
    Happy,
}

impl Mood {
    /// Render color for this mood. Soft tones on purpose.
    pub fn color(self) -> Color {
        match self {
            Mood::Angry => Color::srgb(0.91, 0.36, 0.33),
            Mood::Fear => Color::srgb(0.65, 0.44, 0.86),
            Mood::Sad => Color::srgb(0.36, 0.54, 0.89),
            Mood::Disgust => Color::srgb(0.42, 0.76, 0.47),
            Mood::Surprise => Color::srgb(0.95, 0.78, 0.34),
            Mood::Happy => Color::srgb(0.97, 0.62, 0.72),
        }
    }

    /// How much this mood contributes to board stress. Same weighting the
    /// wellness app uses for its overall stress score.
    pub fn stress_weight(self) -> f32 {
        match self {
            Mood::Angry => 0.9,
            Mood::Fear => 0.85,
            Mood::Sad => 0.75,
            Mood::Disgust => 0.7,
            Mood::Surprise => 0.4,
            Mood::Happy => 0.0,
        }
    }

    /// A uniformly random mood.
    pub fn random() -> Self {
        let mut rng = rand::rng();
        match rng.random_range(0..6) {
            0 => Mood::Angry,
            1 => Mood::Fear,
            2 => Mood::Sad,
            3 => Mood::Disgust,
            4 => Mood::Surprise,
            _ => Mood::Happy,
        }
    }

    pub const ALL: [Mood; 6] = [
        Mood::Angry,
        Mood::Fear,
        Mood::Sad,
        Mood::Disgust,
        Mood::Surprise,
        Mood::Happy,
    ];
}

/// A settled bubble on the board.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Bubble {
    pub mood: Mood,
}

/// Number of rows filled at the start of a round.
pub const INITIAL_ROWS: i32 = 5;

/// Cells filled at the start of a round: the top rows at full capacity.
fn initial_cells(bounds: GridBounds) -> impl Iterator<Item = GridCoord> {
    (0..INITIAL_ROWS).flat_map(move |row| bounds.row_cells(row))
}

fn spawn_initial_bubbles(
    mut commands: Commands,
    mut grid: ResMut<BubbleGrid>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let bounds = grid.bounds;
    let mut count = 0;

    for cell in initial_cells(bounds) {
        let mood = Mood::random();
        let entity = spawn_bubble(&mut commands, &mut meshes, &mut materials, cell, mood);
        grid.place(cell, mood, entity);
        count += 1;
    }

    info!("Spawned {count} initial bubbles");
}

/// Spawn a single settled bubble at the given cell.
pub fn spawn_bubble(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
    cell: GridCoord,
    mood: Mood,
) -> Entity {
    let world_pos = cell.to_world();

    commands
        .spawn((
            Name::new(format!("Bubble {:?} at {}", mood, cell)),
            Bubble { mood },
            cell,
            Transform::from_translation(world_pos.extend(0.0)),
            Mesh2d(meshes.add(Circle::new(BUBBLE_RADIUS))),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(mood.color()))),
            // Mark for cleanup when leaving gameplay.
            DespawnOnExit(Screen::Gameplay),
        ))
        .id()
}

/// Drop all board state when leaving gameplay. The entities themselves are
/// state-scoped and despawn on their own.
fn cleanup_bubbles(mut grid: ResMut<BubbleGrid>) {
    grid.clear();
    info!("Cleared bubble board");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_board_fills_five_full_rows() {
        let bounds = GridBounds::default();
        let cells: Vec<_> = initial_cells(bounds).collect();

        assert_eq!(cells.len(), 12 + 11 + 12 + 11 + 12);
        assert!(cells.iter().all(|c| c.row < INITIAL_ROWS));
        for row in 0..INITIAL_ROWS {
            let in_row = cells.iter().filter(|c| c.row == row).count() as i32;
            assert_eq!(in_row, bounds.max_col_in_row(row) + 1);
        }
    }

    #[test]
    fn test_every_mood_has_a_distinct_color() {
        for a in Mood::ALL {
            for b in Mood::ALL {
                if a != b {
                    assert_ne!(a.color(), b.color());
                }
            }
        }
    }
}
