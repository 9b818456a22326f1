//! Debug visualization for the bubble lattice.
//!
//! Toggle with the 'D' key during gameplay.
//! Shows:
//! - Cell outlines for all valid positions
//! - Occupied cells tinted with their mood
//! - Markers where bubble entities actually sit, to expose drift
//!   between the board resource and the spawned transforms

use bevy::{color::palettes::css, input::common_conditions::input_just_pressed, prelude::*};

use super::{
    board::BubbleGrid,
    bubble::Bubble,
    lattice::{BUBBLE_RADIUS, DANGER_LINE_Y, LEFT_WALL, RIGHT_WALL, TOP_WALL},
    launcher::LAUNCH_Y,
};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<DebugGridVisible>();

    // Toggle debug with 'D' key
    app.add_systems(
        Update,
        toggle_debug.run_if(in_state(Screen::Gameplay).and(input_just_pressed(KeyCode::KeyD))),
    );

    // Draw the lattice overlay when visible
    app.add_systems(
        Update,
        draw_lattice_overlay.run_if(in_state(Screen::Gameplay).and(debug_visible)),
    );

    // Always draw walls during gameplay
    app.add_systems(Update, draw_walls.run_if(in_state(Screen::Gameplay)));
}

/// Resource to track if debug visualization is visible.
#[derive(Resource, Default)]
pub struct DebugGridVisible(pub bool);

fn debug_visible(debug: Res<DebugGridVisible>) -> bool {
    debug.0
}

fn toggle_debug(mut debug: ResMut<DebugGridVisible>) {
    debug.0 = !debug.0;
    let state = if debug.0 { "ON" } else { "OFF" };
    info!("Debug lattice: {}", state);
}

/// Draw the lattice overlay using Bevy's Gizmos.
fn draw_lattice_overlay(
    mut gizmos: Gizmos,
    grid: Res<BubbleGrid>,
    bubble_query: Query<(&Transform, &Bubble)>,
) {
    for cell in grid.bounds.all_cells() {
        let center = cell.to_world();

        let color: Color = if let Some(mood) = grid.mood_at(cell) {
            mood.color().with_alpha(0.5)
        } else if cell.row == 0 {
            // Ceiling row anchors connectivity
            css::GOLD.with_alpha(0.3).into()
        } else if center.y < DANGER_LINE_Y {
            // Cells past the overrun line
            css::INDIAN_RED.with_alpha(0.3).into()
        } else {
            css::WHITE.with_alpha(0.15).into()
        };

        gizmos.circle_2d(Isometry2d::from_translation(center), BUBBLE_RADIUS, color);
    }

    // Small dots where the entities actually are
    for (transform, bubble) in &bubble_query {
        gizmos.circle_2d(
            Isometry2d::from_translation(transform.translation.truncate()),
            3.0,
            bubble.mood.color(),
        );
    }
}

/// Draw the walls and play area boundaries (always visible during gameplay).
fn draw_walls(mut gizmos: Gizmos) {
    let wall_color = css::ORANGE.with_alpha(0.8);
    let danger_color = css::RED.with_alpha(0.6);

    // Left wall
    gizmos.line_2d(
        Vec2::new(LEFT_WALL, LAUNCH_Y - 50.0),
        Vec2::new(LEFT_WALL, TOP_WALL + 50.0),
        wall_color,
    );

    // Right wall
    gizmos.line_2d(
        Vec2::new(RIGHT_WALL, LAUNCH_Y - 50.0),
        Vec2::new(RIGHT_WALL, TOP_WALL + 50.0),
        wall_color,
    );

    // Top wall
    gizmos.line_2d(
        Vec2::new(LEFT_WALL, TOP_WALL),
        Vec2::new(RIGHT_WALL, TOP_WALL),
        wall_color,
    );

    // Overrun line (game over zone)
    gizmos.line_2d(
        Vec2::new(LEFT_WALL, DANGER_LINE_Y),
        Vec2::new(RIGHT_WALL, DANGER_LINE_Y),
        danger_color,
    );
}
