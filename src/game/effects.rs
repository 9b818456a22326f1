//! Presentation effects - screen shake, pop animations, encouragement text.

use bevy::prelude::*;
use rand::Rng;

use super::{
    matching::{FloatingCleared, MatchPopped},
    session::BoardOverrun,
};
use crate::{PausableSystems, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    // Screen shake
    app.init_resource::<ScreenShake>();
    app.add_systems(
        Update,
        (trigger_shake_on_events, apply_screen_shake)
            .chain()
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );

    // Pop animation
    app.add_systems(
        Update,
        animate_pop
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );

    // Encouragement text
    app.add_systems(
        Update,
        (spawn_encouragement_text, animate_encouragement_text)
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

// =============================================================================
// SCREEN SHAKE
// =============================================================================

/// Resource tracking screen shake state.
#[derive(Resource, Default)]
pub struct ScreenShake {
    /// Current trauma level (0.0 to 1.0).
    pub trauma: f32,
    /// Base position to return to.
    pub base_position: Vec3,
}

/// Maximum shake offset in pixels.
const MAX_SHAKE_OFFSET: f32 = 10.0;
/// How fast trauma decays per second.
const TRAUMA_DECAY: f32 = 2.5;

/// Trigger screen shake from game events.
fn trigger_shake_on_events(
    mut shake: ResMut<ScreenShake>,
    mut popped_events: MessageReader<MatchPopped>,
    mut overrun_events: MessageReader<BoardOverrun>,
    mut floating_events: MessageReader<FloatingCleared>,
) {
    // Popped run - shake scales with size
    for event in popped_events.read() {
        let intensity = match event.count {
            0..=3 => 0.4,
            4..=5 => 0.55,
            6..=7 => 0.7,
            _ => 0.85,
        };
        shake.trauma = (shake.trauma + intensity).min(1.0);
    }

    // Overrun - strong shake
    for _ in overrun_events.read() {
        shake.trauma = 1.0;
    }

    // Floaters released - medium shake
    for event in floating_events.read() {
        let intensity = (event.count as f32 * 0.15).min(0.6);
        shake.trauma = (shake.trauma + intensity).min(1.0);
    }
}

/// Apply screen shake to the camera.
fn apply_screen_shake(
    time: Res<Time>,
    mut shake: ResMut<ScreenShake>,
    mut camera_query: Query<&mut Transform, With<Camera2d>>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    if shake.trauma > 0.0 {
        let mut rng = rand::rng();

        // Shake amount = trauma^2 (makes it feel more natural)
        let shake_amount = shake.trauma * shake.trauma;

        let offset_x = rng.random_range(-1.0..1.0) * MAX_SHAKE_OFFSET * shake_amount;
        let offset_y = rng.random_range(-1.0..1.0) * MAX_SHAKE_OFFSET * shake_amount;

        camera_transform.translation.x = shake.base_position.x + offset_x;
        camera_transform.translation.y = shake.base_position.y + offset_y;

        shake.trauma = (shake.trauma - TRAUMA_DECAY * time.delta_secs()).max(0.0);
    } else {
        camera_transform.translation.x = shake.base_position.x;
        camera_transform.translation.y = shake.base_position.y;
    }
}

// =============================================================================
// POP ANIMATION
// =============================================================================

/// Component for bubbles that are popping (scale up, shrink, despawn).
#[derive(Component)]
pub struct PopAnimation {
    /// Time elapsed in the animation.
    pub timer: f32,
    /// Total animation duration.
    pub duration: f32,
    /// Starting scale.
    pub start_scale: Vec3,
    /// Target scale at peak.
    pub peak_scale: Vec3,
}

impl PopAnimation {
    pub fn new(current_scale: Vec3) -> Self {
        Self {
            timer: 0.0,
            duration: 0.15,
            start_scale: current_scale,
            peak_scale: current_scale * 1.4,
        }
    }
}

impl Default for PopAnimation {
    fn default() -> Self {
        Self::new(Vec3::ONE)
    }
}

/// Animate popping bubbles and despawn when done.
fn animate_pop(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut PopAnimation)>,
) {
    for (entity, mut transform, mut pop) in &mut query {
        pop.timer += time.delta_secs();
        let progress = (pop.timer / pop.duration).min(1.0);

        // Swell to the peak, then shrink to nothing
        let scale = if progress < 0.5 {
            let t = progress * 2.0;
            pop.start_scale.lerp(pop.peak_scale, t)
        } else {
            let t = (progress - 0.5) * 2.0;
            pop.peak_scale.lerp(Vec3::ZERO, t)
        };

        transform.scale = scale;

        if progress >= 1.0 {
            commands.entity(entity).despawn();
        }
    }
}

// =============================================================================
// ENCOURAGEMENT TEXT
// =============================================================================

/// Component for floating encouragement text.
#[derive(Component)]
pub struct EncouragementText {
    /// Time elapsed.
    pub timer: f32,
    /// Total duration.
    pub duration: f32,
    /// Starting position.
    pub start_y: f32,
    /// Float distance.
    pub float_distance: f32,
}

/// Soft gold used for the floating text.
const ENCOURAGEMENT_COLOR: Color = Color::srgb(0.95, 0.85, 0.45);

/// Spawn encouragement text over larger popped runs.
fn spawn_encouragement_text(
    mut commands: Commands,
    mut popped_events: MessageReader<MatchPopped>,
) {
    for event in popped_events.read() {
        // A plain match-3 passes quietly
        if event.count <= 3 {
            continue;
        }

        let center_pos = if event.cells.is_empty() {
            Vec2::ZERO
        } else {
            let sum: Vec2 = event
                .cells
                .iter()
                .map(|cell| cell.to_world())
                .fold(Vec2::ZERO, |acc, pos| acc + pos);
            sum / event.cells.len() as f32
        };

        let text = if event.count >= 8 {
            format!("Total serenity! +{}", event.count)
        } else if event.count >= 6 {
            format!("Breathe out... +{}", event.count)
        } else {
            format!("+{}", event.count)
        };

        commands.spawn((
            Name::new("Encouragement Text"),
            EncouragementText {
                timer: 0.0,
                duration: 0.8,
                start_y: center_pos.y,
                float_distance: 50.0,
            },
            Text2d::new(text),
            TextFont {
                font_size: 32.0,
                ..default()
            },
            TextColor(ENCOURAGEMENT_COLOR),
            Transform::from_translation(center_pos.extend(10.0)).with_scale(Vec3::splat(0.5)),
            DespawnOnExit(Screen::Gameplay),
        ));
    }
}

/// Animate encouragement text (float up and fade out).
fn animate_encouragement_text(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut EncouragementText, &mut TextColor)>,
) {
    for (entity, mut transform, mut float, mut color) in &mut query {
        float.timer += time.delta_secs();
        let progress = (float.timer / float.duration).min(1.0);

        // Grow in at the start, then hold
        let scale = if progress < 0.2 {
            let t = progress / 0.2;
            0.5 + t * 1.0
        } else {
            1.5
        };
        transform.scale = Vec3::splat(scale);

        // Drift upward
        transform.translation.y = float.start_y + float.float_distance * progress;

        // Fade out in the last 30%
        let alpha = if progress > 0.7 {
            1.0 - (progress - 0.7) / 0.3
        } else {
            1.0
        };
        color.0 = ENCOURAGEMENT_COLOR.with_alpha(alpha);

        if progress >= 1.0 {
            commands.entity(entity).despawn();
        }
    }
}
