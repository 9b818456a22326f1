//! The launcher at the bottom of the screen.
//!
//! The player aims with the pointer and releases bubbles upward.
//! The launcher always has a loaded bubble ready to go and shows
//! a preview of the next one.

use bevy::prelude::*;

use super::{
    bubble::Mood,
    input::AimInput,
    lattice::BUBBLE_RADIUS,
    projectile::{FireProjectile, Projectile},
};
use crate::{PausableSystems, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Launcher>();
    app.register_type::<LauncherState>();
    app.register_type::<AimDirection>();
    app.register_type::<NextBubble>();

    app.add_systems(OnEnter(Screen::Gameplay), spawn_launcher);

    app.add_systems(
        Update,
        (apply_aim, draw_aim_line, handle_fire, reload_launcher)
            .chain()
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// The Y position of the launcher (bottom of the play area).
pub const LAUNCH_Y: f32 = -250.0;

/// Maximum angle from vertical (in radians) - prevents shooting too horizontally.
const MAX_AIM_ANGLE: f32 = 1.3; // About 75 degrees

/// Length of the aim guide line in pixels.
const AIM_LINE_LENGTH: f32 = 150.0;

/// Marker component for the launcher entity.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Launcher;

/// The current state of the launcher.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect, Default)]
#[reflect(Component)]
pub enum LauncherState {
    /// Ready to fire
    #[default]
    Ready,
    /// Waiting for the projectile to land before reloading
    Reloading,
}

/// The current aim direction (normalized vector pointing from the launcher).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AimDirection(pub Vec2);

impl Default for AimDirection {
    fn default() -> Self {
        Self(Vec2::Y) // Start aiming straight up
    }
}

/// The currently loaded mood.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct LoadedBubble(pub Mood);

/// The next mood (preview).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct NextBubble(pub Mood);

/// Marker for the loaded bubble visual entity.
#[derive(Component)]
struct LoadedBubbleVisual;

/// Marker for the next bubble visual entity.
#[derive(Component)]
struct NextBubbleVisual;

/// Spawn the launcher at the bottom of the screen.
fn spawn_launcher(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    info!("Spawning launcher at y={}", LAUNCH_Y);

    let loaded_mood = Mood::random();
    let next_mood = Mood::random();

    let launcher_entity = commands
        .spawn((
            Name::new("Launcher"),
            Launcher,
            LauncherState::Ready,
            AimDirection::default(),
            LoadedBubble(loaded_mood),
            NextBubble(next_mood),
            Transform::from_xyz(0.0, LAUNCH_Y, 1.0),
            Visibility::default(),
            DespawnOnExit(Screen::Gameplay),
        ))
        .id();

    // Base/platform visual
    let base = commands
        .spawn((
            Name::new("Launcher Base"),
            Sprite {
                color: Color::srgb(0.22, 0.26, 0.33),
                custom_size: Some(Vec2::new(BUBBLE_RADIUS * 3.0, BUBBLE_RADIUS * 0.5)),
                ..default()
            },
            Transform::from_xyz(0.0, -BUBBLE_RADIUS * 1.2, -0.1),
        ))
        .id();
    commands.entity(launcher_entity).add_child(base);

    spawn_mood_visual(
        &mut commands,
        &mut meshes,
        &mut materials,
        launcher_entity,
        loaded_mood,
        Vec3::ZERO,
        1.0,
        LoadedBubbleVisual,
    );

    spawn_mood_visual(
        &mut commands,
        &mut meshes,
        &mut materials,
        launcher_entity,
        next_mood,
        Vec3::new(BUBBLE_RADIUS * 3.0, 0.0, 0.0),
        0.6,
        NextBubbleVisual,
    );

    info!(
        "Launcher spawned with {:?} loaded, {:?} next",
        loaded_mood, next_mood
    );
}

/// Spawn a colored circle for a mood as a child of the given parent.
fn spawn_mood_visual<M: Component>(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
    parent: Entity,
    mood: Mood,
    position: Vec3,
    scale: f32,
    marker: M,
) {
    let child = commands
        .spawn((
            Name::new("Mood Visual"),
            marker,
            Transform::from_translation(position),
            Mesh2d(meshes.add(Circle::new(BUBBLE_RADIUS * scale))),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(mood.color()))),
        ))
        .id();
    commands.entity(parent).add_child(child);
}

/// Update the aim direction from pointer input.
///
/// Aim input is ignored while a bubble is in flight.
fn apply_aim(
    mut aim_inputs: MessageReader<AimInput>,
    mut launcher_query: Query<(&Transform, &LauncherState, &mut AimDirection), With<Launcher>>,
) {
    let Ok((transform, state, mut aim)) = launcher_query.single_mut() else {
        return;
    };

    let mut target = None;
    for input in aim_inputs.read() {
        if let AimInput::Point { world } = input {
            target = Some(*world);
        }
    }
    let Some(cursor_pos) = target else {
        return;
    };

    if *state != LauncherState::Ready {
        return;
    }

    // Calculate direction from launcher to cursor
    let launcher_pos = transform.translation.truncate();
    let mut direction = (cursor_pos - launcher_pos).normalize_or_zero();

    // Ensure we're aiming upward (not down)
    if direction.y < 0.1 {
        direction.y = 0.1;
        direction = direction.normalize();
    }

    // Clamp angle to prevent too-horizontal shots
    let angle = direction.x.atan2(direction.y);
    let clamped_angle = angle.clamp(-MAX_AIM_ANGLE, MAX_AIM_ANGLE);

    aim.0 = Vec2::new(clamped_angle.sin(), clamped_angle.cos());
}

/// Draw a dotted aim guide using gizmos.
fn draw_aim_line(
    mut gizmos: Gizmos,
    launcher_query: Query<(&Transform, &AimDirection, &LauncherState), With<Launcher>>,
) {
    let Ok((transform, aim, state)) = launcher_query.single() else {
        return;
    };

    // Don't draw the guide while reloading
    if *state == LauncherState::Reloading {
        return;
    }

    let start = transform.translation.truncate();
    let segments = 15;
    let segment_length = AIM_LINE_LENGTH / segments as f32;

    for i in 0..segments {
        if i % 2 == 0 {
            let seg_start = start + aim.0 * (i as f32 * segment_length);
            let seg_end = start + aim.0 * ((i as f32 + 0.7) * segment_length);
            gizmos.line_2d(seg_start, seg_end, Color::srgba(0.86, 0.90, 0.93, 0.35));
        }
    }
}

/// Handle fire input.
fn handle_fire(
    mut aim_inputs: MessageReader<AimInput>,
    mut launcher_query: Query<
        (&Transform, &AimDirection, &mut LauncherState, &LoadedBubble),
        With<Launcher>,
    >,
    projectile_query: Query<&Projectile>,
    mut fire_events: MessageWriter<FireProjectile>,
) {
    let fired = aim_inputs
        .read()
        .any(|input| matches!(input, AimInput::Fire));
    if !fired {
        return;
    }

    let Ok((transform, aim, mut state, loaded)) = launcher_query.single_mut() else {
        return;
    };

    // Can't fire if not ready or if there's already a bubble in flight
    if *state != LauncherState::Ready {
        return;
    }
    if !projectile_query.is_empty() {
        return;
    }

    fire_events.write(FireProjectile {
        position: transform.translation.truncate(),
        direction: aim.0,
        mood: loaded.0,
    });

    *state = LauncherState::Reloading;
    info!("Released a {:?} bubble toward {:?}", loaded.0, aim.0);
}

/// Reload the launcher after the projectile lands.
fn reload_launcher(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut launcher_query: Query<
        (Entity, &mut LauncherState, &mut LoadedBubble, &mut NextBubble),
        With<Launcher>,
    >,
    loaded_visual_query: Query<Entity, With<LoadedBubbleVisual>>,
    next_visual_query: Query<Entity, With<NextBubbleVisual>>,
    projectile_query: Query<&Projectile>,
    mut fire_events: MessageReader<FireProjectile>,
) {
    let Ok((launcher_entity, mut state, mut loaded, mut next)) = launcher_query.single_mut() else {
        return;
    };

    // A freshly fired bubble is spawned through commands, so the projectile
    // query can still be empty on the frames right after the shot. The
    // pending fire message covers that window.
    let fire_pending = fire_events.read().count() > 0;

    if *state != LauncherState::Reloading {
        return;
    }

    // Wait for the projectile to be gone
    if fire_pending || !projectile_query.is_empty() {
        return;
    }

    loaded.0 = next.0;
    next.0 = Mood::random();

    // Despawn old visuals and spawn replacements with the new moods
    if let Ok(entity) = loaded_visual_query.single() {
        commands.entity(entity).despawn();
    }
    spawn_mood_visual(
        &mut commands,
        &mut meshes,
        &mut materials,
        launcher_entity,
        loaded.0,
        Vec3::ZERO,
        1.0,
        LoadedBubbleVisual,
    );

    if let Ok(entity) = next_visual_query.single() {
        commands.entity(entity).despawn();
    }
    spawn_mood_visual(
        &mut commands,
        &mut meshes,
        &mut materials,
        launcher_entity,
        next.0,
        Vec3::new(BUBBLE_RADIUS * 3.0, 0.0, 0.0),
        0.6,
        NextBubbleVisual,
    );

    *state = LauncherState::Ready;
    info!("Reloaded with {:?}, next is {:?}", loaded.0, next.0);
}
