//! The bubble in flight.
//!
//! A released bubble travels in a straight line, bouncing off the
//! side walls, until it reaches the ceiling or touches a settled
//! bubble. Then it snaps into the nearest free lattice cell.

use bevy::prelude::*;

use super::{
    board::BubbleGrid,
    bubble::{Mood, spawn_bubble},
    lattice::{BUBBLE_RADIUS, GridCoord, LEFT_WALL, RIGHT_WALL, TOP_WALL},
    launcher::LAUNCH_Y,
};
use crate::{PausableSystems, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Projectile>();
    app.add_message::<FireProjectile>();
    app.add_message::<BubbleSettled>();

    app.add_systems(
        Update,
        (spawn_on_fire, advance_and_bounce, settle_contacts)
            .chain()
            .in_set(PausableSystems)
            .in_set(ProjectileSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// System set for projectile systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectileSystems;

/// Message to release a bubble from the launcher.
#[derive(Message, Debug, Clone)]
pub struct FireProjectile {
    pub position: Vec2,
    pub direction: Vec2,
    pub mood: Mood,
}

/// Message sent when a bubble snaps into the lattice.
/// Used to trigger match detection.
#[derive(Message, Debug, Clone)]
pub struct BubbleSettled {
    pub cell: GridCoord,
    pub mood: Mood,
}

/// Component marking an entity as a bubble in flight.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Projectile {
    /// Current velocity (direction * speed)
    pub velocity: Vec2,
    /// The mood being carried
    pub mood: Mood,
}

/// Speed of a released bubble in pixels per second.
const PROJECTILE_SPEED: f32 = 600.0;

/// Spawn a projectile when the fire message is received.
fn spawn_on_fire(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut fire_events: MessageReader<FireProjectile>,
) {
    for event in fire_events.read() {
        let velocity = event.direction.normalize() * PROJECTILE_SPEED;

        commands.spawn((
            Name::new("Projectile"),
            Projectile {
                velocity,
                mood: event.mood,
            },
            Transform::from_translation(event.position.extend(5.0)),
            Mesh2d(meshes.add(Circle::new(BUBBLE_RADIUS))),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(event.mood.color()))),
            DespawnOnExit(Screen::Gameplay),
        ));

        info!(
            "Spawned projectile at {:?} with velocity {:?}",
            event.position, velocity
        );
    }
}

/// Advance the projectile and bounce it off the side walls.
fn advance_and_bounce(time: Res<Time>, mut query: Query<(&mut Transform, &mut Projectile)>) {
    for (mut transform, mut projectile) in &mut query {
        let mut position =
            transform.translation.truncate() + projectile.velocity * time.delta_secs();
        reflect_walls(&mut position, &mut projectile.velocity);
        transform.translation.x = position.x;
        transform.translation.y = position.y;
    }
}

/// Reflect a position off the side walls, keeping the center inside them.
///
/// Only the sign of the horizontal velocity changes, never its magnitude.
fn reflect_walls(position: &mut Vec2, velocity: &mut Vec2) {
    if position.x - BUBBLE_RADIUS < LEFT_WALL {
        position.x = LEFT_WALL + BUBBLE_RADIUS;
        velocity.x = velocity.x.abs();
    }
    if position.x + BUBBLE_RADIUS > RIGHT_WALL {
        position.x = RIGHT_WALL - BUBBLE_RADIUS;
        velocity.x = -velocity.x.abs();
    }
}

/// Settle a projectile that reached the ceiling or touched a settled bubble.
fn settle_contacts(
    mut commands: Commands,
    mut grid: ResMut<BubbleGrid>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    query: Query<(Entity, &Transform, &Projectile)>,
    mut settled_events: MessageWriter<BubbleSettled>,
) {
    for (entity, transform, projectile) in &query {
        let pos = transform.translation.truncate();

        let at_ceiling = pos.y + BUBBLE_RADIUS > TOP_WALL;
        if !at_ceiling && !grid.touches(pos) {
            // Failsafe for anything that slipped past the launcher
            if pos.y < LAUNCH_Y - 50.0 {
                warn!("Projectile fell below the launcher, despawning");
                commands.entity(entity).despawn();
            }
            continue;
        }

        commands.entity(entity).despawn();

        let Some(cell) = grid.closest_free_cell(pos) else {
            warn!("No free cell left for a bubble settling at {:?}", pos);
            continue;
        };

        let new_entity = spawn_bubble(
            &mut commands,
            &mut meshes,
            &mut materials,
            cell,
            projectile.mood,
        );
        grid.place(cell, projectile.mood, new_entity);
        settled_events.write(BubbleSettled {
            cell,
            mood: projectile.mood,
        });
        info!("Bubble settled at {} as {:?}", cell, projectile.mood);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_wall_bounce_flips_velocity_right() {
        let mut position = Vec2::new(LEFT_WALL + BUBBLE_RADIUS - 5.0, 0.0);
        let mut velocity = Vec2::new(-300.0, 400.0);
        let speed = velocity.length();

        reflect_walls(&mut position, &mut velocity);

        assert_eq!(position.x, LEFT_WALL + BUBBLE_RADIUS);
        assert!(velocity.x > 0.0);
        assert_eq!(velocity.y, 400.0);
        assert!((velocity.length() - speed).abs() < 1e-3);
    }

    #[test]
    fn test_right_wall_bounce_flips_velocity_left() {
        let mut position = Vec2::new(RIGHT_WALL - BUBBLE_RADIUS + 5.0, 100.0);
        let mut velocity = Vec2::new(300.0, 400.0);
        let speed = velocity.length();

        reflect_walls(&mut position, &mut velocity);

        assert_eq!(position.x, RIGHT_WALL - BUBBLE_RADIUS);
        assert!(velocity.x < 0.0);
        assert!((velocity.length() - speed).abs() < 1e-3);
    }

    #[test]
    fn test_open_field_travel_is_untouched() {
        let mut position = Vec2::new(12.0, -40.0);
        let mut velocity = Vec2::new(150.0, 550.0);

        reflect_walls(&mut position, &mut velocity);

        assert_eq!(position, Vec2::new(12.0, -40.0));
        assert_eq!(velocity, Vec2::new(150.0, 550.0));
    }
}
