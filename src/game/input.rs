//! Player intent, decoupled from the windowing layer.
//!
//! Gameplay systems only ever consume [`AimInput`] messages. Pointer, mouse
//! and keyboard handling all live here.

use bevy::{prelude::*, window::PrimaryWindow};

use crate::{AppSystems, PausableSystems, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.add_message::<AimInput>();

    app.add_systems(
        Update,
        collect_aim_input
            .in_set(AppSystems::RecordInput)
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// One player intent. `Point` carries the aim target in world coordinates.
#[derive(Message, Debug, Clone, Copy)]
pub enum AimInput {
    Point { world: Vec2 },
    Fire,
}

fn collect_aim_input(
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_q: Query<(&Camera, &GlobalTransform)>,
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut input: MessageWriter<AimInput>,
) {
    if mouse.just_pressed(MouseButton::Left) || keyboard.just_pressed(KeyCode::Space) {
        input.write(AimInput::Fire);
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_q.single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };
    let Ok(world) = camera.viewport_to_world_2d(camera_transform, cursor_pos) else {
        return;
    };

    input.write(AimInput::Point { world });
}
