//! In-round HUD - the score and calm readout along the top edge.

use bevy::prelude::*;

use super::{session::SessionScore, stress::CalmTracker};
use crate::{screens::Screen, theme::palette::LABEL_TEXT};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Screen::Gameplay), spawn_hud);

    app.add_systems(
        Update,
        (
            update_score_label.run_if(resource_changed::<SessionScore>),
            update_calm_label.run_if(resource_changed::<CalmTracker>),
        )
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// Marker for the score text.
#[derive(Component)]
struct ScoreLabel;

/// Marker for the calm readout text.
#[derive(Component)]
struct CalmLabel;

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Name::new("HUD"),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(20.0),
            right: Val::Px(20.0),
            justify_content: JustifyContent::SpaceBetween,
            ..default()
        },
        Pickable::IGNORE,
        DespawnOnExit(Screen::Gameplay),
        children![
            (
                Name::new("Score Label"),
                ScoreLabel,
                Text::new("Score: 0"),
                TextFont::from_font_size(24.0),
                TextColor(LABEL_TEXT),
            ),
            (
                Name::new("Calm Label"),
                CalmLabel,
                Text::new("Calm 100% · steady"),
                TextFont::from_font_size(24.0),
                TextColor(LABEL_TEXT),
            ),
        ],
    ));
}

fn update_score_label(score: Res<SessionScore>, mut label: Single<&mut Text, With<ScoreLabel>>) {
    label.0 = format!("Score: {}", score.score);
}

fn update_calm_label(calm: Res<CalmTracker>, mut label: Single<&mut Text, With<CalmLabel>>) {
    label.0 = calm.summary();
}
