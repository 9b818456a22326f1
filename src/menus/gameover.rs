//! The game over menu, shown for both endings.

use bevy::prelude::*;

use crate::{
    game::{
        session::{GameOutcome, SessionScore},
        stress::CalmTracker,
    },
    menus::Menu,
    screens::Screen,
    theme::widget,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Menu::GameOver), spawn_gameover_menu);
}

fn spawn_gameover_menu(
    mut commands: Commands,
    outcome: Res<GameOutcome>,
    score: Res<SessionScore>,
    calm: Res<CalmTracker>,
) {
    let heading = match *outcome {
        GameOutcome::Cleared => "All Clear",
        _ => "Game Over",
    };

    commands.spawn((
        widget::ui_root("Game Over Menu"),
        GlobalZIndex(2),
        DespawnOnExit(Menu::GameOver),
        children![
            widget::header(heading),
            widget::label(format!("Score: {}", score.score)),
            widget::label(format!("Bubbles released: {}", score.bubbles_cleared)),
            widget::label(calm.summary()),
            widget::button("Quit to title", quit_to_title),
        ],
    ));
}

fn quit_to_title(_: On<Pointer<Click>>, mut next_screen: ResMut<NextState<Screen>>) {
    next_screen.set(Screen::Title);
}
