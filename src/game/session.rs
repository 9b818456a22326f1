//! Session state - score, outcome, win/lose conditions.
//!
//! Win: clear every bubble from the board.
//! Lose: a settled bubble comes to rest past the overrun line.

use bevy::prelude::*;

use super::{
    board::BubbleGrid,
    matching::{FloatingCleared, MatchPopped, MatchSystems},
    projectile::BubbleSettled,
};
use crate::{PausableSystems, menus::Menu, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<GameSession>();
    app.init_resource::<SessionScore>();
    app.init_resource::<GameOutcome>();
    app.register_type::<SessionScore>();
    app.add_message::<BoardOverrun>();

    app.add_systems(OnEnter(Screen::Gameplay), begin_session);

    // The overrun check reads the board after matches resolve, so a
    // pop triggered by the same bubble can still save the round.
    app.add_systems(
        Update,
        (update_score, check_overrun, end_on_overrun, check_cleared)
            .chain()
            .after(MatchSystems)
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// Points awarded per bubble in a popped run.
const MATCH_POINTS_PER_BUBBLE: u32 = 10;

/// Points awarded per floating bubble released.
const FLOATING_POINTS_PER_BUBBLE: u32 = 5;

/// Message sent when a settled bubble rests past the overrun line.
#[derive(Message, Debug, Clone)]
pub struct BoardOverrun;

/// Resource identifying the current round.
#[derive(Resource, Debug, Default)]
pub struct GameSession {
    /// Bumped once per round. Deferred work stamped with an older
    /// generation is ignored.
    pub generation: u64,
}

impl GameSession {
    pub fn begin(&mut self) {
        self.generation += 1;
    }
}

/// Resource tracking the current round's score.
#[derive(Resource, Debug, Default, Reflect)]
#[reflect(Resource)]
pub struct SessionScore {
    pub score: u32,
    pub bubbles_cleared: u32,
    pub matches_popped: u32,
}

impl SessionScore {
    pub fn reset(&mut self) {
        self.score = 0;
        self.bubbles_cleared = 0;
        self.matches_popped = 0;
    }
}

/// How the current round stands.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameOutcome {
    #[default]
    InProgress,
    Cleared,
    Overrun,
}

fn match_points(count: usize) -> u32 {
    count as u32 * MATCH_POINTS_PER_BUBBLE
}

fn floating_points(count: usize) -> u32 {
    count as u32 * FLOATING_POINTS_PER_BUBBLE
}

/// Start a fresh round when entering gameplay.
fn begin_session(
    mut session: ResMut<GameSession>,
    mut score: ResMut<SessionScore>,
    mut outcome: ResMut<GameOutcome>,
) {
    session.begin();
    score.reset();
    *outcome = GameOutcome::InProgress;
    info!("Session {} started", session.generation);
}

/// Update the score when runs pop or floaters are released.
fn update_score(
    mut score: ResMut<SessionScore>,
    mut popped_events: MessageReader<MatchPopped>,
    mut floating_events: MessageReader<FloatingCleared>,
) {
    for event in popped_events.read() {
        let points = match_points(event.count);
        score.score += points;
        score.bubbles_cleared += event.count as u32;
        score.matches_popped += 1;

        info!(
            "Run popped: {} bubbles, +{} points (total: {})",
            event.count, points, score.score
        );
    }

    for event in floating_events.read() {
        let points = floating_points(event.count);
        score.score += points;
        score.bubbles_cleared += event.count as u32;

        info!(
            "Floaters released: {}, +{} points (total: {})",
            event.count, points, score.score
        );
    }
}

/// After a bubble settles, check whether the board now runs too low.
fn check_overrun(
    grid: Res<BubbleGrid>,
    mut settled_events: MessageReader<BubbleSettled>,
    mut overrun_events: MessageWriter<BoardOverrun>,
) {
    if settled_events.read().count() == 0 {
        return;
    }

    if grid.overrun() {
        overrun_events.write(BoardOverrun);
    }
}

/// End the round when the board overruns.
fn end_on_overrun(
    mut overrun_events: MessageReader<BoardOverrun>,
    mut outcome: ResMut<GameOutcome>,
    score: Res<SessionScore>,
    mut next_menu: ResMut<NextState<Menu>>,
) {
    for _ in overrun_events.read() {
        if *outcome != GameOutcome::InProgress {
            continue;
        }

        info!(
            "Game over, the board reached the overrun line. Final score: {}",
            score.score
        );
        *outcome = GameOutcome::Overrun;
        next_menu.set(Menu::GameOver);
    }
}

/// End the round when the last bubble leaves the board.
fn check_cleared(
    grid: Res<BubbleGrid>,
    score: Res<SessionScore>,
    mut outcome: ResMut<GameOutcome>,
    mut next_menu: ResMut<NextState<Menu>>,
) {
    // At least one pop must have happened, so a board that merely
    // starts sparse doesn't count as a win.
    if *outcome != GameOutcome::InProgress {
        return;
    }
    if score.matches_popped == 0 || !grid.is_empty() {
        return;
    }

    info!("All clear! Final score: {}", score.score);
    *outcome = GameOutcome::Cleared;
    next_menu.set(Menu::GameOver);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_for_a_popped_run() {
        assert_eq!(match_points(3), 30);
        assert_eq!(match_points(7), 70);
    }

    #[test]
    fn test_points_for_released_floaters() {
        assert_eq!(floating_points(2), 10);
        assert_eq!(floating_points(5), 25);
    }

    #[test]
    fn test_each_round_gets_a_fresh_generation() {
        let mut session = GameSession::default();
        session.begin();
        let first = session.generation;
        session.begin();
        assert_eq!(session.generation, first + 1);
    }
}
