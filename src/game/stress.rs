//! Board mood tracking.
//!
//! Applies the wellness app's stress weighting to whatever moods are
//! left on the board, keeps a short history of readings, and turns
//! them into the calm readout shown on the HUD.

use bevy::prelude::*;
use std::collections::VecDeque;

use super::{
    board::BubbleGrid,
    bubble::Mood,
    matching::{FloatingCleared, MatchPopped, MatchSystems},
    projectile::BubbleSettled,
};
use crate::{PausableSystems, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CalmTracker>();

    app.add_systems(OnEnter(Screen::Gameplay), reset_tracker);

    app.add_systems(
        Update,
        track_board_mood
            .after(MatchSystems)
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// Number of stress readings kept.
const MAX_HISTORY: usize = 30;

/// Readings needed before a trend is reported.
const TREND_MIN_SAMPLES: usize = 10;

/// Minimum half-to-half difference that counts as a trend.
const TREND_EPSILON: f32 = 0.1;

/// Direction the board's stress is moving in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Falling,
    Steady,
}

/// Coarse band for a stress reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressLevel {
    High,
    Moderate,
    Low,
    Minimal,
}

/// Average stress weight of the given moods. An empty board reads 0.
pub fn board_stress(moods: impl IntoIterator<Item = Mood>) -> f32 {
    let mut total = 0.0;
    let mut count = 0u32;
    for mood in moods {
        total += mood.stress_weight();
        count += 1;
    }
    if count == 0 { 0.0 } else { total / count as f32 }
}

/// Band a stress reading the way the wellness app does.
pub fn level(score: f32) -> StressLevel {
    if score >= 0.7 {
        StressLevel::High
    } else if score >= 0.5 {
        StressLevel::Moderate
    } else if score >= 0.3 {
        StressLevel::Low
    } else {
        StressLevel::Minimal
    }
}

/// A rolling window of stress readings.
#[derive(Debug, Default)]
pub struct StressTracker {
    history: VecDeque<f32>,
}

impl StressTracker {
    pub fn record(&mut self, reading: f32) {
        if self.history.len() == MAX_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(reading);
    }

    pub fn latest(&self) -> Option<f32> {
        self.history.back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Compare the older half of the window against the newer half.
    pub fn trend(&self) -> Trend {
        if self.history.len() < TREND_MIN_SAMPLES {
            return Trend::Steady;
        }

        let mid = self.history.len() / 2;
        let older: f32 = self.history.iter().take(mid).sum::<f32>() / mid as f32;
        let newer: f32 =
            self.history.iter().skip(mid).sum::<f32>() / (self.history.len() - mid) as f32;

        let shift = newer - older;
        if shift > TREND_EPSILON {
            Trend::Rising
        } else if shift < -TREND_EPSILON {
            Trend::Falling
        } else {
            Trend::Steady
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

/// Resource holding the board's stress history, read out as calm.
#[derive(Resource, Debug, Default)]
pub struct CalmTracker {
    tracker: StressTracker,
}

impl CalmTracker {
    /// One-line readout for the HUD and the end-of-round screen.
    pub fn summary(&self) -> String {
        let calm = (1.0 - self.tracker.latest().unwrap_or(0.0)) * 100.0;
        let word = match self.tracker.trend() {
            Trend::Rising => "tensing",
            Trend::Falling => "easing",
            Trend::Steady => "steady",
        };
        format!("Calm {calm:.0}% · {word}")
    }
}

/// Drop the previous round's readings when a new one starts.
fn reset_tracker(mut calm: ResMut<CalmTracker>) {
    calm.tracker.clear();
}

/// Take a fresh stress reading whenever the board changes.
fn track_board_mood(
    grid: Res<BubbleGrid>,
    mut calm: ResMut<CalmTracker>,
    mut settled_events: MessageReader<BubbleSettled>,
    mut popped_events: MessageReader<MatchPopped>,
    mut floating_events: MessageReader<FloatingCleared>,
) {
    let settled = settled_events.read().count();
    let popped = popped_events.read().count();
    let floating = floating_events.read().count();
    let board_changed = settled + popped + floating > 0;

    // The opening board gets a baseline reading before the first shot
    let needs_baseline = calm.tracker.is_empty() && !grid.is_empty();

    if !board_changed && !needs_baseline {
        return;
    }

    let reading = board_stress(grid.moods());
    calm.tracker.record(reading);
    debug!("Board stress {:.2} ({:?})", reading, level(reading));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a_happy_board_reads_zero_stress() {
        let moods = [Mood::Happy, Mood::Happy, Mood::Happy];
        assert!(board_stress(moods).abs() < 1e-6);
    }

    #[test]
    fn test_an_angry_board_reads_high_stress() {
        let moods = [Mood::Angry, Mood::Angry];
        assert!((board_stress(moods) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_mixed_moods_average_their_weights() {
        let moods = [Mood::Angry, Mood::Happy];
        assert!((board_stress(moods) - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_empty_board_reads_calm() {
        assert!(board_stress([]).abs() < 1e-6);
    }

    #[test]
    fn test_trend_needs_enough_readings() {
        let mut tracker = StressTracker::default();
        for i in 0..9 {
            tracker.record(i as f32 * 0.1);
        }
        assert_eq!(tracker.trend(), Trend::Steady);

        tracker.record(0.9);
        assert_eq!(tracker.trend(), Trend::Rising);
    }

    #[test]
    fn test_dropping_readings_trend_falling() {
        let mut tracker = StressTracker::default();
        for _ in 0..5 {
            tracker.record(0.8);
        }
        for _ in 0..5 {
            tracker.record(0.2);
        }
        assert_eq!(tracker.trend(), Trend::Falling);
    }

    #[test]
    fn test_flat_readings_trend_steady() {
        let mut tracker = StressTracker::default();
        for _ in 0..10 {
            tracker.record(0.5);
        }
        assert_eq!(tracker.trend(), Trend::Steady);
    }

    #[test]
    fn test_history_is_capped() {
        let mut tracker = StressTracker::default();
        for i in 0..(MAX_HISTORY + 5) {
            tracker.record(i as f32);
        }
        assert_eq!(tracker.history.len(), MAX_HISTORY);
        assert_eq!(tracker.history.front().copied(), Some(5.0));
    }

    #[test]
    fn test_level_bands() {
        assert_eq!(level(0.75), StressLevel::High);
        assert_eq!(level(0.7), StressLevel::High);
        assert_eq!(level(0.69), StressLevel::Moderate);
        assert_eq!(level(0.5), StressLevel::Moderate);
        assert_eq!(level(0.3), StressLevel::Low);
        assert_eq!(level(0.29), StressLevel::Minimal);
    }

    #[test]
    fn test_summary_reads_out_calm_percent() {
        let mut calm = CalmTracker::default();
        calm.tracker.record(0.38);
        assert_eq!(calm.summary(), "Calm 62% · steady");
    }
}
