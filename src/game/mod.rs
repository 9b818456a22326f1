//! The main game module for the bubble board.
//!
//! This module contains all the gameplay logic including:
//! - The staggered lattice and its world mapping
//! - Bubble entities and the mood palette
//! - Launcher mechanics and decoupled aim input
//! - Projectile flight and settling
//! - Match detection, floating sweeps and scoring
//! - Session outcome and the calm readout

mod board;
mod bubble;
mod debug;
mod effects;
mod hud;
mod input;
mod lattice;
mod launcher;
mod matching;
mod projectile;
pub mod session;
pub mod stress;

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        board::plugin,
        bubble::plugin,
        input::plugin,
        launcher::plugin,
        projectile::plugin,
        matching::plugin,
        session::plugin,
        stress::plugin,
        hud::plugin,
        effects::plugin,
        debug::plugin,
    ));
}
