//! Rondo - a circular arena ball simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics variants, collisions, script events)
//! - `history`: Frame-keyed snapshot ring buffer for backward/forward stepping
//! - `settings`: Engine selection and per-variant tuning

pub mod history;
pub mod settings;
pub mod sim;

pub use history::{History, HistoryStats, Snapshot};
pub use settings::{ArcadeTuning, EngineKind, RealisticTuning, Settings, SettingsError};
pub use sim::{
    Arena, Ball, BallHandle, EventHandlers, ScriptError, SimState, SpawnOptions, Stepper,
};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Cap on a single wall-clock advance fed to the accumulator
    /// (prevents a stalled caller from triggering a tick avalanche)
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Arena defaults
    pub const ARENA_RADIUS: f32 = 400.0;
    /// Default escape gap width (radians, ~20 degrees)
    pub const GAP_WIDTH: f32 = 0.35;

    /// Ball defaults
    pub const BALL_MIN_RADIUS: f32 = 1.0;
    pub const BALL_SPAWN_RADIUS_MIN: f32 = 8.0;
    pub const BALL_SPAWN_RADIUS_MAX: f32 = 20.0;

    /// Snapshot history capacity (frames)
    pub const HISTORY_CAPACITY: usize = 5000;

    /// Pair separation below this is treated as "no collision this tick"
    pub const DISTANCE_EPS: f32 = 1e-6;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
