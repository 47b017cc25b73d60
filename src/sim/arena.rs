//! Arena geometry
//!
//! The arena is a circle with a single angular gap acting as an escape
//! opening. Immutable after construction; everything else in the simulation
//! positions itself relative to it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::SettingsError;
use crate::{consts, normalize_angle};

/// Circular boundary with one escape gap
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Arena {
    /// Center point in world coordinates
    pub center: Vec2,
    /// Boundary radius
    pub radius: f32,
    /// Direction of the gap's midpoint (radians, normalized to [-π, π))
    pub gap_angle: f32,
    /// Angular width of the gap (radians, < 2π)
    pub gap_width: f32,
}

impl Arena {
    pub fn new(
        center: Vec2,
        radius: f32,
        gap_angle: f32,
        gap_width: f32,
    ) -> Result<Self, SettingsError> {
        if !(radius > 0.0) {
            return Err(SettingsError::ArenaRadius(radius));
        }
        if !(0.0..std::f32::consts::TAU).contains(&gap_width) {
            return Err(SettingsError::GapWidth(gap_width));
        }
        Ok(Self {
            center,
            radius,
            gap_angle: normalize_angle(gap_angle),
            gap_width,
        })
    }

    /// Check if an angular position falls within the gap's half-width of the
    /// gap direction, using the shortest angular difference (handles the ±π
    /// wraparound).
    pub fn contains_gap_angle(&self, theta: f32) -> bool {
        if self.gap_width <= 0.0 {
            return false;
        }
        let delta = normalize_angle(theta - self.gap_angle);
        delta.abs() <= self.gap_width / 2.0
    }

    /// Distance from the arena center to a point
    #[inline]
    pub fn center_distance(&self, pos: Vec2) -> f32 {
        (pos - self.center).length()
    }

    /// True if a ball of the given radius pokes past the boundary
    #[inline]
    pub fn penetrates_wall(&self, pos: Vec2, ball_radius: f32) -> bool {
        self.center_distance(pos) + ball_radius > self.radius
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            radius: consts::ARENA_RADIUS,
            gap_angle: 0.0,
            gap_width: consts::GAP_WIDTH,
        }
    }
}
