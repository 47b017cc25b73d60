//! Engine selection and per-variant tuning
//!
//! Supplied by the host UI; validated once, then read-only during simulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors, rejected before a simulation is constructed
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("arena radius must be positive, got {0}")]
    ArenaRadius(f32),
    #[error("gap width must be in [0, 2π), got {0}")]
    GapWidth(f32),
    #[error("elasticity must be in (0, 1], got {0}")]
    Elasticity(f32),
    #[error("air resistance must be in (0, 1], got {0}")]
    AirResistance(f32),
    #[error("min reflect angle {min}° must be below max reflect angle {max}°")]
    ReflectAngles { min: f32, max: f32 },
    #[error("history capacity must be at least 1")]
    HistoryCapacity,
}

/// Physics engine variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EngineKind {
    /// Lossless bounces with angle-clamped reflections
    #[default]
    Arcade,
    /// Arcade wall physics, but no momentum transfer between balls
    ArcadeSimple,
    /// Gravity, air resistance and energy-lossy bounces
    Realistic,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Arcade => "arcade",
            EngineKind::ArcadeSimple => "arcadeSimple",
            EngineKind::Realistic => "realistic",
        }
    }

    /// Parse an engine name. Unrecognized names fall back to Arcade
    /// rather than failing, so a stale config never bricks a simulation.
    pub fn from_name(name: &str) -> Self {
        match name {
            "arcade" => EngineKind::Arcade,
            "arcadeSimple" | "arcade_simple" => EngineKind::ArcadeSimple,
            "realistic" => EngineKind::Realistic,
            other => {
                log::warn!("unknown engine '{}', falling back to arcade", other);
                EngineKind::Arcade
            }
        }
    }
}

/// Tuning for the arcade variants' wall reflection clamp
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArcadeTuning {
    /// Minimum outgoing angle from the inward normal (degrees).
    /// Keeps bounces from grazing along the wall.
    pub min_reflect_deg: f32,
    /// Maximum outgoing angle from the inward normal (degrees).
    /// Keeps bounces from reversing nearly 180°.
    pub max_reflect_deg: f32,
}

impl Default for ArcadeTuning {
    fn default() -> Self {
        Self {
            min_reflect_deg: 15.0,
            max_reflect_deg: 165.0,
        }
    }
}

/// Tuning for the realistic variant
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RealisticTuning {
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Speed fraction retained through an energy-lossy bounce
    pub elasticity: f32,
    /// Per-tick velocity damping factor
    pub air_resistance: f32,
    /// Below this speed a ball near the boundary settles to rest (units/s)
    pub min_velocity: f32,
    /// Fraction of the arena radius past which a ball counts as "near the boundary"
    pub ground_level: f32,
}

impl Default for RealisticTuning {
    fn default() -> Self {
        Self {
            gravity: 300.0,
            elasticity: 0.8,
            air_resistance: 0.995,
            min_velocity: 15.0,
            ground_level: 0.9,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Initial physics variant (switchable at runtime on the simulation state)
    pub engine: EngineKind,
    pub arcade: ArcadeTuning,
    pub realistic: RealisticTuning,
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.realistic.elasticity <= 0.0 || self.realistic.elasticity > 1.0 {
            return Err(SettingsError::Elasticity(self.realistic.elasticity));
        }
        if self.realistic.air_resistance <= 0.0 || self.realistic.air_resistance > 1.0 {
            return Err(SettingsError::AirResistance(self.realistic.air_resistance));
        }
        if self.arcade.min_reflect_deg >= self.arcade.max_reflect_deg {
            return Err(SettingsError::ReflectAngles {
                min: self.arcade.min_reflect_deg,
                max: self.arcade.max_reflect_deg,
            });
        }
        Ok(())
    }
}
