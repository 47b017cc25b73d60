//! Deterministic simulation module
//!
//! All simulation logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (owned by the simulation state, captured by snapshots)
//! - Stable iteration order over the live ball collection
//! - No rendering or platform dependencies

pub mod arena;
pub mod collision;
pub mod engine;
pub mod events;
pub mod state;
pub mod tick;

pub use arena::Arena;
pub use engine::{WallContact, reflect_wall, update_ball};
pub use events::{BallHandle, EventHandlers, ScriptError, ScriptResult};
pub use state::{Ball, SimState, SpawnOptions};
pub use tick::{Stepper, tick};
