//! Fixed timestep simulation tick and the accumulator-driven stepper
//!
//! One tick: fire `onTick`, integrate and wall-check every live ball (firing
//! wall/exit events), resolve ball-ball pairs if enabled, flush deferred
//! spawns, sweep the dead. The `Stepper` wraps this in a time accumulator
//! and snapshots every frame before ticking it, so playback can step
//! backward as well as forward.

use std::collections::VecDeque;

use super::arena::Arena;
use super::collision;
use super::engine::{self, WallContact};
use super::events::EventHandlers;
use super::state::{Ball, SimState, SpawnOptions};
use crate::consts::{MAX_FRAME_DT, SIM_DT};
use crate::history::{History, HistoryStats};
use crate::settings::{Settings, SettingsError};

/// Advance the simulation state by one fixed timestep
pub fn tick(
    state: &mut SimState,
    settings: &Settings,
    arena: &Arena,
    handlers: &mut EventHandlers,
    dt: f32,
) {
    handlers.fire_tick(dt);

    // Duplicates and exit respawns requested by callbacks land here and
    // join the collection only after all per-ball processing
    let mut spawned: Vec<Ball> = Vec::new();

    let engine_kind = state.engine;
    for idx in 0..state.balls.len() {
        let contact = {
            let ball = &mut state.balls[idx];
            if !ball.alive {
                continue;
            }
            engine::update_ball(ball, engine_kind, settings, arena, dt);
            engine::reflect_wall(ball, engine_kind, settings, arena)
        };
        match contact {
            Some(WallContact::Exit) => {
                state.score += 1;
                log::debug!(
                    "ball {} escaped through the gap, score {}",
                    state.balls[idx].id,
                    state.score
                );
                spawned.extend(handlers.fire_exit(&mut state.balls[idx]));
            }
            Some(WallContact::Bounce) => {
                spawned.extend(handlers.fire_wall_hit(&mut state.balls[idx]));
            }
            None => {}
        }
    }

    if state.ball_collisions {
        collision::resolve_pairs(state, settings, handlers, &mut spawned);
    }

    flush_spawned(state, handlers, spawned);
    state.sweep_dead();
    state.time += f64::from(dt);
}

/// Append deferred spawns to the live collection, assigning fresh ids and
/// firing the spawn event for each. A spawn handler may itself request
/// duplicates; those drain through the same queue.
pub(crate) fn flush_spawned(
    state: &mut SimState,
    handlers: &mut EventHandlers,
    spawned: Vec<Ball>,
) {
    let mut queue: VecDeque<Ball> = spawned.into();
    while let Some(mut ball) = queue.pop_front() {
        ball.id = state.next_ball_id();
        state.balls.push(ball);
        let idx = state.balls.len() - 1;
        queue.extend(handlers.fire_spawn(&mut state.balls[idx]));
    }
}

/// Fixed-timestep driver owning the simulation state, the script host and
/// the snapshot history
pub struct Stepper {
    state: SimState,
    settings: Settings,
    arena: Arena,
    handlers: EventHandlers,
    history: History,
    accumulator: f32,
    frame: u64,
}

impl Stepper {
    pub fn new(seed: u64, settings: Settings, arena: Arena) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            state: SimState::new(seed, settings.engine),
            settings,
            arena,
            handlers: EventHandlers::new(),
            history: History::new(),
            accumulator: 0.0,
            frame: 0,
        })
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn handlers_mut(&mut self) -> &mut EventHandlers {
        &mut self.handlers
    }

    /// Frame about to be simulated next
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Feed elapsed wall-clock time; runs zero or more fixed ticks.
    /// Each frame is snapshotted before its tick so it can be restored.
    /// Returns the number of ticks executed.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.min(MAX_FRAME_DT);
        let mut ticks = 0;
        while self.accumulator >= SIM_DT {
            self.step();
            self.accumulator -= SIM_DT;
            ticks += 1;
        }
        ticks
    }

    /// Run exactly one tick (used by stepping UIs)
    pub fn step(&mut self) {
        self.history.save(self.frame, &self.state);
        tick(
            &mut self.state,
            &self.settings,
            &self.arena,
            &mut self.handlers,
            SIM_DT,
        );
        self.frame += 1;
    }

    /// Spawn `count` balls, firing the spawn event for each. Returns the
    /// new ids.
    pub fn spawn(&mut self, count: usize, opts: &SpawnOptions) -> Vec<u64> {
        let mut ids = Vec::with_capacity(count);
        let mut extra = Vec::new();
        for _ in 0..count {
            let idx = self.state.spawn_ball(opts, &self.arena);
            ids.push(self.state.balls[idx].id);
            extra.extend(self.handlers.fire_spawn(&mut self.state.balls[idx]));
        }
        flush_spawned(&mut self.state, &mut self.handlers, extra);
        ids
    }

    /// Snapshot the current state at the current frame (the stepper also
    /// does this automatically before every tick)
    pub fn save_state(&mut self) {
        self.history.save(self.frame, &self.state);
    }

    /// Restore an exactly-matching frame, replacing the simulation state
    /// wholesale and rewinding the frame counter. Returns the restored
    /// frame, or `None` on a miss — callers wanting a nearby frame must ask
    /// `closest_available_frame` and restore that explicitly.
    pub fn restore_state(&mut self, frame: u64) -> Option<u64> {
        let state = self.history.restore(frame)?;
        self.state = state;
        self.frame = frame;
        self.accumulator = 0.0;
        log::info!("restored simulation to frame {}", frame);
        Some(frame)
    }

    pub fn closest_available_frame(&self, frame: u64) -> Option<u64> {
        self.history.closest_available(frame)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history_stats(&self) -> HistoryStats {
        self.history.stats()
    }

    /// Fresh run: new state from the seed, frame counter and history reset.
    /// Registered handlers survive a reset.
    pub fn reset(&mut self, seed: u64) {
        self.state = SimState::new(seed, self.settings.engine);
        self.accumulator = 0.0;
        self.frame = 0;
        self.history.clear();
        log::info!("simulation reset, seed {}", seed);
    }
}
