//! Balls and core simulation state
//!
//! All state that must be captured for rewind/determinism lives here.
//! Cloning `SimState` is a full deep copy: ball scalars, user-data bags,
//! counters and the RNG mid-stream state all come along.

use std::collections::HashMap;
use std::f32::consts::PI;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::arena::Arena;
use crate::consts::*;
use crate::polar_to_cartesian;
use crate::settings::EngineKind;

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    /// Unique id, monotonic, never reused
    pub id: u64,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Always >= 1.0; mutation goes through `BallHandle::set_r` which clamps
    pub radius: f32,
    /// Opaque color string, owned by the host UI's vocabulary
    pub color: String,
    /// Cleared by `destroy()`; physical removal happens once per tick
    pub alive: bool,
    /// Per-ball user data bag, owned exclusively by the ball
    pub data: HashMap<String, Value>,
}

impl Ball {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: BALL_SPAWN_RADIUS_MIN,
            color: String::from("#ffffff"),
            alive: true,
            data: HashMap::new(),
        }
    }

    /// Current speed
    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Spawn overrides; unset fields are randomized from the seeded generator
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    pub r: Option<f32>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub vx: Option<f32>,
    pub vy: Option<f32>,
    pub color: Option<String>,
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Live balls, stable iteration order within a tick
    pub balls: Vec<Ball>,
    /// Strictly greater than every live or historical ball id
    next_id: u64,
    /// Elapsed simulation time (seconds)
    pub time: f64,
    /// Score accumulator; a gap escape counts one
    pub score: u64,
    /// Active physics variant, switchable at any time
    pub engine: EngineKind,
    /// Ball-ball collision enable flag
    pub ball_collisions: bool,
    /// Seeded RNG; part of the state so snapshots replay identically
    rng: Pcg32,
}

impl SimState {
    pub fn new(seed: u64, engine: EngineKind) -> Self {
        Self {
            seed,
            balls: Vec::new(),
            next_id: 1,
            time: 0.0,
            score: 0,
            engine,
            ball_collisions: true,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Allocate a new ball id
    pub fn next_ball_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Number of live balls
    pub fn live_count(&self) -> usize {
        self.balls.iter().filter(|b| b.alive).count()
    }

    /// Spawn one ball inside the arena, randomizing any field the options
    /// leave unset. Returns the index of the new ball; the caller fires the
    /// spawn event.
    pub fn spawn_ball(&mut self, opts: &SpawnOptions, arena: &Arena) -> usize {
        let id = self.next_ball_id();
        let mut ball = Ball::new(id);

        ball.radius = match opts.r {
            Some(r) => r.max(BALL_MIN_RADIUS),
            None => self
                .rng
                .random_range(BALL_SPAWN_RADIUS_MIN..BALL_SPAWN_RADIUS_MAX),
        };

        // Uniform over the inner 80% disc, so fresh balls never start
        // embedded in the wall
        let (rand_x, rand_y) = if opts.x.is_none() || opts.y.is_none() {
            let max_dist = (arena.radius - ball.radius).max(0.0) * 0.8;
            let dist = max_dist * self.rng.random::<f32>().sqrt();
            let theta = self.rng.random_range(-PI..PI);
            let p = arena.center + polar_to_cartesian(dist, theta);
            (p.x, p.y)
        } else {
            (0.0, 0.0)
        };
        ball.pos = Vec2::new(opts.x.unwrap_or(rand_x), opts.y.unwrap_or(rand_y));

        let (rand_vx, rand_vy) = if opts.vx.is_none() || opts.vy.is_none() {
            match self.engine {
                // Arcade balls fly; a random heading at full speed
                EngineKind::Arcade | EngineKind::ArcadeSimple => {
                    let speed = self.rng.random_range(60.0..180.0);
                    let theta = self.rng.random_range(-PI..PI);
                    let v = polar_to_cartesian(speed, theta);
                    (v.x, v.y)
                }
                // Realistic balls drift; gravity does the rest
                EngineKind::Realistic => (
                    self.rng.random_range(-60.0..60.0),
                    self.rng.random_range(-60.0..60.0),
                ),
            }
        } else {
            (0.0, 0.0)
        };
        ball.vel = Vec2::new(opts.vx.unwrap_or(rand_vx), opts.vy.unwrap_or(rand_vy));

        ball.color = match &opts.color {
            Some(c) => c.clone(),
            None => format!("hsl({}, 70%, 55%)", self.rng.random_range(0..360)),
        };

        self.balls.push(ball);
        self.balls.len() - 1
    }

    /// Remove balls marked dead. Called once per tick, after all per-ball
    /// processing, so iteration order stays stable mid-tick.
    pub fn sweep_dead(&mut self) {
        self.balls.retain(|b| b.alive);
    }
}
