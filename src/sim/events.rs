//! Script host: event registration and the ball proxy
//!
//! User rules plug in as typed closures, one slot per event kind;
//! re-registering a slot replaces the prior callback. Callbacks receive a
//! `BallHandle` — a mutation-safe proxy over one ball — and report faults as
//! `ScriptError` values, which the host logs and swallows so a misbehaving
//! rule can never abort a tick.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use super::state::Ball;
use crate::consts::BALL_MIN_RADIUS;

/// Fault raised by a user callback; logged at the call site, never fatal
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ScriptError(pub String);

impl ScriptError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

pub type ScriptResult = Result<(), ScriptError>;

type TickFn = Box<dyn FnMut(f32) -> ScriptResult>;
type BallFn = Box<dyn FnMut(&mut BallHandle<'_>) -> ScriptResult>;
type PairFn = Box<dyn FnMut(&mut BallHandle<'_>, &mut BallHandle<'_>) -> ScriptResult>;

/// Mutation-safe view of one ball, handed to callbacks
///
/// Setters enforce the ball invariants (radius floor); `duplicate` requests
/// are collected on the handle and merged into the tick's deferred spawn
/// queue after the callback returns, so the live collection never changes
/// under a running callback.
pub struct BallHandle<'a> {
    ball: &'a mut Ball,
    spawned: Vec<Ball>,
}

impl<'a> BallHandle<'a> {
    pub(crate) fn new(ball: &'a mut Ball) -> Self {
        Self {
            ball,
            spawned: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.ball.id
    }

    pub fn x(&self) -> f32 {
        self.ball.pos.x
    }

    pub fn set_x(&mut self, x: f32) {
        self.ball.pos.x = x;
    }

    pub fn y(&self) -> f32 {
        self.ball.pos.y
    }

    pub fn set_y(&mut self, y: f32) {
        self.ball.pos.y = y;
    }

    pub fn vx(&self) -> f32 {
        self.ball.vel.x
    }

    pub fn vy(&self) -> f32 {
        self.ball.vel.y
    }

    pub fn set_velocity(&mut self, vx: f32, vy: f32) {
        self.ball.vel.x = vx;
        self.ball.vel.y = vy;
    }

    /// Scale speed without changing heading
    pub fn scale_speed(&mut self, factor: f32) {
        self.ball.vel *= factor;
    }

    pub fn r(&self) -> f32 {
        self.ball.radius
    }

    /// Radius is floored at 1; a zero or negative radius would break the
    /// collision math
    pub fn set_r(&mut self, r: f32) {
        self.ball.radius = r.max(BALL_MIN_RADIUS);
    }

    pub fn color(&self) -> &str {
        &self.ball.color
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.ball.color = color.into();
    }

    /// Per-ball user data bag
    pub fn data(&self) -> &HashMap<String, Value> {
        &self.ball.data
    }

    pub fn data_mut(&mut self) -> &mut HashMap<String, Value> {
        &mut self.ball.data
    }

    /// Mark the ball dead; physical removal happens at end of tick
    pub fn destroy(&mut self) {
        self.ball.alive = false;
    }

    pub fn is_alive(&self) -> bool {
        self.ball.alive
    }

    /// Request a copy of this ball (fresh id, fresh data bag copy). The
    /// copy joins the simulation at the end of the current tick.
    pub fn duplicate(&mut self) {
        let mut copy = self.ball.clone();
        copy.id = 0; // assigned at flush
        copy.alive = true;
        self.spawned.push(copy);
    }

    pub(crate) fn into_spawned(self) -> Vec<Ball> {
        self.spawned
    }
}

/// Registered callbacks, one optional slot per event kind
#[derive(Default)]
pub struct EventHandlers {
    on_tick: Option<TickFn>,
    on_wall_hit: Option<BallFn>,
    on_ball_collision: Option<PairFn>,
    on_spawn: Option<BallFn>,
    on_exit: Option<BallFn>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_on_tick(&mut self, f: impl FnMut(f32) -> ScriptResult + 'static) {
        self.on_tick = Some(Box::new(f));
    }

    pub fn set_on_wall_hit(
        &mut self,
        f: impl FnMut(&mut BallHandle<'_>) -> ScriptResult + 'static,
    ) {
        self.on_wall_hit = Some(Box::new(f));
    }

    pub fn set_on_ball_collision(
        &mut self,
        f: impl FnMut(&mut BallHandle<'_>, &mut BallHandle<'_>) -> ScriptResult + 'static,
    ) {
        self.on_ball_collision = Some(Box::new(f));
    }

    pub fn set_on_spawn(&mut self, f: impl FnMut(&mut BallHandle<'_>) -> ScriptResult + 'static) {
        self.on_spawn = Some(Box::new(f));
    }

    pub fn set_on_exit(&mut self, f: impl FnMut(&mut BallHandle<'_>) -> ScriptResult + 'static) {
        self.on_exit = Some(Box::new(f));
    }

    pub(crate) fn fire_tick(&mut self, dt: f32) {
        if let Some(cb) = self.on_tick.as_mut() {
            if let Err(e) = cb(dt) {
                log::warn!("onTick handler failed: {}", e);
            }
        }
    }

    pub(crate) fn fire_wall_hit(&mut self, ball: &mut Ball) -> Vec<Ball> {
        fire_ball_event(self.on_wall_hit.as_mut(), "onWallHit", ball)
    }

    pub(crate) fn fire_exit(&mut self, ball: &mut Ball) -> Vec<Ball> {
        fire_ball_event(self.on_exit.as_mut(), "onExit", ball)
    }

    pub(crate) fn fire_spawn(&mut self, ball: &mut Ball) -> Vec<Ball> {
        fire_ball_event(self.on_spawn.as_mut(), "onSpawn", ball)
    }

    pub(crate) fn fire_ball_collision(&mut self, a: &mut Ball, b: &mut Ball) -> Vec<Ball> {
        let Some(cb) = self.on_ball_collision.as_mut() else {
            return Vec::new();
        };
        let mut ha = BallHandle::new(a);
        let mut hb = BallHandle::new(b);
        if let Err(e) = cb(&mut ha, &mut hb) {
            log::warn!("onBallCollision handler failed: {}", e);
        }
        let mut spawned = ha.into_spawned();
        spawned.extend(hb.into_spawned());
        spawned
    }
}

fn fire_ball_event(slot: Option<&mut BallFn>, name: &str, ball: &mut Ball) -> Vec<Ball> {
    let Some(cb) = slot else {
        return Vec::new();
    };
    let mut handle = BallHandle::new(ball);
    if let Err(e) = cb(&mut handle) {
        log::warn!("{} handler failed: {}", name, e);
    }
    handle.into_spawned()
}
