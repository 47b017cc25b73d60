//! Pairwise ball-ball collision resolution
//!
//! Runs once per tick over all unordered pairs of live balls in stable
//! (i, j) order with i < j. O(n²) sweep; ball counts in this simulation stay
//! small enough that a spatial index would not pay for itself.

use super::engine::reflect_velocity;
use super::events::EventHandlers;
use super::state::{Ball, SimState};
use crate::consts::DISTANCE_EPS;
use crate::settings::{EngineKind, Settings};

/// Speed added along the contact normal when a pair is still overlapping
/// after its collision callback ran (keeps the pair from re-colliding on the
/// very next tick)
const SEPARATION_NUDGE: f32 = 1.0;

/// Detect and resolve every overlapping pair, firing the collision event
/// once per pair. Duplicates requested by callbacks are appended to
/// `spawned` for the caller to flush at end of tick.
pub fn resolve_pairs(
    state: &mut SimState,
    settings: &Settings,
    handlers: &mut EventHandlers,
    spawned: &mut Vec<Ball>,
) {
    let engine = state.engine;
    let count = state.balls.len();
    for i in 0..count {
        for j in (i + 1)..count {
            // Two disjoint &mut into the same Vec
            let (left, right) = state.balls.split_at_mut(j);
            let a = &mut left[i];
            let b = &mut right[0];
            if !a.alive || !b.alive {
                continue;
            }
            resolve_pair(a, b, engine, settings, handlers, spawned);
        }
    }
}

fn resolve_pair(
    a: &mut Ball,
    b: &mut Ball,
    engine: EngineKind,
    settings: &Settings,
    handlers: &mut EventHandlers,
    spawned: &mut Vec<Ball>,
) {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let radius_sum = a.radius + b.radius;
    // Near-zero separation would divide by ~0; treat as no collision this tick
    if dist <= DISTANCE_EPS || dist >= radius_sum {
        return;
    }

    let normal = delta / dist;
    let penetration = radius_sum - dist;

    // Push apart along the normal, weighted by the other ball's radius
    // share so the larger ball moves less
    let share_a = b.radius / radius_sum;
    let share_b = a.radius / radius_sum;
    a.pos -= normal * penetration * share_a;
    b.pos += normal * penetration * share_b;

    match engine {
        // No momentum transfer: each ball bounces off the contact plane on
        // its own, keeping its pre-collision speed
        EngineKind::ArcadeSimple => {
            let speed_a = a.speed();
            let speed_b = b.speed();
            a.vel = reflect_velocity(a.vel, normal).normalize_or_zero() * speed_a;
            b.vel = reflect_velocity(b.vel, normal).normalize_or_zero() * speed_b;
        }
        // Equal-mass elastic exchange of the normal components
        EngineKind::Arcade | EngineKind::Realistic => {
            let vn_a = a.vel.dot(normal);
            let vn_b = b.vel.dot(normal);
            a.vel += (vn_b - vn_a) * normal;
            b.vel += (vn_a - vn_b) * normal;
            if engine == EngineKind::Realistic {
                let elasticity = settings.realistic.elasticity;
                a.vel *= elasticity;
                b.vel *= elasticity;
            }
        }
    }

    // User code runs after the physical response and may move, resize or
    // kill either ball
    spawned.extend(handlers.fire_ball_collision(a, b));

    reseparate(a, b);
}

/// Corrective pass after the collision callback: if the pair still overlaps
/// (for instance a callback grew a radius), restore separation now and nudge
/// the velocities apart so the pair does not immediately re-collide.
fn reseparate(a: &mut Ball, b: &mut Ball) {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let radius_sum = a.radius + b.radius;
    if dist <= DISTANCE_EPS || dist >= radius_sum {
        return;
    }
    let normal = delta / dist;
    let overlap = radius_sum - dist;
    a.pos -= normal * overlap * 0.5;
    b.pos += normal * overlap * 0.5;
    a.vel -= normal * SEPARATION_NUDGE;
    b.vel += normal * SEPARATION_NUDGE;
}
