//! Physics engine variants
//!
//! Each variant exposes the same two operations over a single ball:
//! `update_ball` integrates motion for one timestep, `reflect_wall` detects
//! and resolves contact with the arena boundary (or passage through the
//! escape gap). Event dispatch is the caller's job; these functions report
//! what happened through `WallContact`.

use glam::Vec2;

use super::arena::Arena;
use super::state::Ball;
use crate::consts::DISTANCE_EPS;
use crate::settings::{EngineKind, Settings};

/// Per-component speed below which a realistic ball is considered at rest
const VELOCITY_SETTLE_EPS: f32 = 0.01;

/// Outcome of a wall check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallContact {
    /// Bounced off the boundary
    Bounce,
    /// Passed through the escape gap and was re-centered
    Exit,
}

/// Integrate one ball's motion for one timestep
pub fn update_ball(ball: &mut Ball, engine: EngineKind, settings: &Settings, arena: &Arena, dt: f32) {
    match engine {
        // Pure kinematic translation; bounces never lose energy
        EngineKind::Arcade | EngineKind::ArcadeSimple => {
            ball.pos += ball.vel * dt;
        }
        EngineKind::Realistic => {
            let tuning = &settings.realistic;
            ball.vel.y -= tuning.gravity * dt;
            ball.vel *= tuning.air_resistance;

            // Settling: a slow ball resting near the boundary stops outright,
            // as does one whose velocity has damped to numerical noise
            let near_ground =
                arena.center_distance(ball.pos) > tuning.ground_level * arena.radius;
            let slow = ball.speed() < tuning.min_velocity;
            let negligible = ball.vel.x.abs() < VELOCITY_SETTLE_EPS
                && ball.vel.y.abs() < VELOCITY_SETTLE_EPS;
            if (slow && near_ground) || negligible {
                ball.vel = Vec2::ZERO;
            }

            ball.pos += ball.vel * dt;
        }
    }
}

/// Detect and resolve contact with the arena boundary.
///
/// Returns `None` while the ball is fully inside. On contact, either the
/// ball's angular position falls in the escape gap (ball re-centers,
/// `Exit`), or it is repositioned onto the boundary and its velocity
/// reflected (`Bounce`). Arcade variants clamp the reflection angle and
/// preserve speed exactly; the realistic variant scales speed by elasticity
/// instead.
pub fn reflect_wall(
    ball: &mut Ball,
    engine: EngineKind,
    settings: &Settings,
    arena: &Arena,
) -> Option<WallContact> {
    let offset = ball.pos - arena.center;
    let dist = offset.length();
    if dist + ball.radius <= arena.radius {
        return None;
    }
    // Degenerate contact normal (ball centered on the arena center but
    // larger than the arena): skip this tick
    if dist <= DISTANCE_EPS {
        return None;
    }

    let theta = offset.y.atan2(offset.x);
    if arena.contains_gap_angle(theta) {
        // Gap passage: re-enter at the arena center, velocity untouched
        ball.pos = arena.center;
        return Some(WallContact::Exit);
    }

    let outward = offset / dist;
    let inward = -outward;

    // Remove boundary overlap along the contact normal
    ball.pos = arena.center + outward * (arena.radius - ball.radius);

    let reflected = reflect_velocity(ball.vel, inward);
    ball.vel = match engine {
        EngineKind::Arcade | EngineKind::ArcadeSimple => {
            clamp_reflection(reflected, inward, settings)
        }
        EngineKind::Realistic => reflected * settings.realistic.elasticity,
    };

    Some(WallContact::Bounce)
}

/// Mirror reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Clamp the outgoing direction's deviation from the inward normal into
/// [min, max] degrees, preserving speed exactly. Prevents near-tangential
/// cascades along the wall and near-180° reversals.
fn clamp_reflection(velocity: Vec2, inward: Vec2, settings: &Settings) -> Vec2 {
    let speed = velocity.length();
    if speed <= DISTANCE_EPS {
        return velocity;
    }
    let dir = velocity / speed;

    let deviation = dir.dot(inward).clamp(-1.0, 1.0).acos();
    let min = settings.arcade.min_reflect_deg.to_radians();
    let max = settings.arcade.max_reflect_deg.to_radians();
    let clamped = deviation.clamp(min, max);
    if clamped == deviation {
        return velocity;
    }

    // Keep the same angular side of the normal; a dead-center reversal has
    // no side, so pick counterclockwise
    let cross = inward.x * dir.y - inward.y * dir.x;
    let side = if cross >= 0.0 { 1.0 } else { -1.0 };
    rotate(inward, clamped * side) * speed
}

#[inline]
fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use proptest::prelude::*;

    fn ball_at(pos: Vec2, vel: Vec2, radius: f32) -> Ball {
        let mut ball = Ball::new(1);
        ball.pos = pos;
        ball.vel = vel;
        ball.radius = radius;
        ball
    }

    fn no_gap_arena(radius: f32) -> Arena {
        Arena::new(Vec2::ZERO, radius, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_arcade_update_is_translation_only() {
        let arena = Arena::default();
        let settings = Settings::default();
        let mut ball = ball_at(Vec2::new(10.0, 20.0), Vec2::new(120.0, -60.0), 8.0);
        update_ball(&mut ball, EngineKind::Arcade, &settings, &arena, SIM_DT);
        assert_eq!(ball.vel, Vec2::new(120.0, -60.0));
        assert!((ball.pos.x - (10.0 + 120.0 * SIM_DT)).abs() < 1e-5);
        assert!((ball.pos.y - (20.0 - 60.0 * SIM_DT)).abs() < 1e-5);
    }

    #[test]
    fn test_realistic_update_applies_gravity_and_drag() {
        let arena = Arena::default();
        let settings = Settings::default();
        let mut ball = ball_at(Vec2::ZERO, Vec2::new(100.0, 0.0), 8.0);
        update_ball(&mut ball, EngineKind::Realistic, &settings, &arena, SIM_DT);
        // Drag shrinks the horizontal component, gravity adds a downward one
        assert!(ball.vel.x < 100.0);
        assert!(ball.vel.y < 0.0);
    }

    #[test]
    fn test_realistic_settles_near_boundary() {
        let arena = Arena::default();
        let settings = Settings::default();
        // Slow ball out past the ground-level fraction
        let mut ball = ball_at(Vec2::new(0.0, -380.0), Vec2::new(2.0, 2.0), 8.0);
        update_ball(&mut ball, EngineKind::Realistic, &settings, &arena, SIM_DT);
        assert_eq!(ball.vel, Vec2::ZERO);
    }

    #[test]
    fn test_realistic_does_not_settle_when_fast() {
        let arena = Arena::default();
        let settings = Settings::default();
        let mut ball = ball_at(Vec2::new(0.0, -380.0), Vec2::new(200.0, 0.0), 8.0);
        update_ball(&mut ball, EngineKind::Realistic, &settings, &arena, SIM_DT);
        assert!(ball.speed() > 0.0);
    }

    #[test]
    fn test_reflect_wall_spec_scenario() {
        // Arena radius 100, gap width 0, ball at distance 105 moving
        // directly outward
        let arena = no_gap_arena(100.0);
        let settings = Settings::default();
        let mut ball = ball_at(Vec2::new(105.0, 0.0), Vec2::new(50.0, 0.0), 8.0);

        let contact = reflect_wall(&mut ball, EngineKind::Arcade, &settings, &arena);
        assert_eq!(contact, Some(WallContact::Bounce));
        // Repositioned onto the boundary
        assert!((ball.pos.length() + ball.radius - arena.radius).abs() < 1e-4);
        // Heading back inward (within the angle clamp)
        assert!(ball.vel.x < 0.0);
        // Speed preserved exactly
        assert!((ball.speed() - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_no_contact_inside() {
        let arena = no_gap_arena(100.0);
        let settings = Settings::default();
        let mut ball = ball_at(Vec2::new(50.0, 0.0), Vec2::new(50.0, 0.0), 8.0);
        assert_eq!(
            reflect_wall(&mut ball, EngineKind::Arcade, &settings, &arena),
            None
        );
        assert_eq!(ball.pos, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_gap_exit_recenters_once() {
        // Gap centered at angle 0, wide enough to catch the contact
        let arena = Arena::new(Vec2::ZERO, 100.0, 0.0, 0.5).unwrap();
        let settings = Settings::default();
        let mut ball = ball_at(Vec2::new(105.0, 0.0), Vec2::new(50.0, 0.0), 8.0);

        let contact = reflect_wall(&mut ball, EngineKind::Arcade, &settings, &arena);
        assert_eq!(contact, Some(WallContact::Exit));
        assert_eq!(ball.pos, Vec2::ZERO);

        // Re-centered ball is fully inside; no second contact
        assert_eq!(
            reflect_wall(&mut ball, EngineKind::Arcade, &settings, &arena),
            None
        );
    }

    #[test]
    fn test_contact_outside_gap_bounces() {
        let arena = Arena::new(Vec2::ZERO, 100.0, 0.0, 0.5).unwrap();
        let settings = Settings::default();
        // Contact on the far side, opposite the gap
        let mut ball = ball_at(Vec2::new(-105.0, 0.0), Vec2::new(-50.0, 0.0), 8.0);
        assert_eq!(
            reflect_wall(&mut ball, EngineKind::Arcade, &settings, &arena),
            Some(WallContact::Bounce)
        );
    }

    #[test]
    fn test_clamp_pushes_head_on_reflection_out() {
        let arena = no_gap_arena(100.0);
        let settings = Settings::default();
        // Dead-center hit: the mirror reflection points straight back at the
        // arena center, 0° off the inward normal, below the 15° minimum
        let mut ball = ball_at(Vec2::new(105.0, 0.0), Vec2::new(80.0, 0.0), 8.0);
        reflect_wall(&mut ball, EngineKind::Arcade, &settings, &arena);

        let inward = Vec2::new(-1.0, 0.0);
        let deviation = (ball.vel / ball.speed()).dot(inward).clamp(-1.0, 1.0).acos();
        let min = settings.arcade.min_reflect_deg.to_radians();
        assert!(
            deviation >= min - 1e-4,
            "deviation {} below clamp {}",
            deviation,
            min
        );
        assert!((ball.speed() - 80.0).abs() < 1e-3);
    }

    #[test]
    fn test_clamp_pulls_outward_reflection_in() {
        let arena = no_gap_arena(100.0);
        let settings = Settings::default();
        // Ball overlapping the wall while already moving back inward (a
        // callback can produce this); the mirror image points almost
        // straight outward, past the 165° maximum
        let mut ball = ball_at(Vec2::new(105.0, 0.0), Vec2::new(-100.0, 10.0), 8.0);
        let before = ball.speed();
        reflect_wall(&mut ball, EngineKind::Arcade, &settings, &arena);

        let inward = Vec2::new(-1.0, 0.0);
        let deviation = (ball.vel / ball.speed()).dot(inward).clamp(-1.0, 1.0).acos();
        let max = settings.arcade.max_reflect_deg.to_radians();
        assert!(
            (deviation - max).abs() < 1e-3,
            "deviation {} not pulled to clamp {}",
            deviation,
            max
        );
        assert!((ball.speed() - before).abs() < 1e-3);
    }

    #[test]
    fn test_realistic_bounce_loses_energy() {
        let arena = no_gap_arena(100.0);
        let settings = Settings::default();
        let mut ball = ball_at(Vec2::new(105.0, 0.0), Vec2::new(50.0, 30.0), 8.0);
        let before = ball.speed();
        reflect_wall(&mut ball, EngineKind::Realistic, &settings, &arena);
        assert!(ball.speed() <= before);
        assert!((ball.speed() - before * settings.realistic.elasticity).abs() < 1e-3);
    }

    proptest! {
        /// Arcade wall reflection preserves speed exactly and leaves no
        /// residual penetration, wherever and however the ball hits.
        #[test]
        fn prop_arcade_reflection_preserves_speed(
            theta in -std::f32::consts::PI..std::f32::consts::PI,
            overshoot in 0.1f32..40.0,
            vx in -300.0f32..300.0,
            vy in -300.0f32..300.0,
        ) {
            prop_assume!(vx.abs() > 1.0 || vy.abs() > 1.0);
            let arena = no_gap_arena(100.0);
            let settings = Settings::default();
            let pos = crate::polar_to_cartesian(100.0 + overshoot, theta);
            let mut ball = ball_at(pos, Vec2::new(vx, vy), 8.0);
            let before = ball.speed();

            let contact = reflect_wall(&mut ball, EngineKind::Arcade, &settings, &arena);
            prop_assert_eq!(contact, Some(WallContact::Bounce));
            prop_assert!((ball.speed() - before).abs() < before * 1e-4);
            prop_assert!(ball.pos.length() + ball.radius <= arena.radius + 1e-3);
        }

        /// Realistic reflection never gains energy.
        #[test]
        fn prop_realistic_reflection_never_gains(
            theta in -std::f32::consts::PI..std::f32::consts::PI,
            vx in -300.0f32..300.0,
            vy in -300.0f32..300.0,
        ) {
            let arena = no_gap_arena(100.0);
            let settings = Settings::default();
            let pos = crate::polar_to_cartesian(110.0, theta);
            let mut ball = ball_at(pos, Vec2::new(vx, vy), 8.0);
            let before = ball.speed();
            reflect_wall(&mut ball, EngineKind::Realistic, &settings, &arena);
            prop_assert!(ball.speed() <= before + 1e-3);
        }
    }
}
