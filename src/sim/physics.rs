//! Per-frame racer kinematics
//!
//! Each unfinished racer is pulled toward the top-right corner, shaken by a
//! bounded uniform jitter, slowed by drag, integrated, bounced off the
//! viewport edges and finally tested against the goal quarter-disc.

use glam::Vec2;
use rand::Rng;

use super::state::{RacerState, Viewport};
use crate::consts::*;

/// Goal quarter-disc radius for a viewport
#[inline]
pub fn goal_radius(viewport: Viewport) -> f32 {
    viewport.width.max(viewport.height) * GOAL_RADIUS_FACTOR
}

/// Whether a point lies strictly inside the goal region
#[inline]
pub fn in_goal(pos: Vec2, viewport: Viewport) -> bool {
    pos.distance(viewport.goal_corner()) < goal_radius(viewport)
}

/// Reflect one axis off `[0, bound]`, returning the new (coordinate, velocity)
#[inline]
fn bounce(coord: f32, vel: f32, bound: f32) -> (f32, f32) {
    if coord < 0.0 {
        (0.0, vel * -RESTITUTION)
    } else if coord > bound {
        (bound, vel * -RESTITUTION)
    } else {
        (coord, vel)
    }
}

/// Advance one racer by one frame, returning its next state.
///
/// Finished racers come back unchanged. A racer sitting exactly on the goal
/// corner has no direction to drift in and is finished in place.
pub fn step_racer<R: Rng + ?Sized>(
    racer: &RacerState,
    viewport: Viewport,
    elapsed_ms: f64,
    rng: &mut R,
) -> RacerState {
    let mut next = racer.clone();
    if next.finished {
        return next;
    }

    let to_goal = viewport.goal_corner() - next.pos;
    let dist = to_goal.length();
    if dist <= f32::EPSILON {
        next.finish(elapsed_ms);
        return next;
    }

    let mut vel = next.vel + to_goal / dist * ATTRACTION;
    vel.x += (rng.random::<f32>() - 0.5) * JITTER;
    vel.y += (rng.random::<f32>() - 0.5) * JITTER;
    vel *= DRAG;

    let pos = next.pos + vel;
    let (x, vx) = bounce(pos.x, vel.x, viewport.width);
    let (y, vy) = bounce(pos.y, vel.y, viewport.height);

    next.pos = Vec2::new(x, y);
    next.vel = Vec2::new(vx, vy);
    next.record_tail(next.pos);

    if in_goal(next.pos, viewport) {
        next.finish(elapsed_ms);
    }
    next
}
