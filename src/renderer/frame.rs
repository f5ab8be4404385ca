//! Frame assembly: race state to triangles
//!
//! Draw order is background, dust, goal zone, then per racer its trail and
//! its oriented marker. Everything here reads the session and never
//! mutates it, so it can run every frame in any phase.

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI};

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::consts::TAIL_LENGTH;
use crate::sim::{DustParticle, RaceSession, RacerState, goal_radius, profile};

/// Marker semi-axes for a finished racer; racing markers are 1/1.5 of this
const MARKER_RADII: Vec2 = Vec2::new(4.0, 2.0);
const MARKER_RACING_SCALE: f32 = 1.0 / 1.5;
const MARKER_SEGMENTS: u32 = 12;

const DUST_SEGMENTS: u32 = 6;
const GOAL_SEGMENTS: u32 = 32;
const GOAL_STROKE_WIDTH: f32 = 2.0;

const TRAIL_WIDTH: f32 = 1.0;
const TRAIL_MAX_ALPHA: f32 = 0.4;
const TRAIL_FINISHED_ALPHA: f32 = 0.1;

/// Per-frame drawing switches
#[derive(Debug, Clone, Copy)]
pub struct FrameOptions {
    pub trails: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self { trails: true }
    }
}

/// Trail alpha for the segment ending at tail index `i`
#[inline]
pub fn trail_alpha(i: usize, finished: bool) -> f32 {
    if finished {
        TRAIL_FINISHED_ALPHA
    } else {
        (i as f32 / TAIL_LENGTH as f32) * TRAIL_MAX_ALPHA
    }
}

/// Whether a racer is drawn as finished.
///
/// A racer frozen past the cutoff in the final tick holds no place, so it
/// keeps its racing look to match the results list.
pub fn is_placed(session: &RaceSession, racer: &RacerState) -> bool {
    racer.finished && session.rankings.contains(&racer.id)
}

/// Marker color: white while racing, the racer's own color once placed
pub fn marker_color(racer: &RacerState, placed: bool) -> [f32; 4] {
    if placed {
        profile(racer.id).map_or(colors::WHITE, |p| p.color)
    } else {
        colors::WHITE
    }
}

fn push_trail(vertices: &mut Vec<Vertex>, racer: &RacerState, placed: bool) {
    let points: Vec<Vec2> = racer.tail.iter().copied().collect();
    for (i, pair) in points.windows(2).enumerate() {
        let alpha = trail_alpha(i + 1, placed);
        vertices.extend(shapes::segment(
            pair[0],
            pair[1],
            TRAIL_WIDTH,
            colors::white(alpha),
        ));
    }
}

fn push_marker(vertices: &mut Vec<Vertex>, racer: &RacerState, placed: bool) {
    let radii = if placed {
        MARKER_RADII
    } else {
        MARKER_RADII * MARKER_RACING_SCALE
    };
    let angle = racer.vel.y.atan2(racer.vel.x);
    vertices.extend(shapes::ellipse(
        racer.pos,
        radii,
        angle,
        marker_color(racer, placed),
        MARKER_SEGMENTS,
    ));
}

/// Build the triangle list for one frame, in viewport pixel coordinates
pub fn build_frame(
    session: &RaceSession,
    dust: &[DustParticle],
    options: FrameOptions,
) -> Vec<Vertex> {
    let viewport = session.viewport;
    let mut vertices = Vec::with_capacity(4096);

    // Background
    vertices.extend(shapes::rect(
        Vec2::ZERO,
        Vec2::new(viewport.width, viewport.height),
        colors::TRACK,
    ));

    for speck in dust {
        vertices.extend(shapes::circle(
            speck.pos,
            speck.size,
            colors::white(speck.opacity),
            DUST_SEGMENTS,
        ));
    }

    // Goal zone: quarter disc opening down-left from the top-right corner
    let corner = viewport.goal_corner();
    let radius = goal_radius(viewport);
    vertices.extend(shapes::wedge(
        corner,
        radius,
        FRAC_PI_2,
        PI,
        colors::GOAL_FILL,
        GOAL_SEGMENTS,
    ));
    vertices.extend(shapes::arc_stroke(
        corner,
        radius,
        GOAL_STROKE_WIDTH,
        FRAC_PI_2,
        PI,
        colors::GOAL_STROKE,
        GOAL_SEGMENTS,
    ));

    for racer in &session.racers {
        let placed = is_placed(session, racer);
        if options.trails {
            push_trail(&mut vertices, racer, placed);
        }
        push_marker(&mut vertices, racer, placed);
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::{Viewport, generate_dust, start_race, tick};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn racing_session(rng: &mut Pcg32) -> RaceSession {
        start_race(2, 4, Viewport::new(1000.0, 800.0), rng).unwrap()
    }

    #[test]
    fn test_trail_alpha_scales_with_recency() {
        assert_eq!(trail_alpha(0, false), 0.0);
        assert!((trail_alpha(TAIL_LENGTH, false) - TRAIL_MAX_ALPHA).abs() < 1e-6);
        assert!(trail_alpha(5, false) < trail_alpha(15, false));
        assert_eq!(trail_alpha(19, true), TRAIL_FINISHED_ALPHA);
    }

    #[test]
    fn test_marker_color_switches_on_finish() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut session = racing_session(&mut rng);
        assert!(!is_placed(&session, session.racer(3).unwrap()));
        assert_eq!(marker_color(session.racer(3).unwrap(), false), colors::WHITE);

        session.racer_mut(3).unwrap().finish(0.0);
        session.rankings.push(3);
        let racer = session.racer(3).unwrap();
        assert!(is_placed(&session, racer));
        assert_eq!(marker_color(racer, true), profile(3).unwrap().color);
    }

    #[test]
    fn test_unranked_finisher_keeps_racing_look() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut session = racing_session(&mut rng);
        // Frozen in the final tick but past the cutoff
        session.racer_mut(6).unwrap().finish(0.0);
        let racer = session.racer(6).unwrap();
        assert!(racer.finished);
        assert!(!is_placed(&session, racer));

        let vertices = build_frame(&session, &[], FrameOptions { trails: false });
        let own = profile(6).unwrap().color;
        assert!(vertices.iter().all(|v| v.color != own));
    }

    #[test]
    fn test_frame_does_not_mutate_session() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut session = racing_session(&mut rng);
        for _ in 0..30 {
            tick(&mut session, FRAME_MS, &mut rng);
        }
        let dust = generate_dust(session.viewport, DUST_COUNT, &mut rng);
        let before = serde_json::to_string(&session).unwrap();
        let first = build_frame(&session, &dust, FrameOptions::default());
        let second = build_frame(&session, &dust, FrameOptions::default());
        assert_eq!(before, serde_json::to_string(&session).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_frame_starts_with_background() {
        let mut rng = Pcg32::seed_from_u64(3);
        let session = racing_session(&mut rng);
        let vertices = build_frame(&session, &[], FrameOptions::default());
        assert!(vertices.len() >= 6);
        assert!(vertices[..6].iter().all(|v| v.color == colors::TRACK));
        assert_eq!(vertices[5].position, [1000.0, 800.0]);
    }

    #[test]
    fn test_trails_toggle() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut session = racing_session(&mut rng);
        for _ in 0..10 {
            tick(&mut session, FRAME_MS, &mut rng);
        }
        let with = build_frame(&session, &[], FrameOptions { trails: true });
        let without = build_frame(&session, &[], FrameOptions { trails: false });
        assert!(with.len() > without.len());
    }
}
