//! Racer and dust spawning

use glam::Vec2;
use rand::Rng;

use super::roster::ROSTER;
use super::state::{DustParticle, RacerState, Viewport};
use crate::consts::*;

/// Draw a velocity from the spawn ranges; also used by perturbation
pub fn random_velocity<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::new(
        rng.random_range(VX_MIN..VX_MAX),
        rng.random_range(VY_MIN..VY_MAX),
    )
}

/// Place one racer per roster entry inside the bottom-left spawn zone
pub fn spawn_racers<R: Rng + ?Sized>(viewport: Viewport, rng: &mut R) -> Vec<RacerState> {
    let zone_w = viewport.width * SPAWN_WIDTH_FRACTION;
    let zone_top = viewport.height * SPAWN_TOP_FRACTION;
    let zone_h = viewport.height - zone_top;

    ROSTER
        .iter()
        .map(|profile| {
            let pos = Vec2::new(
                rng.random::<f32>() * zone_w,
                zone_top + rng.random::<f32>() * zone_h,
            );
            RacerState::new(profile.id, pos, random_velocity(rng))
        })
        .collect()
}

/// Scatter `count` dust specks over the whole viewport
pub fn generate_dust<R: Rng + ?Sized>(
    viewport: Viewport,
    count: usize,
    rng: &mut R,
) -> Vec<DustParticle> {
    (0..count)
        .map(|_| DustParticle {
            pos: Vec2::new(
                rng.random::<f32>() * viewport.width,
                rng.random::<f32>() * viewport.height,
            ),
            size: rng.random::<f32>() * DUST_MAX_SIZE,
            opacity: rng.random::<f32>() * DUST_MAX_OPACITY,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_inside_zone() {
        let mut rng = Pcg32::seed_from_u64(7);
        let viewport = Viewport::new(1000.0, 800.0);
        for _ in 0..50 {
            let racers = spawn_racers(viewport, &mut rng);
            assert_eq!(racers.len(), RACER_COUNT);
            for r in &racers {
                assert!(r.pos.x >= 0.0 && r.pos.x <= 100.0, "x = {}", r.pos.x);
                assert!(r.pos.y >= 720.0 && r.pos.y <= 800.0, "y = {}", r.pos.y);
                assert!(r.vel.x >= VX_MIN && r.vel.x < VX_MAX);
                assert!(r.vel.y >= VY_MIN && r.vel.y < VY_MAX);
                assert!(!r.finished);
                assert!(r.tail.is_empty());
            }
        }
    }

    #[test]
    fn test_spawn_ids_follow_roster() {
        let mut rng = Pcg32::seed_from_u64(1);
        let racers = spawn_racers(Viewport::new(640.0, 480.0), &mut rng);
        let ids: Vec<u8> = racers.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_dust_within_bounds() {
        let mut rng = Pcg32::seed_from_u64(3);
        let dust = generate_dust(Viewport::new(300.0, 200.0), DUST_COUNT, &mut rng);
        assert_eq!(dust.len(), DUST_COUNT);
        for d in &dust {
            assert!(d.pos.x >= 0.0 && d.pos.x <= 300.0);
            assert!(d.pos.y >= 0.0 && d.pos.y <= 200.0);
            assert!(d.size >= 0.0 && d.size < DUST_MAX_SIZE);
            assert!(d.opacity >= 0.0 && d.opacity < DUST_MAX_OPACITY);
        }
    }
}
