//! Per-racer velocity perturbation timers
//!
//! Each racer owns a self-rescheduling one-shot timer. When it fires, the
//! racer's velocity is redrawn from the spawn ranges and a new delay in
//! `[PERTURB_MIN_MS, PERTURB_MAX_MS)` is drawn. Timers live on the same
//! cooperative clock as the frame loop: the host advances the clock between
//! ticks and due timers fire in due order before the next tick runs.
//!
//! Every timer carries the `SessionId` it was armed for. A timer that fires
//! against another session, a session no longer racing, or a finished racer
//! is dropped and its chain ends.

use rand::Rng;

use super::factory::random_velocity;
use super::state::{RaceSession, SessionId};
use crate::consts::*;

/// One pending firing
#[derive(Debug, Clone, Copy, PartialEq)]
struct PerturbTimer {
    session: SessionId,
    racer_id: u8,
    due_ms: f64,
}

/// Cooperative timer wheel for velocity perturbations
#[derive(Debug, Default)]
pub struct PerturbationScheduler {
    /// Scheduler clock in milliseconds
    now_ms: f64,
    timers: Vec<PerturbTimer>,
    /// Total successful firings, for diagnostics
    fired: u64,
}

impl PerturbationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Number of outstanding timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Whether a timer is outstanding for this racer
    pub fn is_armed(&self, racer_id: u8) -> bool {
        self.timers.iter().any(|t| t.racer_id == racer_id)
    }

    /// Drop every outstanding timer, returning how many were canceled
    pub fn cancel_all(&mut self) -> usize {
        let canceled = self.timers.len();
        self.timers.clear();
        if canceled > 0 {
            log::debug!("Canceled {} perturbation timers", canceled);
        }
        canceled
    }

    /// Replace all timers with one fresh chain per unfinished racer of `session`
    pub fn arm<R: Rng + ?Sized>(&mut self, session: &RaceSession, rng: &mut R) {
        self.cancel_all();
        if !session.is_racing() {
            return;
        }
        let from = self.now_ms;
        for racer in session.unfinished() {
            self.schedule(session.id, racer.id, from, rng);
        }
    }

    fn schedule<R: Rng + ?Sized>(
        &mut self,
        session: SessionId,
        racer_id: u8,
        from_ms: f64,
        rng: &mut R,
    ) {
        let delay = rng.random_range(PERTURB_MIN_MS..PERTURB_MAX_MS);
        self.timers.push(PerturbTimer {
            session,
            racer_id,
            due_ms: from_ms + delay,
        });
    }

    /// Index of the earliest timer due at or before `horizon`, ties by racer id
    fn next_due(&self, horizon: f64) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= horizon)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .total_cmp(&b.due_ms)
                    .then(a.racer_id.cmp(&b.racer_id))
            })
            .map(|(i, _)| i)
    }

    /// Advance the clock by `dt_ms`, firing every timer that comes due.
    ///
    /// A chain may fire several times within one long advance. Returns the
    /// number of velocity reassignments applied.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f64,
        session: &mut RaceSession,
        rng: &mut R,
    ) -> usize {
        let horizon = self.now_ms + dt_ms.max(0.0);
        let mut applied = 0;

        while let Some(idx) = self.next_due(horizon) {
            let timer = self.timers.swap_remove(idx);
            self.now_ms = timer.due_ms;

            if !Self::fire(timer, session, rng) {
                continue;
            }
            applied += 1;
            self.fired += 1;
            self.schedule(timer.session, timer.racer_id, timer.due_ms, rng);
        }

        self.now_ms = horizon;
        applied
    }

    /// Apply one firing; false means the chain ends here
    fn fire<R: Rng + ?Sized>(timer: PerturbTimer, session: &mut RaceSession, rng: &mut R) -> bool {
        if timer.session != session.id || !session.is_racing() {
            return false;
        }
        match session.racer_mut(timer.racer_id) {
            Some(racer) if !racer.finished => {
                racer.vel = random_velocity(rng);
                log::debug!(
                    "Perturbed racer #{} at {:.0} ms: ({:.2}, {:.2})",
                    racer.id,
                    timer.due_ms,
                    racer.vel.x,
                    racer.vel.y
                );
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{RacePhase, Viewport};
    use crate::sim::tick::start_race;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn racing(rng: &mut Pcg32) -> RaceSession {
        start_race(1, 4, Viewport::new(1000.0, 800.0), rng).unwrap()
    }

    #[test]
    fn test_arm_one_timer_per_racer() {
        let mut rng = Pcg32::seed_from_u64(1);
        let session = racing(&mut rng);
        let mut scheduler = PerturbationScheduler::new();
        scheduler.arm(&session, &mut rng);
        assert_eq!(scheduler.pending(), RACER_COUNT);
        for id in 1..=8 {
            assert!(scheduler.is_armed(id));
        }
    }

    #[test]
    fn test_nothing_fires_before_min_delay() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut session = racing(&mut rng);
        let mut scheduler = PerturbationScheduler::new();
        scheduler.arm(&session, &mut rng);
        let before: Vec<Vec2> = session.racers.iter().map(|r| r.vel).collect();

        assert_eq!(scheduler.advance(PERTURB_MIN_MS - 1.0, &mut session, &mut rng), 0);
        let after: Vec<Vec2> = session.racers.iter().map(|r| r.vel).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_every_racer_fires_and_rearms() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut session = racing(&mut rng);
        for r in session.racers.iter_mut() {
            r.vel = Vec2::new(5.0, 5.0);
        }
        let mut scheduler = PerturbationScheduler::new();
        scheduler.arm(&session, &mut rng);

        let applied = scheduler.advance(PERTURB_MAX_MS, &mut session, &mut rng);
        assert!(applied >= RACER_COUNT);
        for r in &session.racers {
            assert!(r.vel.x >= VX_MIN && r.vel.x < VX_MAX);
            assert!(r.vel.y >= VY_MIN && r.vel.y < VY_MAX);
        }
        // Each chain rescheduled itself
        assert_eq!(scheduler.pending(), RACER_COUNT);
    }

    #[test]
    fn test_long_advance_fires_chain_repeatedly() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut session = racing(&mut rng);
        let mut scheduler = PerturbationScheduler::new();
        scheduler.arm(&session, &mut rng);
        let applied = scheduler.advance(6000.0, &mut session, &mut rng);
        // At most 600 ms apart, so at least 10 firings per racer
        assert!(applied >= RACER_COUNT * 10);
        assert!((scheduler.now_ms() - 6000.0).abs() < 1e-9);
    }

    #[test]
    fn test_finished_racer_chain_stops() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut session = racing(&mut rng);
        let mut scheduler = PerturbationScheduler::new();
        scheduler.arm(&session, &mut rng);

        let frozen_vel = Vec2::new(9.0, 9.0);
        if let Some(r) = session.racer_mut(4) {
            r.vel = frozen_vel;
            r.finish(0.0);
        }
        scheduler.advance(2000.0, &mut session, &mut rng);
        assert_eq!(session.racer(4).map(|r| r.vel), Some(frozen_vel));
        assert!(!scheduler.is_armed(4));
        assert_eq!(scheduler.pending(), RACER_COUNT - 1);
    }

    #[test]
    fn test_chains_stop_when_race_ends() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut session = racing(&mut rng);
        let mut scheduler = PerturbationScheduler::new();
        scheduler.arm(&session, &mut rng);
        session.phase = RacePhase::Finished;

        assert_eq!(scheduler.advance(PERTURB_MAX_MS, &mut session, &mut rng), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_stale_session_timers_are_noops() {
        let mut rng = Pcg32::seed_from_u64(7);
        let old = racing(&mut rng);
        let mut scheduler = PerturbationScheduler::new();
        scheduler.arm(&old, &mut rng);

        // Session replaced without canceling
        let mut fresh = racing(&mut rng);
        let before: Vec<Vec2> = fresh.racers.iter().map(|r| r.vel).collect();
        assert_eq!(scheduler.advance(PERTURB_MAX_MS, &mut fresh, &mut rng), 0);
        let after: Vec<Vec2> = fresh.racers.iter().map(|r| r.vel).collect();
        assert_eq!(before, after);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cancel_all() {
        let mut rng = Pcg32::seed_from_u64(8);
        let session = racing(&mut rng);
        let mut scheduler = PerturbationScheduler::new();
        scheduler.arm(&session, &mut rng);
        assert_eq!(scheduler.cancel_all(), RACER_COUNT);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.cancel_all(), 0);
    }
}
