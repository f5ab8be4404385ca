//! Race engine: the single cooperative driver for one live session
//!
//! The host calls `frame(dt_ms)` once per display refresh. A frame first
//! lets due perturbation timers fire, then ticks the race, then decides the
//! outcome if the race just ended. Rendering is a separate read-only call,
//! so simulation and drawing never interleave within a frame.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::consts::*;
use crate::renderer::{FrameOptions, Vertex, build_frame};
use crate::sim::{
    DustParticle, Outcome, PenaltyNotifier, PerturbationScheduler, RaceError, RacePhase,
    RaceSession, RacerProfile, Viewport, generate_dust, profile, report, restart, start_race, tick,
    validate_difficulty,
};

/// One line of the results list
#[derive(Debug, Clone, Serialize)]
pub struct RankedRacer {
    /// 1-based finishing position
    pub rank: usize,
    pub profile: RacerProfile,
    pub finish_ms: Option<f64>,
    /// Whether this is the user's pick
    pub is_pick: bool,
}

/// Outline drawn around an unfinished racer while racing
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Highlight {
    pub id: u8,
    pub pos: Vec2,
    pub css: &'static str,
}

/// Owns the live session, its dust, the RNG, the perturbation timers and
/// the penalty notifier.
pub struct RaceEngine<N: PenaltyNotifier> {
    config: EngineConfig,
    /// Latest surface size; the next SETUP and race use it
    viewport: Viewport,
    session: RaceSession,
    dust: Vec<DustParticle>,
    scheduler: PerturbationScheduler,
    rng: Pcg32,
    notifier: N,
    outcome: Option<Outcome>,
}

impl<N: PenaltyNotifier> RaceEngine<N> {
    /// Create an engine sitting in SETUP
    pub fn new(config: EngineConfig, viewport: Viewport, notifier: N, seed: u64) -> Self {
        let config = config.sanitized();
        let mut rng = Pcg32::seed_from_u64(seed);
        let session = restart(viewport, config.difficulty, &mut rng);
        let dust = generate_dust(viewport, config.dust_count, &mut rng);
        log::info!(
            "Engine ready: {}x{} viewport, seed {}",
            viewport.width,
            viewport.height,
            seed
        );
        Self {
            config,
            viewport,
            session,
            dust,
            scheduler: PerturbationScheduler::new(),
            rng,
            notifier,
            outcome: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session(&self) -> &RaceSession {
        &self.session
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn phase(&self) -> RacePhase {
        self.session.phase()
    }

    pub fn dust(&self) -> &[DustParticle] {
        &self.dust
    }

    pub fn scheduler(&self) -> &PerturbationScheduler {
        &self.scheduler
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Outcome of the current race, once FINISHED
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn status_text(&self) -> Option<String> {
        self.outcome.map(|o| o.status_text())
    }

    pub fn difficulty(&self) -> u8 {
        self.session.difficulty
    }

    /// Change the finisher count; only allowed in SETUP
    pub fn set_difficulty(&mut self, difficulty: u8) -> Result<(), RaceError> {
        if self.phase() != RacePhase::Setup {
            return Err(RaceError::NotInSetup(self.phase()));
        }
        let difficulty = validate_difficulty(difficulty)?;
        self.config.difficulty = difficulty;
        self.session.difficulty = difficulty;
        log::info!("Difficulty set to top {}", difficulty);
        Ok(())
    }

    /// Track a new surface size; racers and dust are re-seeded in SETUP only.
    ///
    /// A live or finished race keeps its own viewport; the new size takes
    /// effect at the next restart.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if self.phase() != RacePhase::Setup {
            log::debug!("Deferring resize during {:?}", self.phase());
            return;
        }
        self.session = restart(viewport, self.config.difficulty, &mut self.rng);
        self.dust = generate_dust(viewport, self.config.dust_count, &mut self.rng);
        log::debug!("Re-seeded setup for {}x{}", viewport.width, viewport.height);
    }

    /// Place the bet and start racing.
    ///
    /// On error the current SETUP session is left untouched.
    pub fn start_race(&mut self, bet: u8) -> Result<&RaceSession, RaceError> {
        if self.phase() != RacePhase::Setup {
            return Err(RaceError::NotInSetup(self.phase()));
        }
        let session = start_race(bet, self.config.difficulty, self.viewport, &mut self.rng)
            .inspect_err(|e| log::warn!("Rejected race start: {}", e))?;

        self.scheduler.cancel_all();
        self.dust = generate_dust(session.viewport, self.config.dust_count, &mut self.rng);
        self.session = session;
        self.outcome = None;
        self.scheduler.arm(&self.session, &mut self.rng);
        Ok(&self.session)
    }

    /// Run one display frame. Returns the outcome on the frame the race ends.
    pub fn frame(&mut self, dt_ms: f64) -> Option<Outcome> {
        if !self.session.is_racing() {
            return None;
        }
        let dt_ms = dt_ms.clamp(0.0, MAX_FRAME_MS);

        self.scheduler.advance(dt_ms, &mut self.session, &mut self.rng);
        tick(&mut self.session, dt_ms, &mut self.rng);

        if self.session.phase() != RacePhase::Finished || self.outcome.is_some() {
            return None;
        }

        self.scheduler.cancel_all();
        let bet = self.session.bet?;
        let outcome = report(&self.session.rankings, bet, &self.notifier);
        self.outcome = Some(outcome);
        Some(outcome)
    }

    /// Triangles for the current state; never mutates the session
    pub fn render(&self) -> Vec<Vertex> {
        build_frame(
            &self.session,
            &self.dust,
            FrameOptions {
                trails: self.config.trails,
            },
        )
    }

    /// Discard the current race and return to a fresh SETUP session
    pub fn restart(&mut self) {
        self.scheduler.cancel_all();
        self.session = restart(self.viewport, self.config.difficulty, &mut self.rng);
        self.dust = generate_dust(self.viewport, self.config.dust_count, &mut self.rng);
        self.outcome = None;
        log::info!("Back to setup");
    }

    /// Cancel every outstanding perturbation timer
    pub fn teardown(&mut self) {
        self.scheduler.cancel_all();
    }

    /// Ranked finishers with their profiles, for the results list
    pub fn results(&self) -> Vec<RankedRacer> {
        self.session
            .rankings
            .iter()
            .enumerate()
            .filter_map(|(i, &id)| {
                let profile = *profile(id)?;
                Some(RankedRacer {
                    rank: i + 1,
                    profile,
                    finish_ms: self.session.racer(id).and_then(|r| r.finish_ms),
                    is_pick: self.session.bet == Some(id),
                })
            })
            .collect()
    }

    /// Outlines for unfinished racers, only while racing
    pub fn highlights(&self) -> Vec<Highlight> {
        if !self.session.is_racing() {
            return Vec::new();
        }
        self.session
            .unfinished()
            .filter_map(|r| {
                profile(r.id).map(|p| Highlight {
                    id: r.id,
                    pos: r.pos,
                    css: p.css,
                })
            })
            .collect()
    }
}

impl<N: PenaltyNotifier> Drop for RaceEngine<N> {
    fn drop(&mut self) {
        self.teardown();
    }
}
