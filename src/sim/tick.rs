//! Race phase transitions and the per-frame tick
//!
//! SETUP -> RACING on a confirmed bet, RACING -> FINISHED once `difficulty`
//! racers have reached the goal, and restart always yields a fresh SETUP
//! session.

use rand::Rng;
use thiserror::Error;

use super::factory::spawn_racers;
use super::physics::step_racer;
use super::roster::profile;
use super::state::{RacePhase, RaceSession, RacerState, SessionId, Viewport};
use crate::consts::*;

/// Reasons a race cannot start
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RaceError {
    #[error("Invalid racer id: {0} (expected 1-{max})", max = RACER_COUNT)]
    InvalidBet(u8),

    #[error("Invalid difficulty: {0} (expected {min}-{max})", min = MIN_DIFFICULTY, max = MAX_DIFFICULTY)]
    InvalidDifficulty(u8),

    #[error("Race can only start from setup, current phase is {0:?}")]
    NotInSetup(RacePhase),
}

/// Check a difficulty against the allowed finisher counts
pub fn validate_difficulty(difficulty: u8) -> Result<u8, RaceError> {
    if (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        Ok(difficulty)
    } else {
        Err(RaceError::InvalidDifficulty(difficulty))
    }
}

/// Build a fresh SETUP session with racers parked in the spawn zone.
///
/// Out-of-range difficulty is clamped here; `start_race` is the strict gate.
pub fn restart<R: Rng + ?Sized>(viewport: Viewport, difficulty: u8, rng: &mut R) -> RaceSession {
    RaceSession {
        id: SessionId::next(),
        phase: RacePhase::Setup,
        racers: spawn_racers(viewport, rng),
        rankings: Vec::with_capacity(RACER_COUNT),
        bet: None,
        difficulty: difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY),
        viewport,
        elapsed_ms: 0.0,
        ticks: 0,
    }
}

/// Start a race on `bet`, returning a new session in RACING.
///
/// Nothing is created when the bet or difficulty is out of range.
pub fn start_race<R: Rng + ?Sized>(
    bet: u8,
    difficulty: u8,
    viewport: Viewport,
    rng: &mut R,
) -> Result<RaceSession, RaceError> {
    if profile(bet).is_none() {
        return Err(RaceError::InvalidBet(bet));
    }
    let difficulty = validate_difficulty(difficulty)?;

    let mut session = restart(viewport, difficulty, rng);
    session.phase = RacePhase::Racing;
    session.bet = Some(bet);

    log::info!(
        "Race {} started: bet on #{}, top {} qualify",
        session.id.get(),
        bet,
        difficulty
    );
    Ok(session)
}

/// Advance a racing session by one frame.
///
/// Every racer is stepped from the same pre-tick snapshot and the collection
/// is replaced in one go. Finishers are appended in racer order; the race
/// ends as soon as `difficulty` ids are ranked, so a same-frame finisher past
/// the cutoff stays unranked. Returns the ids ranked by this tick.
pub fn tick<R: Rng + ?Sized>(session: &mut RaceSession, dt_ms: f64, rng: &mut R) -> Vec<u8> {
    if !session.is_racing() {
        return Vec::new();
    }

    session.elapsed_ms += dt_ms;
    session.ticks += 1;

    let viewport = session.viewport;
    let elapsed_ms = session.elapsed_ms;
    let next: Vec<RacerState> = session
        .racers
        .iter()
        .map(|r| step_racer(r, viewport, elapsed_ms, rng))
        .collect();
    session.racers = next;

    let target = session.difficulty as usize;
    let mut newly_ranked = Vec::new();
    for racer in session.racers.iter().filter(|r| r.finished) {
        if session.rankings.len() >= target {
            break;
        }
        if !session.rankings.contains(&racer.id) {
            session.rankings.push(racer.id);
            newly_ranked.push(racer.id);
            log::debug!(
                "Racer #{} finished {} at {:.0} ms",
                racer.id,
                session.rankings.len(),
                elapsed_ms
            );
        }
    }

    if session.rankings.len() >= target {
        session.phase = RacePhase::Finished;
        log::info!(
            "Race {} finished after {} ticks: {:?}",
            session.id.get(),
            session.ticks,
            session.rankings
        );
    }

    newly_ranked
}
