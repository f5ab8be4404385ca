//! Race simulation module
//!
//! All race logic lives here. This module stays free of rendering and
//! platform calls:
//! - One tick per display frame, physics is per-frame (not dt-scaled)
//! - Randomness comes in through an explicit `Rng`
//! - Stable iteration order (by racer id) for ranking tie-breaks

pub mod factory;
pub mod perturb;
pub mod physics;
pub mod result;
pub mod roster;
pub mod state;
pub mod tick;

pub use factory::{generate_dust, random_velocity, spawn_racers};
pub use perturb::PerturbationScheduler;
pub use physics::{goal_radius, in_goal, step_racer};
pub use result::{Outcome, PenaltyNotifier, evaluate, report};
pub use roster::{ROSTER, RacerProfile, profile};
pub use state::{DustParticle, RacePhase, RaceSession, RacerState, SessionId, Viewport};
pub use tick::{RaceError, restart, start_race, tick, validate_difficulty};
