//! Micro Derby - an eight-racer drift derby with a wagering front end
//!
//! Core modules:
//! - `sim`: Race simulation (roster, physics, perturbation timers, phases, outcome)
//! - `engine`: Cooperative frame driver that owns one live race session
//! - `renderer`: Frame tessellation and the WebGPU pipeline
//! - `notify`: Penalty notification transport
//! - `config`: Persisted engine preferences

pub mod config;
pub mod engine;
pub mod notify;
pub mod renderer;
pub mod sim;

pub use config::EngineConfig;
pub use engine::RaceEngine;

/// Race tuning constants
pub mod consts {
    /// Number of racers in every race
    pub const RACER_COUNT: usize = 8;

    /// Difficulty bounds (number of finishers that ends the race)
    pub const MIN_DIFFICULTY: u8 = 1;
    pub const MAX_DIFFICULTY: u8 = 8;
    pub const DEFAULT_DIFFICULTY: u8 = 4;

    /// Positions kept per racer for trail rendering
    pub const TAIL_LENGTH: usize = 20;

    /// Goal radius as a fraction of the larger viewport dimension
    pub const GOAL_RADIUS_FACTOR: f32 = 0.15;

    /// Per-frame pull toward the goal corner
    pub const ATTRACTION: f32 = 0.02;
    /// Full width of the per-axis uniform jitter, centered on zero
    pub const JITTER: f32 = 0.3;
    /// Per-frame velocity retention
    pub const DRAG: f32 = 0.998;
    /// Velocity retained (and inverted) on a wall bounce
    pub const RESTITUTION: f32 = 0.8;

    /// Spawn zone: left 10% of width, bottom 10% of height
    pub const SPAWN_WIDTH_FRACTION: f32 = 0.10;
    pub const SPAWN_TOP_FRACTION: f32 = 0.90;

    /// Spawn and perturbation velocity ranges
    pub const VX_MIN: f32 = 0.3;
    pub const VX_MAX: f32 = 0.8;
    pub const VY_MIN: f32 = -0.8;
    pub const VY_MAX: f32 = -0.3;

    /// Perturbation delay range in milliseconds, `[min, max)`
    pub const PERTURB_MIN_MS: f64 = 200.0;
    pub const PERTURB_MAX_MS: f64 = 600.0;

    /// Decorative dust particles per race
    pub const DUST_COUNT: usize = 80;
    /// Upper bound for a configured dust count
    pub const MAX_DUST_COUNT: usize = 2_000;
    pub const DUST_MAX_SIZE: f32 = 2.0;
    pub const DUST_MAX_OPACITY: f32 = 0.2;

    /// Frame interval assumed when the host has no timestamp yet (60 Hz)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest frame delta accepted from the host, to survive tab suspension
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Upper bound used by batch runs and tests
    pub const MAX_TICKS: u32 = 10_000;

    /// Default penalty endpoint
    pub const PENALTY_ENDPOINT: &str = "http://192.168.4.1/lose";
}
