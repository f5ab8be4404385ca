//! Race state and core simulation types

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Current phase of a race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    /// Waiting for a bet, racers parked in the spawn zone
    Setup,
    /// Racers are being simulated
    Racing,
    /// Enough racers reached the goal, outcome decided
    Finished,
}

/// Identity of one race session; perturbation timers are bound to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

impl SessionId {
    /// Allocate a process-unique session id
    pub fn next() -> Self {
        Self(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Drawing surface size in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Top-right corner, where the goal region is anchored
    #[inline]
    pub fn goal_corner(&self) -> Vec2 {
        Vec2::new(self.width, 0.0)
    }
}

/// Mutable state of one racer for the lifetime of one race
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RacerState {
    pub id: u8,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Recent positions, oldest first, at most `TAIL_LENGTH`
    pub tail: VecDeque<Vec2>,
    /// Once set, physics and perturbation never touch pos/vel again
    pub finished: bool,
    /// Position snapshot taken when the racer entered the goal
    pub final_pos: Vec2,
    /// Race clock (ms) at the moment the racer finished
    pub finish_ms: Option<f64>,
}

impl RacerState {
    pub fn new(id: u8, pos: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            pos,
            vel,
            tail: VecDeque::with_capacity(TAIL_LENGTH + 1),
            finished: false,
            final_pos: Vec2::ZERO,
            finish_ms: None,
        }
    }

    /// Append a position, evicting the oldest beyond `TAIL_LENGTH`
    pub fn record_tail(&mut self, pos: Vec2) {
        self.tail.push_back(pos);
        while self.tail.len() > TAIL_LENGTH {
            self.tail.pop_front();
        }
    }

    /// Freeze the racer at its current position
    pub fn finish(&mut self, elapsed_ms: f64) {
        self.finished = true;
        self.final_pos = self.pos;
        self.finish_ms = Some(elapsed_ms);
    }
}

/// Decorative background speck, generated once per race
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DustParticle {
    pub pos: Vec2,
    pub size: f32,
    pub opacity: f32,
}

/// One live race; replaced wholesale on start and restart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceSession {
    pub id: SessionId,
    pub phase: RacePhase,
    /// Racers ordered by id, always `RACER_COUNT` long
    pub racers: Vec<RacerState>,
    /// Racer ids in finishing order, append-only
    pub rankings: Vec<u8>,
    /// Picked racer; set when the race starts
    pub bet: Option<u8>,
    /// Finishers required to end the race, in `[MIN_DIFFICULTY, MAX_DIFFICULTY]`
    pub difficulty: u8,
    pub viewport: Viewport,
    /// Race clock in milliseconds, advanced by each tick
    pub elapsed_ms: f64,
    /// Frames simulated while racing
    pub ticks: u32,
}

impl RaceSession {
    /// Look up a racer by id
    pub fn racer(&self, id: u8) -> Option<&RacerState> {
        self.racers.iter().find(|r| r.id == id)
    }

    pub fn racer_mut(&mut self, id: u8) -> Option<&mut RacerState> {
        self.racers.iter_mut().find(|r| r.id == id)
    }

    /// Single authoritative phase accessor, shared by the tick path and timers
    #[inline]
    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    #[inline]
    pub fn is_racing(&self) -> bool {
        self.phase == RacePhase::Racing
    }

    /// Racers that have not reached the goal yet
    pub fn unfinished(&self) -> impl Iterator<Item = &RacerState> {
        self.racers.iter().filter(|r| !r.finished)
    }
}
