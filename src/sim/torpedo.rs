//! Torpedo run minigame
//!
//! The torpedo climbs at constant speed while the player steers it sideways
//! through the field built by [`super::field`]. Walls and hazards sink it,
//! touching the target wins, slipping past the target line loses.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::Minigame;
use super::collision::{Rect, circle_hits_any, circles_collide};
use super::field::{Hazard, TorpedoField, generate_field};
use super::state::{GameStatus, entropy_rng, seeded_rng, viewport_is_usable};
use crate::tuning::TorpedoTuning;

/// Why a torpedo run was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TorpedoLoss {
    Wall,
    Hazard,
    /// Passed the target line without touching the target
    Overshot,
}

/// Snapshot of a torpedo run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TorpedoState {
    pub torpedo_position: Vec2,
    /// Fixed at initialization
    pub target_position: Vec2,
    pub walls: Vec<Rect>,
    pub hazards: Vec<Hazard>,
    /// Seconds since the run started
    pub elapsed_time: f32,
    pub status: GameStatus,
    /// Set only when `status` is `Lost`
    pub loss: Option<TorpedoLoss>,
}

#[derive(Debug, Clone)]
pub struct TorpedoSimulation {
    tuning: TorpedoTuning,
    state: TorpedoState,
    viewport: Vec2,
    start_ms: f64,
    rng: Pcg32,
}

impl Default for TorpedoSimulation {
    fn default() -> Self {
        Self::new(TorpedoTuning::default())
    }
}

impl TorpedoSimulation {
    /// Simulation with an entropy-seeded generator
    pub fn new(tuning: TorpedoTuning) -> Self {
        Self::with_rng(tuning, entropy_rng())
    }

    /// Simulation with reproducible field layouts
    pub fn with_seed(tuning: TorpedoTuning, seed: u64) -> Self {
        Self::with_rng(tuning, seeded_rng(seed))
    }

    pub fn with_rng(tuning: TorpedoTuning, rng: Pcg32) -> Self {
        Self {
            tuning,
            state: TorpedoState::default(),
            viewport: Vec2::ZERO,
            start_ms: 0.0,
            rng,
        }
    }

    pub fn tuning(&self) -> &TorpedoTuning {
        &self.tuning
    }

    /// Start a run on a prepared field instead of a generated one.
    /// Same guards as [`Minigame::initialize`].
    pub fn initialize_with_field(
        &mut self,
        field: TorpedoField,
        width: f32,
        height: f32,
        now_ms: f64,
    ) {
        if self.state.status != GameStatus::WaitingForSize || !viewport_is_usable(width, height) {
            return;
        }
        self.viewport = Vec2::new(width, height);
        self.start_ms = now_ms;
        self.state = TorpedoState {
            torpedo_position: field.start,
            target_position: field.target,
            walls: field.walls,
            hazards: field.hazards,
            elapsed_time: 0.0,
            status: GameStatus::Running,
            loss: None,
        };
        log::info!(
            "Torpedo run started: {}x{}, {} walls, {} hazards",
            width,
            height,
            self.state.walls.len(),
            self.state.hazards.len()
        );
    }

    /// Patrol every moving hazard one step, bouncing off margins (and walls,
    /// unless turbo)
    fn move_hazards(&mut self) {
        let width = self.viewport.x;
        let walls = &self.state.walls;
        for hazard in self.state.hazards.iter_mut().filter(|h| h.moves()) {
            let min_x = hazard.radius;
            let max_x = (width - hazard.radius).max(min_x);
            let mut next_x = hazard.position.x + hazard.horizontal_speed;

            if next_x <= min_x {
                next_x = min_x;
                hazard.horizontal_speed = hazard.horizontal_speed.abs();
            } else if next_x >= max_x {
                next_x = max_x;
                hazard.horizontal_speed = -hazard.horizontal_speed.abs();
            }

            let next = Vec2::new(next_x, hazard.position.y);
            if !hazard.turbo && walls.iter().any(|w| w.contains_point(next)) {
                hazard.horizontal_speed = -hazard.horizontal_speed;
                log::debug!("Torpedo hazard bounced off a wall at x={:.0}", next_x);
                continue;
            }
            hazard.position = next;
        }
    }

    fn lose(&mut self, reason: TorpedoLoss) {
        self.state.status = GameStatus::Lost;
        self.state.loss = Some(reason);
        log::info!(
            "Torpedo lost: {:?} after {:.1}s",
            reason,
            self.state.elapsed_time
        );
    }

    fn advance(&mut self, tilt_x: f32, now_ms: f64) {
        let radius = self.tuning.torpedo_radius;
        let mut position = self.state.torpedo_position
            + Vec2::new(tilt_x * self.tuning.sensitivity_x, -self.tuning.base_speed_y);
        position.x = position.x.clamp(radius, (self.viewport.x - radius).max(radius));

        self.move_hazards();
        self.state.torpedo_position = position;
        self.state.elapsed_time = ((now_ms - self.start_ms).max(0.0) / 1000.0) as f32;

        let target = self.state.target_position;
        let target_radius = self.tuning.target_radius;

        if circle_hits_any(position, radius, &self.state.walls) {
            self.lose(TorpedoLoss::Wall);
        } else if self
            .state
            .hazards
            .iter()
            .any(|h| circles_collide(position, radius, h.position, h.radius))
        {
            self.lose(TorpedoLoss::Hazard);
        } else if circles_collide(position, radius, target, target_radius) {
            self.state.status = GameStatus::Won;
            log::info!("Torpedo won after {:.1}s", self.state.elapsed_time);
        } else if position.y < target.y - target_radius - self.tuning.regression_margin {
            self.lose(TorpedoLoss::Overshot);
        }
    }
}

impl Minigame for TorpedoSimulation {
    type Input = f32;
    type State = TorpedoState;

    fn initialize(&mut self, width: f32, height: f32, now_ms: f64) {
        if self.state.status != GameStatus::WaitingForSize || !viewport_is_usable(width, height) {
            return;
        }
        let field = generate_field(width, height, &self.tuning, &mut self.rng);
        self.initialize_with_field(field, width, height, now_ms);
    }

    fn step(&mut self, tilt_x: f32, now_ms: f64) -> TorpedoState {
        if self.state.status.is_running() {
            self.advance(tilt_x, now_ms);
        }
        self.state.clone()
    }

    fn reset(&mut self) {
        self.state = TorpedoState::default();
        self.viewport = Vec2::ZERO;
        self.start_ms = 0.0;
        log::info!("Torpedo reset");
    }

    fn state(&self) -> &TorpedoState {
        &self.state
    }

    fn status(&self) -> GameStatus {
        self.state.status
    }
}
