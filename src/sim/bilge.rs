//! Bilge pump minigame
//!
//! Water rises every frame, faster as the clock runs down. Shaking the device
//! past a threshold pumps a fixed amount out, at most once per cooldown window.
//! Overflow loses the round; surviving the countdown wins it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::Minigame;
use super::state::GameStatus;
use crate::tuning::BilgeTuning;
use crate::{seconds_remaining, whole_seconds_between};

/// Snapshot of a bilge round
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BilgeState {
    /// Fill level, 0 = empty, 1 = overflowing
    pub water_level: f32,
    /// Whole seconds left on the countdown
    pub time_remaining: u32,
    pub status: GameStatus,
}

#[derive(Debug, Clone)]
pub struct BilgeSimulation {
    tuning: BilgeTuning,
    state: BilgeState,
    start_ms: f64,
    /// Timestamp of the last accepted pump stroke
    last_pump_ms: Option<f64>,
}

impl Default for BilgeSimulation {
    fn default() -> Self {
        Self::new(BilgeTuning::default())
    }
}

impl BilgeSimulation {
    pub fn new(tuning: BilgeTuning) -> Self {
        Self {
            tuning,
            state: BilgeState::default(),
            start_ms: 0.0,
            last_pump_ms: None,
        }
    }

    pub fn tuning(&self) -> &BilgeTuning {
        &self.tuning
    }

    /// Begin a fresh round at `now_ms`, regardless of current status
    pub fn start(&mut self, now_ms: f64) {
        self.state = BilgeState {
            water_level: self.tuning.start_level,
            time_remaining: self.tuning.duration_secs,
            status: GameStatus::Running,
        };
        self.start_ms = now_ms;
        self.last_pump_ms = None;
        log::info!(
            "Bilge round started: level {:.2}, {}s",
            self.state.water_level,
            self.state.time_remaining
        );
    }

    /// Rising speed for the given number of elapsed seconds
    fn rising_speed(&self, elapsed_secs: u32) -> f32 {
        let fraction = (elapsed_secs as f32 / self.tuning.duration_secs.max(1) as f32).min(1.0);
        self.tuning.base_rising_speed * (1.0 + self.tuning.rising_ramp * fraction)
    }

    /// Accept a pump stroke if the sample is a shake and the cooldown has passed
    fn try_pump(&mut self, acceleration: Vec3, now_ms: f64) -> f32 {
        if acceleration.length() <= self.tuning.shake_threshold {
            return 0.0;
        }
        let cooled = self
            .last_pump_ms
            .is_none_or(|last| now_ms - last >= self.tuning.pump_cooldown_ms);
        if !cooled {
            return 0.0;
        }
        self.last_pump_ms = Some(now_ms);
        log::debug!("Bilge pump stroke at {:.0}ms", now_ms - self.start_ms);
        self.tuning.pump_effect
    }

    fn advance(&mut self, acceleration: Vec3, now_ms: f64) {
        let elapsed = whole_seconds_between(self.start_ms, now_ms);
        let remaining = seconds_remaining(self.tuning.duration_secs, self.start_ms, now_ms);

        let pump = self.try_pump(acceleration, now_ms);
        let new_level = (self.state.water_level + self.rising_speed(elapsed) - pump).max(0.0);

        // Overflow beats time-out on the same frame
        if new_level >= 1.0 {
            self.state.water_level = 1.0;
            self.state.status = GameStatus::Lost;
            log::info!("Bilge lost: overflow after {}s", elapsed);
        } else if remaining == 0 {
            self.state.time_remaining = 0;
            self.state.status = GameStatus::Won;
            log::info!("Bilge won: level {:.2}", self.state.water_level);
        } else {
            self.state.water_level = new_level;
            self.state.time_remaining = remaining;
        }
    }
}

impl Minigame for BilgeSimulation {
    type Input = Vec3;
    type State = BilgeState;

    fn initialize(&mut self, width: f32, height: f32, now_ms: f64) {
        if self.state.status != GameStatus::WaitingForSize
            || !super::state::viewport_is_usable(width, height)
        {
            return;
        }
        self.start(now_ms);
    }

    fn step(&mut self, acceleration: Vec3, now_ms: f64) -> BilgeState {
        if self.state.status.is_running() {
            self.advance(acceleration, now_ms);
        }
        self.state.clone()
    }

    fn reset(&mut self) {
        self.state = BilgeState::default();
        self.start_ms = 0.0;
        self.last_pump_ms = None;
        log::info!("Bilge reset");
    }

    fn state(&self) -> &BilgeState {
        &self.state
    }

    fn status(&self) -> GameStatus {
        self.state.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const RESTING: Vec3 = Vec3::new(0.0, 0.0, 9.81);
    const SHAKE: Vec3 = Vec3::new(20.0, 5.0, 9.81);

    fn started() -> BilgeSimulation {
        let mut sim = BilgeSimulation::default();
        sim.initialize(400.0, 800.0, 0.0);
        sim
    }

    #[test]
    fn test_start_values() {
        let sim = started();
        assert_eq!(sim.status(), GameStatus::Running);
        assert!((sim.state().water_level - 0.4).abs() < 1e-6);
        assert_eq!(sim.state().time_remaining, 15);
    }

    #[test]
    fn test_initialize_guards() {
        let mut sim = BilgeSimulation::default();
        sim.initialize(0.0, 800.0, 0.0);
        assert_eq!(sim.status(), GameStatus::WaitingForSize);

        sim.initialize(400.0, 800.0, 0.0);
        sim.step(RESTING, 3000.0);
        let before = sim.state().clone();
        // Repeated layout callbacks must not restart the round
        sim.initialize(400.0, 800.0, 5000.0);
        assert_eq!(sim.state(), &before);
    }

    #[test]
    fn test_step_ignored_before_start() {
        let mut sim = BilgeSimulation::default();
        let snapshot = sim.step(SHAKE, 100.0);
        assert_eq!(snapshot, BilgeState::default());
    }

    #[test]
    fn test_water_rises_without_shaking() {
        let mut sim = started();
        let before = sim.state().water_level;
        sim.step(RESTING, FRAME_MS);
        assert!(sim.state().water_level > before);
    }

    #[test]
    fn test_rising_speed_ramps_up() {
        let sim = started();
        let early = sim.rising_speed(0);
        let late = sim.rising_speed(15);
        assert!((late / early - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_pump_cooldown() {
        let mut sim = started();
        sim.step(SHAKE, 0.0);
        let after_first = sim.state().water_level;
        assert!(after_first < 0.4);

        // Inside the cooldown: only the rise applies
        sim.step(SHAKE, 100.0);
        let after_second = sim.state().water_level;
        assert!(after_second > after_first);

        // Cooldown elapsed: pumps again
        sim.step(SHAKE, 230.0);
        assert!(sim.state().water_level < after_second);
    }

    #[test]
    fn test_level_never_negative() {
        let mut sim = started();
        for i in 0..20 {
            sim.step(SHAKE, i as f64 * 200.0);
        }
        assert_eq!(sim.state().water_level, 0.0);
        assert_eq!(sim.status(), GameStatus::Running);
    }

    #[test]
    fn test_overflow_scenario() {
        let mut sim = started();
        sim.state.water_level = 0.99;

        let mut now = 0.0;
        while sim.status() == GameStatus::Running && now < 5000.0 {
            now += FRAME_MS;
            sim.step(RESTING, now);
        }
        assert_eq!(sim.status(), GameStatus::Lost);
        assert_eq!(sim.state().water_level, 1.0);
        assert!(sim.state().time_remaining > 0);
    }

    #[test]
    fn test_survival_scenario() {
        let mut sim = started();
        let mut now = 0.0;
        while sim.status() == GameStatus::Running {
            sim.step(SHAKE, now);
            now += 130.0;
            assert!(now < 20_000.0, "round never ended");
        }
        assert_eq!(sim.status(), GameStatus::Won);
        assert_eq!(sim.state().time_remaining, 0);
    }

    #[test]
    fn test_overflow_beats_timeout() {
        let mut sim = started();
        sim.state.water_level = 0.9999;
        sim.step(RESTING, 15_000.0);
        assert_eq!(sim.status(), GameStatus::Lost);
    }

    #[test]
    fn test_no_change_after_terminal() {
        let mut sim = started();
        sim.state.water_level = 0.9999;
        sim.step(RESTING, FRAME_MS);
        assert_eq!(sim.status(), GameStatus::Lost);

        let frozen = sim.state().clone();
        for i in 0..10 {
            sim.step(SHAKE, 1000.0 + i as f64 * 500.0);
        }
        assert_eq!(sim.state(), &frozen);
    }

    #[test]
    fn test_reset_matches_fresh_instance() {
        let mut sim = started();
        sim.step(SHAKE, 500.0);
        sim.reset();
        assert_eq!(sim.state(), BilgeSimulation::default().state());

        // A reset instance can be initialized again
        sim.initialize(400.0, 800.0, 10_000.0);
        assert_eq!(sim.status(), GameStatus::Running);
    }

    proptest! {
        #[test]
        fn water_level_stays_in_bounds(
            samples in prop::collection::vec((0.0f32..40.0, 1.0f64..200.0), 1..400)
        ) {
            let mut sim = started();
            let mut now = 0.0;
            for (magnitude, dt) in samples {
                now += dt;
                let state = sim.step(Vec3::new(magnitude, 0.0, 0.0), now);
                prop_assert!((0.0..=1.0).contains(&state.water_level));
                prop_assert!(state.time_remaining <= 15);
            }
        }
    }
}
