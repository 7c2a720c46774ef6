//! Data-driven game balance
//!
//! Every knob has a default from [`crate::consts`]. Partial JSON documents are
//! accepted; missing fields keep their defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Bilge pump balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BilgeTuning {
    pub duration_secs: u32,
    pub start_level: f32,
    pub shake_threshold: f32,
    pub pump_cooldown_ms: f64,
    pub pump_effect: f32,
    pub base_rising_speed: f32,
    pub rising_ramp: f32,
}

impl Default for BilgeTuning {
    fn default() -> Self {
        Self {
            duration_secs: BILGE_DURATION_SECS,
            start_level: BILGE_START_LEVEL,
            shake_threshold: BILGE_SHAKE_THRESHOLD,
            pump_cooldown_ms: BILGE_PUMP_COOLDOWN_MS,
            pump_effect: BILGE_PUMP_EFFECT,
            base_rising_speed: BILGE_BASE_RISING_SPEED,
            rising_ramp: BILGE_RISING_RAMP,
        }
    }
}

/// Cargo hold balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CargoTuning {
    pub duration_secs: u32,
    pub hold_radius_factor: f32,
    pub cargo_radius: f32,
    pub tilt_sensitivity: f32,
    pub friction: f32,
    pub spawn_interval_ms: f64,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub collision_epsilon: f32,
    pub offscreen_margin: f32,
}

impl Default for CargoTuning {
    fn default() -> Self {
        Self {
            duration_secs: CARGO_DURATION_SECS,
            hold_radius_factor: CARGO_HOLD_RADIUS_FACTOR,
            cargo_radius: CARGO_RADIUS,
            tilt_sensitivity: CARGO_TILT_SENSITIVITY,
            friction: CARGO_FRICTION,
            spawn_interval_ms: CARGO_SPAWN_INTERVAL_MS,
            projectile_speed: CARGO_PROJECTILE_SPEED,
            projectile_radius: CARGO_PROJECTILE_RADIUS,
            collision_epsilon: CARGO_COLLISION_EPSILON,
            offscreen_margin: CARGO_OFFSCREEN_MARGIN,
        }
    }
}

/// Torpedo run balance and field layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorpedoTuning {
    pub torpedo_radius: f32,
    pub target_radius: f32,
    pub hazard_radius: f32,
    pub base_speed_y: f32,
    pub sensitivity_x: f32,
    pub regression_margin: f32,
    pub wall_thickness: f32,
    pub gap_width: f32,
    pub band_fractions: [f32; 2],
    pub oscillator_speed: f32,
    pub turbo_speed: f32,
    pub turbo_fractions: [f32; 2],
    pub random_hazards: usize,
    pub placement_attempts: u32,
    pub placement_safety: f32,
    pub start_inset: f32,
    pub target_inset: f32,
}

impl Default for TorpedoTuning {
    fn default() -> Self {
        Self {
            torpedo_radius: TORPEDO_RADIUS,
            target_radius: TORPEDO_TARGET_RADIUS,
            hazard_radius: TORPEDO_HAZARD_RADIUS,
            base_speed_y: TORPEDO_BASE_SPEED_Y,
            sensitivity_x: TORPEDO_SENSITIVITY_X,
            regression_margin: TORPEDO_REGRESSION_MARGIN,
            wall_thickness: TORPEDO_WALL_THICKNESS,
            gap_width: TORPEDO_GAP_WIDTH,
            band_fractions: TORPEDO_BAND_FRACTIONS,
            oscillator_speed: TORPEDO_OSCILLATOR_SPEED,
            turbo_speed: TORPEDO_TURBO_SPEED,
            turbo_fractions: TORPEDO_TURBO_FRACTIONS,
            random_hazards: TORPEDO_RANDOM_HAZARDS,
            placement_attempts: TORPEDO_PLACEMENT_ATTEMPTS,
            placement_safety: TORPEDO_PLACEMENT_SAFETY,
            start_inset: TORPEDO_START_INSET,
            target_inset: TORPEDO_TARGET_INSET,
        }
    }
}

/// Balance for all three minigames
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub bilge: BilgeTuning,
    pub cargo: CargoTuning,
    pub torpedo: TorpedoTuning,
}

impl Tuning {
    /// Parse a (possibly partial) JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp out-of-domain values back into range, logging each correction
    pub fn sanitized(mut self) -> Self {
        self.bilge = self.bilge.sanitized();
        self.cargo = self.cargo.sanitized();
        self.torpedo = self.torpedo.sanitized();
        self
    }
}

fn non_negative(name: &str, value: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        log::warn!("tuning: {} = {} is invalid, using 0", name, value);
        0.0
    }
}

fn at_least_one_second(name: &str, value: u32) -> u32 {
    if value == 0 {
        log::warn!("tuning: {} = 0, using 1", name);
        1
    } else {
        value
    }
}

impl BilgeTuning {
    pub fn sanitized(mut self) -> Self {
        self.duration_secs = at_least_one_second("bilge.duration_secs", self.duration_secs);
        if !(0.0..=1.0).contains(&self.start_level) {
            log::warn!("tuning: bilge.start_level = {} outside [0, 1]", self.start_level);
            self.start_level = self.start_level.clamp(0.0, 1.0);
        }
        self.shake_threshold = non_negative("bilge.shake_threshold", self.shake_threshold);
        self.pump_effect = non_negative("bilge.pump_effect", self.pump_effect);
        self.base_rising_speed = non_negative("bilge.base_rising_speed", self.base_rising_speed);
        self.rising_ramp = non_negative("bilge.rising_ramp", self.rising_ramp);
        if !(self.pump_cooldown_ms.is_finite() && self.pump_cooldown_ms >= 0.0) {
            log::warn!("tuning: bilge.pump_cooldown_ms = {} is invalid", self.pump_cooldown_ms);
            self.pump_cooldown_ms = BILGE_PUMP_COOLDOWN_MS;
        }
        self
    }
}

impl CargoTuning {
    pub fn sanitized(mut self) -> Self {
        self.duration_secs = at_least_one_second("cargo.duration_secs", self.duration_secs);
        self.hold_radius_factor = non_negative("cargo.hold_radius_factor", self.hold_radius_factor);
        self.cargo_radius = non_negative("cargo.cargo_radius", self.cargo_radius);
        self.tilt_sensitivity = non_negative("cargo.tilt_sensitivity", self.tilt_sensitivity);
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            log::warn!("tuning: cargo.friction = {} outside (0, 1]", self.friction);
            self.friction = CARGO_FRICTION;
        }
        if !(self.spawn_interval_ms.is_finite() && self.spawn_interval_ms > 0.0) {
            log::warn!("tuning: cargo.spawn_interval_ms = {} is invalid", self.spawn_interval_ms);
            self.spawn_interval_ms = CARGO_SPAWN_INTERVAL_MS;
        }
        self.projectile_speed = non_negative("cargo.projectile_speed", self.projectile_speed);
        self.projectile_radius = non_negative("cargo.projectile_radius", self.projectile_radius);
        self.collision_epsilon = non_negative("cargo.collision_epsilon", self.collision_epsilon);
        self.offscreen_margin = non_negative("cargo.offscreen_margin", self.offscreen_margin);
        self
    }
}

impl TorpedoTuning {
    pub fn sanitized(mut self) -> Self {
        self.torpedo_radius = non_negative("torpedo.torpedo_radius", self.torpedo_radius);
        self.target_radius = non_negative("torpedo.target_radius", self.target_radius);
        self.hazard_radius = non_negative("torpedo.hazard_radius", self.hazard_radius);
        self.base_speed_y = non_negative("torpedo.base_speed_y", self.base_speed_y);
        self.sensitivity_x = non_negative("torpedo.sensitivity_x", self.sensitivity_x);
        self.regression_margin = non_negative("torpedo.regression_margin", self.regression_margin);
        self.wall_thickness = non_negative("torpedo.wall_thickness", self.wall_thickness);
        self.gap_width = non_negative("torpedo.gap_width", self.gap_width);
        self.oscillator_speed = non_negative("torpedo.oscillator_speed", self.oscillator_speed);
        self.turbo_speed = non_negative("torpedo.turbo_speed", self.turbo_speed);
        self.placement_safety = non_negative("torpedo.placement_safety", self.placement_safety);
        for f in self.band_fractions.iter_mut().chain(self.turbo_fractions.iter_mut()) {
            if !(0.0..=1.0).contains(&*f) {
                log::warn!("tuning: torpedo height fraction {} outside [0, 1]", f);
                *f = f.clamp(0.0, 1.0);
            }
        }
        self
    }
}
