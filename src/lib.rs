//! Helm minigames - real-time arcade side challenges
//!
//! Core modules:
//! - `sim`: Frame-driven simulations (bilge pump, cargo hold, torpedo run)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, sensor plumbing and persistence live in the host. The host feeds
//! viewport geometry, sampled input and a frame timestamp, and reads back the
//! state snapshot after every call.

pub mod sim;
pub mod tuning;

pub use sim::{
    BilgeSimulation, BilgeState, CargoLoss, CargoSimulation, CargoState, GameStatus, Minigame,
    TorpedoLoss, TorpedoSimulation, TorpedoState,
};
pub use tuning::Tuning;

/// Default balance constants
pub mod consts {
    /// Bilge pump: round length (seconds)
    pub const BILGE_DURATION_SECS: u32 = 15;
    /// Water level at the start of a round
    pub const BILGE_START_LEVEL: f32 = 0.4;
    /// Acceleration magnitude that counts as a shake (m/s², gravity alone is ~9.81)
    pub const BILGE_SHAKE_THRESHOLD: f32 = 15.0;
    /// Minimum time between two accepted pump strokes (ms)
    pub const BILGE_PUMP_COOLDOWN_MS: f64 = 130.0;
    /// Water removed by one pump stroke
    pub const BILGE_PUMP_EFFECT: f32 = 0.04;
    /// Water added per step at the start of the round
    pub const BILGE_BASE_RISING_SPEED: f32 = 0.0012;
    /// Extra rising speed at the end of the round, as a multiple of the base
    pub const BILGE_RISING_RAMP: f32 = 1.5;

    /// Cargo hold: round length (seconds)
    pub const CARGO_DURATION_SECS: u32 = 15;
    /// Hold radius as a fraction of viewport width
    pub const CARGO_HOLD_RADIUS_FACTOR: f32 = 0.45;
    pub const CARGO_RADIUS: f32 = 38.0;
    pub const CARGO_TILT_SENSITIVITY: f32 = 0.5;
    /// Per-step velocity multiplier (< 1 gives the drift feel)
    pub const CARGO_FRICTION: f32 = 0.95;
    pub const CARGO_SPAWN_INTERVAL_MS: f64 = 2000.0;
    /// Projectile speed (px per step)
    pub const CARGO_PROJECTILE_SPEED: f32 = 6.0;
    pub const CARGO_PROJECTILE_RADIUS: f32 = 18.0;
    /// Overlap forgiven before a projectile counts as a hit
    pub const CARGO_COLLISION_EPSILON: f32 = 4.0;
    /// Projectiles this far outside the viewport are culled
    pub const CARGO_OFFSCREEN_MARGIN: f32 = 200.0;

    /// Torpedo run: entity radii
    pub const TORPEDO_RADIUS: f32 = 18.0;
    pub const TORPEDO_TARGET_RADIUS: f32 = 36.0;
    pub const TORPEDO_HAZARD_RADIUS: f32 = 22.0;
    /// Upward drift (px per step)
    pub const TORPEDO_BASE_SPEED_Y: f32 = 2.5;
    pub const TORPEDO_SENSITIVITY_X: f32 = 3.0;
    /// Distance past the target line that counts as overshooting
    pub const TORPEDO_REGRESSION_MARGIN: f32 = 20.0;
    pub const TORPEDO_WALL_THICKNESS: f32 = 28.0;
    pub const TORPEDO_GAP_WIDTH: f32 = 110.0;
    /// Top edges of the two wall bands, as fractions of viewport height
    pub const TORPEDO_BAND_FRACTIONS: [f32; 2] = [0.62, 0.38];
    pub const TORPEDO_OSCILLATOR_SPEED: f32 = 2.0;
    pub const TORPEDO_TURBO_SPEED: f32 = 5.0;
    /// Turbo hazards start at these fractions of viewport height
    pub const TORPEDO_TURBO_FRACTIONS: [f32; 2] = [0.20, 0.28];
    /// Rejection-sampled hazards
    pub const TORPEDO_RANDOM_HAZARDS: usize = 2;
    pub const TORPEDO_PLACEMENT_ATTEMPTS: u32 = 60;
    pub const TORPEDO_PLACEMENT_SAFETY: f32 = 24.0;
    /// Start sits this far above the bottom edge, target this far below the top
    pub const TORPEDO_START_INSET: f32 = 80.0;
    pub const TORPEDO_TARGET_INSET: f32 = 70.0;
}

/// Whole seconds elapsed between two millisecond timestamps (never negative)
#[inline]
pub fn whole_seconds_between(start_ms: f64, now_ms: f64) -> u32 {
    ((now_ms - start_ms).max(0.0) / 1000.0).floor() as u32
}

/// Seconds left on a countdown, saturating at zero
#[inline]
pub fn seconds_remaining(duration_secs: u32, start_ms: f64, now_ms: f64) -> u32 {
    duration_secs.saturating_sub(whole_seconds_between(start_ms, now_ms))
}
