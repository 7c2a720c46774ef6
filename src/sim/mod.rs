//! Minigame simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time comes in as a host timestamp, never read from a clock
//! - Randomness comes from an owned, seedable generator
//! - No rendering, sensor or platform dependencies

pub mod bilge;
pub mod cargo;
pub mod collision;
pub mod field;
pub mod state;
pub mod torpedo;

pub use bilge::{BilgeSimulation, BilgeState};
pub use cargo::{CargoLoss, CargoSimulation, CargoState, Projectile};
pub use collision::{Rect, circle_rect_overlap, circles_collide};
pub use field::{Hazard, TorpedoField, generate_field};
pub use state::{GameStatus, entropy_rng, seeded_rng};
pub use torpedo::{TorpedoLoss, TorpedoSimulation, TorpedoState};

/// Contract shared by every minigame
///
/// A host calls `initialize` once the viewport is laid out, `step` once per
/// rendered frame until `status()` is terminal, and `reset` to play again.
pub trait Minigame {
    /// Per-frame input sample
    type Input;
    /// Immutable snapshot handed to the renderer
    type State: Clone;

    /// Start a round for the given viewport. No-op unless waiting for size
    /// or when either dimension is not positive.
    fn initialize(&mut self, width: f32, height: f32, now_ms: f64);

    /// Advance one frame and return the resulting snapshot
    fn step(&mut self, input: Self::Input, now_ms: f64) -> Self::State;

    /// Drop the round and go back to waiting for size
    fn reset(&mut self);

    fn state(&self) -> &Self::State;

    fn status(&self) -> GameStatus;
}
