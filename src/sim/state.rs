//! Shared lifecycle and RNG types
//!
//! Every minigame walks the same lifecycle and owns its own generator.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Lifecycle of a single minigame round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// Created or reset; waiting for a usable viewport
    #[default]
    WaitingForSize,
    /// Round in progress, `step` mutates state
    Running,
    /// Player survived or reached the target
    Won,
    /// Run ended in failure
    Lost,
}

impl GameStatus {
    /// True once the round has been decided (Won or Lost)
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Won | GameStatus::Lost)
    }

    #[inline]
    pub fn is_running(self) -> bool {
        self == GameStatus::Running
    }
}

/// Generator seeded from OS entropy, for production rounds
pub fn entropy_rng() -> Pcg32 {
    Pcg32::from_rng(&mut rand::rng())
}

/// Generator with a fixed seed, for tests and replays
pub fn seeded_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Viewport guard shared by every `initialize`
#[inline]
pub(crate) fn viewport_is_usable(width: f32, height: f32) -> bool {
    width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_terminal_statuses() {
        assert!(!GameStatus::WaitingForSize.is_terminal());
        assert!(!GameStatus::Running.is_terminal());
        assert!(GameStatus::Won.is_terminal());
        assert!(GameStatus::Lost.is_terminal());
    }

    #[test]
    fn test_default_is_waiting() {
        assert_eq!(GameStatus::default(), GameStatus::WaitingForSize);
    }

    #[test]
    fn test_seeded_rng_repeats() {
        let mut a = seeded_rng(7);
        let mut b = seeded_rng(7);
        for _ in 0..16 {
            assert_eq!(a.random::<u32>(), b.random::<u32>());
        }
    }

    #[test]
    fn test_viewport_guard() {
        assert!(viewport_is_usable(320.0, 480.0));
        assert!(!viewport_is_usable(0.0, 480.0));
        assert!(!viewport_is_usable(320.0, -1.0));
        assert!(!viewport_is_usable(f32::NAN, 480.0));
    }
}
