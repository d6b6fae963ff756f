//! Deterministic byte scrambler used for bomb placement and particle motion.
//!
//! Not a statistical RNG; the recurrence `state = (state*13 + 17) mod 269` is
//! a cheap scrambler whose whole point is reproducibility: the same seed
//! always yields the same bomb layout and particle velocities.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scrambler {
    state: i32,
}

impl Scrambler {
    pub const fn new(seed: i32) -> Self {
        Self { state: seed }
    }

    /// Advances the recurrence and returns the new state truncated to a byte.
    ///
    /// The state stays in `[0, 269)` after the first step. The recurrence has
    /// a single fixed point, so callers that loop until an output condition
    /// holds must bound their attempts.
    pub fn next_byte(&mut self) -> u8 {
        self.state = self.state.wrapping_mul(13).wrapping_add(17).rem_euclid(269);
        self.state as u8
    }

    /// A byte mapped onto `[0.0, 1.0]`.
    pub fn next_unit(&mut self) -> f32 {
        f32::from(self.next_byte()) / 255.0
    }
}
