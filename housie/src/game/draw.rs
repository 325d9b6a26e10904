//! Number calling.

use rand::Rng;

use super::{
    constants::MAX_NUMBER,
    entities::{CalledNumbers, Number},
};

/// Result of asking the engine for the next number.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DrawOutcome {
    Drawn(Number),
    /// Every number has been called; nothing changed.
    Exhausted,
}

/// Keeps the pool of uncalled numbers and calls them one at a time.
#[derive(Clone, Debug, Default)]
pub struct NumberDrawEngine {
    called: CalledNumbers,
}

impl NumberDrawEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls a number chosen uniformly from the ones not called yet.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> DrawOutcome {
        if self.called.is_exhausted() {
            return DrawOutcome::Exhausted;
        }

        loop {
            let candidate = rng.random_range(1..=MAX_NUMBER);
            if self.called.insert(candidate) {
                return DrawOutcome::Drawn(candidate);
            }
        }
    }

    #[must_use]
    pub fn called(&self) -> &CalledNumbers {
        &self.called
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.called.remaining()
    }
}
