//! Outcome generator

use rand::prelude::*;

use crate::symbols::{ALPHABET_SIZE, REEL_COUNT, SpinOutcome, Symbol};

/// Uniform, independent symbol draws. Entertainment-grade randomness only.
#[derive(Debug, Clone)]
pub struct OutcomeGenerator {
    rng: StdRng,
}

impl OutcomeGenerator {
    /// Generator seeded from the OS
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Symbol index in `[0, ALPHABET_SIZE)`
    pub fn next_index(&mut self) -> usize {
        self.rng.random_range(0..ALPHABET_SIZE)
    }

    /// One uniformly drawn symbol
    pub fn next_symbol(&mut self) -> Symbol {
        Symbol::ALL[self.next_index()]
    }

    /// One independent draw per reel
    pub fn generate_spin_outcome(&mut self) -> SpinOutcome {
        let symbols: [Symbol; REEL_COUNT] = std::array::from_fn(|_| self.next_symbol());
        SpinOutcome::new(symbols)
    }
}

impl Default for OutcomeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
