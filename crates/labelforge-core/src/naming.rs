//! Collision-free short names for uploaded assets
//!
//! Names have the shape `{prefix}-{5 lowercase letters}`. Allocation is a
//! synchronous step: callers allocate every name of a batch up front, before
//! any concurrent upload is dispatched, and thread a growing exclusion set
//! through the calls.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Number of random letters appended to the prefix
pub const SUFFIX_LEN: usize = 5;

/// Random name generator
#[derive(Debug, Clone)]
pub struct NameAllocator {
    rng: StdRng,
}

impl NameAllocator {
    /// Create an allocator seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a deterministic allocator
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a name absent from `existing`
    ///
    /// Only complete generated names are compared; a bare `prefix` in the
    /// set has no effect.
    pub fn generate(&mut self, existing: &HashSet<String>, prefix: &str) -> String {
        loop {
            let candidate = format!("{}-{}", prefix, self.random_suffix());
            if !existing.contains(&candidate) {
                return candidate;
            }
        }
    }

    /// Generate a name and record it in `existing`
    pub fn allocate(&mut self, existing: &mut HashSet<String>, prefix: &str) -> String {
        let name = self.generate(existing, prefix);
        existing.insert(name.clone());
        name
    }

    fn random_suffix(&mut self) -> String {
        (0..SUFFIX_LEN)
            .map(|_| self.rng.gen_range(b'a'..=b'z') as char)
            .collect()
    }
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self::new()
    }
}
