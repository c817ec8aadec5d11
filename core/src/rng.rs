//! Deterministic random number generation.
//!
//! RULE: Nothing in the generator may call any platform RNG.
//! All randomness flows through one DatasetRng seeded from the run
//! seed, and it is consumed in a fixed sequential order. Reordering
//! draws changes every byte of output after the reordered draw.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// The single seeded random stream for one generator run.
pub struct DatasetRng {
    seed: u64,
    inner: Pcg64Mcg,
}

impl DatasetRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an integer in [lo, hi], both ends inclusive.
    pub fn range_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo <= hi, "empty range {lo}..={hi}");
        let span = (hi - lo) as u64 + 1;
        lo + self.next_u64_below(span) as i64
    }

    /// Pick an index into a slice of length `len`.
    pub fn pick_index(&mut self, len: usize) -> usize {
        self.next_u64_below(len as u64) as usize
    }

    /// A string of `len` characters drawn from `[a-z0-9]`.
    pub fn alphanumeric(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| ALPHANUMERIC[self.pick_index(ALPHANUMERIC.len())] as char)
            .collect()
    }
}
