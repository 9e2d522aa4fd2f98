//! Deterministic, Domain-Partitioned RNG Service
//!
//! Uses the Xorshift128+ algorithm for fast, high-quality, deterministic
//! randomness. Given the same master seed, a [`SeedManager`] produces the
//! exact same per-domain streams on any platform. This is the crate's
//! primary replay guarantee.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GameError;

/// A logical partition of random consumption.
///
/// Distinct domains derive uncorrelated streams from one master seed, so
/// spending randomness in one domain (e.g. refill) never perturbs another
/// (e.g. an AI strategy's own rolls) even when both run against the same
/// master seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RandomDomain {
    /// Core gameplay randomness: board initialization (`GameState::new`)
    /// draws from this domain, as does anything else a front-end wants to
    /// roll reproducibly outside the `Refill`/`AI`/`Shuffle` domains.
    Main = 0,
    /// Tile refill / spawn selection.
    Refill = 1,
    /// AI/MCTS strategy randomness (distinct from `Main` so search branches
    /// can roll without perturbing the gameplay stream).
    AI = 2,
    /// Board shuffling when no moves remain.
    Shuffle = 3,
}

impl RandomDomain {
    const ALL: [RandomDomain; 4] = [
        RandomDomain::Main,
        RandomDomain::Refill,
        RandomDomain::AI,
        RandomDomain::Shuffle,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// SplitMix64, used both to expand a master seed into per-domain seeds and
/// to initialize a stream's internal state from a single `u64`.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derive a domain's seed from the master seed.
///
/// `mix(master_seed, domain_ordinal)` is an invertible bit-mix, so distinct
/// domains yield uncorrelated streams and reconstructing the manager from
/// the same master seed reproduces every stream bit-exactly.
fn derived_seed(master_seed: u64, domain_ordinal: u8) -> u64 {
    let mut state = master_seed ^ ((domain_ordinal as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    splitmix64(&mut state)
}

/// A single deterministic random stream (Xorshift128+).
///
/// # Determinism Guarantee
///
/// Given the same seed, this stream produces the exact same sequence of
/// random numbers on any platform.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RngStream {
    state: [u64; 2],
}

impl RngStream {
    /// Create a new stream from a 64-bit seed, expanded via SplitMix64 so
    /// weak seeds (e.g. 0, 1) still produce well-distributed state.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random `f32` in `[0, 1)`.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        // Top 24 bits give a value exactly representable as f32 in [0, 1).
        ((self.next_u64() >> 40) as f32) / (1u32 << 24) as f32
    }

    /// Generate a random integer in `[0, max)`. Returns 0 when `max == 0`.
    #[inline]
    pub fn next_u32(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        (self.next_u64() % max as u64) as u32
    }

    /// Generate a random integer in `[min, max]`.
    #[inline]
    pub fn next_i32(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        let range = (max - min + 1) as u32;
        min + self.next_u32(range) as i32
    }

    /// Shuffle a slice in place using Fisher-Yates.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        for i in (1..len).rev() {
            let j = self.next_u32((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Select a weighted index from `weights`, where `weights` sums to a
    /// positive total. Returns `None` if `weights` is empty or all-zero.
    pub fn weighted_index(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u32 = weights.iter().sum();
        if total == 0 {
            return None;
        }
        let mut roll = self.next_u32(total);
        for (i, &w) in weights.iter().enumerate() {
            if roll < w {
                return Some(i);
            }
            roll -= w;
        }
        weights.len().checked_sub(1)
    }

    /// Get the current internal state (for checkpointing).
    ///
    /// This folds the two 64-bit state words into one opaque value; callers
    /// needing exact restoration should use [`raw_state`]/[`set_raw_state`]
    /// instead.
    ///
    /// [`raw_state`]: RngStream::raw_state
    /// [`set_raw_state`]: RngStream::set_raw_state
    pub fn get_state(&self) -> u64 {
        self.state[0] ^ self.state[1].rotate_left(32)
    }

    /// Restore state from a value previously returned by [`get_state`].
    ///
    /// [`get_state`]: RngStream::get_state
    ///
    /// This is a lossy checkpoint (see its docs); a stream restored this way
    /// continues deterministically, but does not reproduce the exact
    /// `[u64; 2]` pair of the stream that produced the checkpoint.
    pub fn set_state(&mut self, state: u64) {
        if state == 0 {
            // The all-zero state is degenerate for this generator family;
            // refuse and keep the prior state rather than lock the stream
            // into producing a constant sequence.
            warn!("RngStream::set_state refused zero state, keeping prior state");
            return;
        }
        self.state = [state, state.rotate_left(32)];
    }

    /// Exact state pair, for callers that need bit-for-bit checkpointing.
    pub fn raw_state(&self) -> [u64; 2] {
        self.state
    }

    /// Restore from an exact state pair.
    pub fn set_raw_state(&mut self, state: [u64; 2]) {
        self.state = state;
    }

    /// Whether `state` is a usable Xorshift128+ state (the all-zero state
    /// is degenerate and produces a constant sequence forever).
    fn is_valid_raw_state(state: [u64; 2]) -> bool {
        state != [0, 0]
    }
}

/// Owns a master seed and one memoized [`RngStream`] per [`RandomDomain`].
///
/// Reconstructing a `SeedManager` from the same `(master_seed, overrides)`
/// reproduces every stream bit-exactly. This is what lets AI search clone
/// `GameState` (and therefore the manager) and branch independently.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedManager {
    master_seed: u64,
    streams: [RngStream; 4],
}

impl SeedManager {
    /// Create a manager from a master seed, deriving all domain streams.
    pub fn new(master_seed: u64) -> Self {
        let streams =
            RandomDomain::ALL.map(|domain| RngStream::new(derived_seed(master_seed, domain as u8)));
        Self {
            master_seed,
            streams,
        }
    }

    /// The master seed this manager was constructed from.
    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Borrow the stream for a domain (memoized, same instance every call).
    pub fn get(&mut self, domain: RandomDomain) -> &mut RngStream {
        &mut self.streams[domain.index()]
    }

    /// Replace a domain's stream with a fresh one seeded from `seed`.
    ///
    /// Determinism survives overrides: two managers built with the same
    /// `(master_seed, overrides)` pairs reproduce identical sequences.
    pub fn set_override(&mut self, domain: RandomDomain, seed: u64) {
        self.streams[domain.index()] = RngStream::new(seed);
    }

    /// Restore a domain's stream to an exact state pair from an untrusted
    /// source (e.g. a deserialized save), rejecting states that aren't
    /// valid for this generator instead of silently ignoring them.
    pub fn try_restore_state(&mut self, domain: RandomDomain, state: [u64; 2]) -> Result<(), GameError> {
        if !RngStream::is_valid_raw_state(state) {
            return Err(GameError::RngStateCorrupt { domain });
        }
        self.streams[domain.index()].set_raw_state(state);
        Ok(())
    }
}

impl PartialEq for SeedManager {
    fn eq(&self, other: &Self) -> bool {
        self.master_seed == other.master_seed && self.streams == other.streams
    }
}
