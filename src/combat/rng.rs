//! Fast PRNG for combat simulation. Uses SplitMix64 for throughput and good statistical quality.
//! Deterministic: same seed produces the same sequence. Not cryptographically secure.

use std::collections::VecDeque;

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

pub const D10_FACES: u8 = 10;

/// Source of uniform d10 outcomes. Threaded explicitly through hit generation and barrage.
pub trait Dice {
    /// Uniform integer in `1..=10`.
    fn roll_d10(&mut self) -> u8;
}

#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Independent generator for trial `index` of a run seeded with `base_seed`.
    /// Depends only on the pair, so trials can run in any order or on any worker.
    pub fn for_trial(base_seed: u64, index: u64) -> Self {
        let mut mixer = Self::new(base_seed ^ index.wrapping_mul(SPLITMIX64_M2));
        mixer.state = mixer.state.wrapping_add(index);
        Self::new(mixer.next_u64())
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX64_GOLDEN);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
        z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
        z ^ (z >> 31)
    }
}

impl Dice for Rng {
    #[inline]
    fn roll_d10(&mut self) -> u8 {
        // Multiply-shift maps the full 64-bit range onto 0..10.
        let face = ((u128::from(self.next_u64()) * u128::from(D10_FACES)) >> 64) as u8;
        face + 1
    }
}

/// Seed from OS entropy, for runs where no seed was requested.
pub fn entropy_seed() -> u64 {
    let mut bytes = [0u8; 8];
    match getrandom::getrandom(&mut bytes) {
        Ok(()) => u64::from_le_bytes(bytes),
        Err(err) => {
            tracing::warn!("entropy unavailable ({err}), falling back to clock seed");
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|elapsed| elapsed.as_nanos() as u64)
                .unwrap_or(SPLITMIX64_GOLDEN)
        }
    }
}

/// Replays a fixed list of faces, then repeats `fallback` once exhausted. For deterministic tests.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    faces: VecDeque<u8>,
    fallback: u8,
}

impl ScriptedDice {
    pub fn new(faces: impl IntoIterator<Item = u8>, fallback: u8) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            fallback,
        }
    }

    /// Every roll returns `face`.
    pub fn always(face: u8) -> Self {
        Self::new([], face)
    }

    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl Dice for ScriptedDice {
    fn roll_d10(&mut self) -> u8 {
        self.faces.pop_front().unwrap_or(self.fallback)
    }
}
