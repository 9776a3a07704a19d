//! Run configuration: defaults, then `FLEETSIM_*` environment overrides, then CLI flags.

use std::env;

use crate::combat::rng::entropy_seed;

pub const DEFAULT_TRIALS: usize = 10_000;

pub const TRIALS_ENV: &str = "FLEETSIM_TRIALS";
pub const SEED_ENV: &str = "FLEETSIM_SEED";
pub const WORKERS_ENV: &str = "FLEETSIM_WORKERS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub trials: usize,
    /// `None` draws a fresh seed from OS entropy at run time.
    pub seed: Option<u64>,
    /// Worker threads for parallel runs. 0 uses the global rayon pool.
    pub workers: usize,
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: None,
            workers: 0,
            parallel: true,
        }
    }
}

impl SimulationConfig {
    pub fn from_env() -> Self {
        Self::default().with_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from a key lookup. Unparseable values are logged and ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(trials) = parse_override::<usize, _>(&lookup, TRIALS_ENV) {
            self.trials = trials;
        }
        if let Some(seed) = parse_override::<u64, _>(&lookup, SEED_ENV) {
            self.seed = Some(seed);
        }
        if let Some(workers) = parse_override::<usize, _>(&lookup, WORKERS_ENV) {
            self.workers = workers;
        }
        self
    }

    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(entropy_seed)
    }
}

fn parse_override<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring invalid configuration value");
            None
        }
    }
}
