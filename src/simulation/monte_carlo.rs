use rayon::prelude::*;
use serde::Serialize;

use crate::combat::engine::{Battle, BattleOutcome, TraceMode};
use crate::combat::rng::Rng;
use crate::data::fleet::Fleet;
use crate::error::Result;
use crate::parallel::{batch_ranges, WorkerPool};
use crate::simulation::config::SimulationConfig;

/// Batches per rayon thread; more than one keeps workers busy when battle lengths vary.
const BATCHES_PER_THREAD: usize = 4;

/// Terminal counters for a range of trials. Partial tallies from workers are merged at the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimulationTally {
    pub side1_wins: usize,
    pub side2_wins: usize,
    pub draws: usize,
    pub total_rounds: u64,
}

impl SimulationTally {
    pub fn record(&mut self, outcome: BattleOutcome, rounds: u32) {
        match outcome {
            BattleOutcome::Side1Wins => self.side1_wins += 1,
            BattleOutcome::Side2Wins => self.side2_wins += 1,
            BattleOutcome::Draw => self.draws += 1,
        }
        self.total_rounds += u64::from(rounds);
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            side1_wins: self.side1_wins + other.side1_wins,
            side2_wins: self.side2_wins + other.side2_wins,
            draws: self.draws + other.draws,
            total_rounds: self.total_rounds + other.total_rounds,
        }
    }

    pub fn trials(&self) -> usize {
        self.side1_wins + self.side2_wins + self.draws
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub trials: usize,
    pub seed: u64,
    pub side1_wins: usize,
    pub side2_wins: usize,
    pub draws: usize,
    /// Pre-battle cost of each template, computed once per run.
    pub side1_cost: f64,
    pub side2_cost: f64,
    pub average_rounds: f64,
}

impl SimulationResult {
    fn from_tally(tally: SimulationTally, seed: u64, side1: &Fleet, side2: &Fleet) -> Self {
        let trials = tally.trials();
        let average_rounds = if trials == 0 {
            0.0
        } else {
            tally.total_rounds as f64 / trials as f64
        };
        Self {
            trials,
            seed,
            side1_wins: tally.side1_wins,
            side2_wins: tally.side2_wins,
            draws: tally.draws,
            side1_cost: side1.total_cost(),
            side2_cost: side2.total_cost(),
            average_rounds,
        }
    }
}

/// Run trials `start..end`. Trial `i` always uses the generator derived from `(seed, i)`.
pub fn run_trial_range(side1: &Fleet, side2: &Fleet, seed: u64, start: usize, end: usize) -> SimulationTally {
    let mut tally = SimulationTally::default();
    for trial in start..end {
        let mut rng = Rng::for_trial(seed, trial as u64);
        let result = Battle::from_templates(side1, side2, TraceMode::Off).run(&mut rng);
        tally.record(result.outcome, result.rounds);
    }
    tally
}

pub fn run_simulation(side1: &Fleet, side2: &Fleet, trials: usize, seed: u64) -> SimulationResult {
    run_simulation_with_parallelism(side1, side2, trials, seed, false)
}

/// Like [run_simulation] but spreads trial ranges across the current rayon pool.
/// Tallies are identical to the sequential run for the same seed.
pub fn run_simulation_parallel(side1: &Fleet, side2: &Fleet, trials: usize, seed: u64) -> SimulationResult {
    run_simulation_with_parallelism(side1, side2, trials, seed, true)
}

fn run_simulation_with_parallelism(
    side1: &Fleet,
    side2: &Fleet,
    trials: usize,
    seed: u64,
    parallel: bool,
) -> SimulationResult {
    let tally = if parallel {
        let batches = rayon::current_num_threads().max(1) * BATCHES_PER_THREAD;
        batch_ranges(trials, batches)
            .into_par_iter()
            .map(|(start, end)| {
                let partial = run_trial_range(side1, side2, seed, start, end);
                tracing::debug!(start, end, ?partial, "trial batch finished");
                partial
            })
            .reduce(SimulationTally::default, SimulationTally::merge)
    } else {
        run_trial_range(side1, side2, seed, 0, trials)
    };
    SimulationResult::from_tally(tally, seed, side1, side2)
}

/// Entry point used by the CLI: resolves the seed and worker pool from `config`.
pub fn run_with_config(side1: &Fleet, side2: &Fleet, config: &SimulationConfig) -> Result<SimulationResult> {
    let seed = config.resolve_seed();
    tracing::info!(
        trials = config.trials,
        seed,
        parallel = config.parallel,
        workers = config.workers,
        "starting simulation"
    );
    let result = if config.parallel {
        WorkerPool::with_workers(config.workers)
            .install(|| run_simulation_parallel(side1, side2, config.trials, seed))?
    } else {
        run_simulation(side1, side2, config.trials, seed)
    };
    tracing::info!(
        side1_wins = result.side1_wins,
        side2_wins = result.side2_wins,
        draws = result.draws,
        "simulation finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fleet::Unit;
    use crate::data::unit::UnitKind;

    #[test]
    fn tally_merge_sums_fields() {
        let mut a = SimulationTally::default();
        a.record(BattleOutcome::Side1Wins, 3);
        let mut b = SimulationTally::default();
        b.record(BattleOutcome::Draw, 1);
        b.record(BattleOutcome::Side2Wins, 2);
        let merged = a.merge(b);
        assert_eq!(merged.trials(), 3);
        assert_eq!(merged.total_rounds, 6);
    }

    #[test]
    fn zero_trials_is_empty_result() {
        let fleet = Fleet::new(vec![Unit::new(UnitKind::Fighter)]);
        let result = run_simulation(&fleet, &fleet, 0, 1);
        assert_eq!(result.trials, 0);
        assert_eq!(result.average_rounds, 0.0);
        assert!((result.side1_cost - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_side_always_loses() {
        let fleet = Fleet::new(vec![Unit::new(UnitKind::Carrier)]);
        let result = run_simulation(&fleet, &Fleet::empty(), 50, 9);
        assert_eq!(result.side1_wins, 50);
        assert_eq!(result.average_rounds, 1.0);
    }
}
