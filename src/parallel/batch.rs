//! Batch distribution for parallel simulation.
//!
//! Splits trials into contiguous ranges; each range runs on one worker and produces a
//! partial tally, so no counters are shared between threads.

use crate::data::fleet::Fleet;
use crate::error::Result;
use crate::parallel::pool::WorkerPool;
use crate::simulation::monte_carlo::{run_trial_range, SimulationTally};

/// Split `total` items into up to `num_batches` ranges `[start, end)`.
/// Batches are as equal in size as possible; later batches may be smaller.
///
/// # Example
/// ```
/// # use fleetsim::parallel::batch_ranges;
/// let ranges = batch_ranges(100, 4);
/// assert_eq!(ranges, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut ranges = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let size = base + if i < remainder { 1 } else { 0 };
        let end = start + size;
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Run `trials` split into `num_batches` ranges on `pool`, returning one tally per batch in order.
/// Useful for progress reporting; merging the tallies gives the same totals as a single run.
pub fn run_simulation_batches(
    side1: &Fleet,
    side2: &Fleet,
    trials: usize,
    seed: u64,
    num_batches: usize,
    pool: &WorkerPool,
) -> Result<Vec<SimulationTally>> {
    use rayon::prelude::*;

    let ranges = batch_ranges(trials, num_batches);
    pool.install(|| {
        ranges
            .par_iter()
            .map(|&(start, end)| run_trial_range(side1, side2, seed, start, end))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fleet::Unit;
    use crate::data::unit::UnitKind;

    #[test]
    fn batch_ranges_even_split() {
        let r = batch_ranges(100, 4);
        assert_eq!(r, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
    }

    #[test]
    fn batch_ranges_with_remainder() {
        let r = batch_ranges(10, 3);
        assert_eq!(r, vec![(0, 4), (4, 7), (7, 10)]);
    }

    #[test]
    fn batch_ranges_more_batches_than_items() {
        let r = batch_ranges(3, 10);
        assert_eq!(r.len(), 3);
        assert_eq!(r, vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn batch_ranges_empty() {
        assert!(batch_ranges(0, 5).is_empty());
        assert!(batch_ranges(10, 0).is_empty());
    }

    #[test]
    fn batched_tallies_cover_every_trial() {
        let side1 = Fleet::new(vec![Unit::new(UnitKind::Dreadnought)]);
        let side2 = Fleet::new(vec![Unit::new(UnitKind::Carrier), Unit::new(UnitKind::Fighter)]);
        let tallies =
            run_simulation_batches(&side1, &side2, 103, 8, 5, &WorkerPool::with_workers(2)).unwrap();
        assert_eq!(tallies.len(), 5);
        let merged = tallies
            .into_iter()
            .fold(SimulationTally::default(), SimulationTally::merge);
        assert_eq!(merged, run_trial_range(&side1, &side2, 8, 0, 103));
    }
}
