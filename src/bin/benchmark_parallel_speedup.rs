//! Run the Monte Carlo driver once sequentially and once in parallel, then print timings and speedup.
//!
//! Usage: cargo run --release --bin benchmark_parallel_speedup [trials]

use std::time::Instant;

use fleetsim::data::{FleetComposition, UnitKind};
use fleetsim::simulation::{run_simulation, run_simulation_parallel};

fn main() {
    let trials = std::env::args()
        .nth(1)
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(200_000);
    let seed = 12345u64;

    let side1 = FleetComposition::new()
        .with(UnitKind::Dreadnought, 2)
        .with(UnitKind::Destroyer, 2)
        .build_fleet();
    let side2 = FleetComposition::new()
        .with(UnitKind::Dreadnought, 1)
        .with(UnitKind::Carrier, 1)
        .with(UnitKind::Fighter, 4)
        .build_fleet();

    println!(
        "Monte Carlo: {} trials ({} units vs {} units)",
        trials,
        side1.len(),
        side2.len()
    );
    println!();

    let t0 = Instant::now();
    let seq = run_simulation(&side1, &side2, trials, seed);
    let elapsed_seq = t0.elapsed();
    let seq_ms = elapsed_seq.as_secs_f64() * 1000.0;
    println!(
        "Sequential:  {:.2} ms  ({:.1} battles/s)",
        seq_ms,
        trials as f64 / elapsed_seq.as_secs_f64()
    );

    let t0 = Instant::now();
    let par = run_simulation_parallel(&side1, &side2, trials, seed);
    let elapsed_par = t0.elapsed();
    let par_ms = elapsed_par.as_secs_f64() * 1000.0;
    println!(
        "Parallel:    {:.2} ms  ({:.1} battles/s)",
        par_ms,
        trials as f64 / elapsed_par.as_secs_f64()
    );

    println!();
    println!("Speedup:     {:.2}x faster (parallel vs sequential)", seq_ms / par_ms);

    assert_eq!(seq, par, "sequential and parallel tallies diverged");
    println!("(Results match sequential vs parallel)");
}
