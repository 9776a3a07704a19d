pub mod config;
pub mod monte_carlo;
pub mod report;

pub use config::SimulationConfig;
pub use monte_carlo::{
    run_simulation, run_simulation_parallel, run_trial_range, run_with_config, SimulationResult,
    SimulationTally,
};
pub use report::{build_report, render_table, win_percentage, ReportRow, SimulationReport};
