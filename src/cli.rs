use std::io::{self, BufRead, Write};

use crate::combat::{entropy_seed, simulate_battle, BattleConfig, TraceMode};
use crate::data::{parse_fleet_arg, Fleet, FleetComposition, UnitKind, UnitType};
use crate::error::{Result, SimError};
use crate::simulation::{build_report, render_table, run_with_config, SimulationConfig};

const USAGE: &str = "usage: fleetsim <simulate|battle|interactive|catalog>";
const SIMULATE_USAGE: &str = "usage: fleetsim simulate <fleet1> <fleet2> [--trials N] [--seed N] [--workers N] [--sequential] [--table]";
const BATTLE_USAGE: &str = "usage: fleetsim battle <fleet1> <fleet2> [--seed N]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Simulate,
    Battle,
    Interactive,
    Catalog,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("simulate") => Some(Command::Simulate),
        Some("battle") => Some(Command::Battle),
        Some("interactive") => Some(Command::Interactive),
        Some("catalog") => Some(Command::Catalog),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Simulate) => handle_simulate(args),
        Some(Command::Battle) => handle_battle(args),
        Some(Command::Interactive) => handle_interactive(args),
        Some(Command::Catalog) => handle_catalog(),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

const VALUE_FLAGS: [&str; 3] = ["--trials", "--seed", "--workers"];

/// Positional arguments and `--flag value` options following the command name.
#[derive(Debug, Default)]
struct CommandArgs<'a> {
    positional: Vec<&'a str>,
    options: Vec<(&'a str, Option<&'a str>)>,
}

impl<'a> CommandArgs<'a> {
    fn parse(args: &'a [String]) -> Self {
        let mut parsed = Self::default();
        let mut iter = args.iter().skip(2).map(String::as_str);
        while let Some(arg) = iter.next() {
            if VALUE_FLAGS.contains(&arg) {
                parsed.options.push((arg, iter.next()));
            } else if arg.starts_with("--") {
                parsed.options.push((arg, None));
            } else {
                parsed.positional.push(arg);
            }
        }
        parsed
    }

    fn has(&self, flag: &str) -> bool {
        self.options.iter().any(|(name, _)| *name == flag)
    }

    fn value<T: std::str::FromStr>(&self, flag: &str) -> Result<Option<T>> {
        let Some((_, raw)) = self.options.iter().rev().find(|(name, _)| *name == flag) else {
            return Ok(None);
        };
        let raw = raw.unwrap_or_default();
        raw.parse::<T>()
            .map(Some)
            .map_err(|_| SimError::InvalidArgument {
                name: flag.trim_start_matches('-').to_string(),
                value: raw.to_string(),
            })
    }
}

fn handle_simulate(args: &[String]) -> i32 {
    let parsed = CommandArgs::parse(args);
    let [fleet1, fleet2] = parsed.positional.as_slice() else {
        eprintln!("{SIMULATE_USAGE}");
        return 2;
    };

    let config = match simulate_config(&parsed) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };

    match load_fleets(fleet1, fleet2).and_then(|(side1, side2)| {
        run_with_config(&side1, &side2, &config).map(|result| build_report(&result))
    }) {
        Ok(report) if parsed.has("--table") => {
            println!("{}", render_table(&report));
            0
        }
        Ok(report) => print_json(&report, "simulation report"),
        Err(err) => {
            eprintln!("simulation failed: {err}");
            1
        }
    }
}

fn simulate_config(parsed: &CommandArgs<'_>) -> Result<SimulationConfig> {
    let mut config = SimulationConfig::from_env();
    if let Some(trials) = parsed.value::<usize>("--trials")? {
        config.trials = trials;
    }
    if let Some(seed) = parsed.value::<u64>("--seed")? {
        config.seed = Some(seed);
    }
    if let Some(workers) = parsed.value::<usize>("--workers")? {
        config.workers = workers;
    }
    if parsed.has("--sequential") {
        config.parallel = false;
    }
    Ok(config)
}

fn handle_battle(args: &[String]) -> i32 {
    let parsed = CommandArgs::parse(args);
    let [fleet1, fleet2] = parsed.positional.as_slice() else {
        eprintln!("{BATTLE_USAGE}");
        return 2;
    };
    let seed = match parsed.value::<u64>("--seed") {
        Ok(seed) => seed.unwrap_or_else(entropy_seed),
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };

    match load_fleets(fleet1, fleet2) {
        Ok((side1, side2)) => {
            let result = simulate_battle(
                &side1,
                &side2,
                BattleConfig {
                    seed,
                    trace_mode: TraceMode::Events,
                },
            );
            print_json(&result, "battle result")
        }
        Err(err) => {
            eprintln!("battle failed: {err}");
            1
        }
    }
}

fn handle_interactive(args: &[String]) -> i32 {
    let parsed = CommandArgs::parse(args);
    let config = match simulate_config(&parsed) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let fleets = prompt_fleet(&mut input, &mut output, 1)
        .and_then(|side1| Ok((side1, prompt_fleet(&mut input, &mut output, 2)?)));
    let (side1, side2) = match fleets {
        Ok((side1, side2)) => (side1.build_fleet(), side2.build_fleet()),
        Err(err) => {
            eprintln!("input cancelled: {err}");
            return 1;
        }
    };

    match run_with_config(&side1, &side2, &config) {
        Ok(result) => {
            println!("\n{}", render_table(&build_report(&result)));
            0
        }
        Err(err) => {
            eprintln!("simulation failed: {err}");
            1
        }
    }
}

fn handle_catalog() -> i32 {
    let catalog: Vec<&'static UnitType> = UnitKind::ALL.iter().map(|kind| kind.unit_type()).collect();
    print_json(&catalog, "catalog")
}

fn load_fleets(fleet1: &str, fleet2: &str) -> Result<(Fleet, Fleet)> {
    let side1 = parse_fleet_arg(fleet1)?.build_fleet();
    let side2 = parse_fleet_arg(fleet2)?.build_fleet();
    Ok((side1, side2))
}

fn print_json<T: serde::Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

/// Ask for a count of every unit type, re-prompting until each answer is a non-negative integer.
/// Fails only when input ends or cannot be read.
pub fn prompt_fleet<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    fleet_number: u32,
) -> io::Result<FleetComposition> {
    writeln!(output, "\n--- Building fleet {fleet_number} ---")?;
    let mut composition = FleetComposition::new();
    for kind in UnitKind::ALL {
        let count = prompt_count(input, output, kind)?;
        composition = composition.with(kind, count);
    }
    Ok(composition)
}

fn prompt_count<R: BufRead, W: Write>(input: &mut R, output: &mut W, kind: UnitKind) -> io::Result<u32> {
    loop {
        write!(output, "{}s: ", capitalize(kind.name()))?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"));
        }
        match FleetComposition::from_entries([(kind.name(), line.trim())]) {
            Ok(single) => return Ok(single.count(kind)),
            Err(err) => writeln!(output, "{err}. Please try again.")?,
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
