use std::fmt::Write as _;

use serde::Serialize;

use crate::simulation::monte_carlo::SimulationResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub label: String,
    pub wins: usize,
    pub win_percent: u32,
    /// `None` for the draws row.
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub trials: usize,
    pub seed: u64,
    pub average_rounds: f64,
    pub rows: Vec<ReportRow>,
}

/// `round(100 * count / trials)` with ties to even. Zero trials reports 0.
pub fn win_percentage(count: usize, trials: usize) -> u32 {
    if trials == 0 {
        return 0;
    }
    (count as f64 * 100.0 / trials as f64).round_ties_even() as u32
}

pub fn build_report(result: &SimulationResult) -> SimulationReport {
    let row = |label: &str, wins: usize, cost: Option<f64>| ReportRow {
        label: label.to_string(),
        wins,
        win_percent: win_percentage(wins, result.trials),
        cost,
    };
    SimulationReport {
        trials: result.trials,
        seed: result.seed,
        average_rounds: result.average_rounds,
        rows: vec![
            row("Fleet 1", result.side1_wins, Some(result.side1_cost)),
            row("Fleet 2", result.side2_wins, Some(result.side2_cost)),
            row("Draws", result.draws, None),
        ],
    }
}

/// Grid table with Fleet / Wins / % Winrate / Cost columns.
pub fn render_table(report: &SimulationReport) -> String {
    let headers = ["Fleet", "Wins", "% Winrate", "Cost"];
    let body: Vec<[String; 4]> = report
        .rows
        .iter()
        .map(|row| {
            [
                row.label.clone(),
                row.wins.to_string(),
                row.win_percent.to_string(),
                row.cost.map(format_cost).unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.len());
        }
    }

    let separator = |fill: char| {
        let mut line = String::from("+");
        for width in widths {
            line.extend(std::iter::repeat(fill).take(width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };

    let mut out = separator('-');
    push_cells(&mut out, &headers.map(String::from), &widths);
    out.push_str(&separator('='));
    for cells in &body {
        push_cells(&mut out, cells, &widths);
        out.push_str(&separator('-'));
    }
    let _ = write!(
        out,
        "trials={} seed={} avg_rounds={:.2}",
        report.trials, report.seed, report.average_rounds
    );
    out
}

fn push_cells(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    out.push('|');
    for (cell, &width) in cells.iter().zip(widths) {
        let _ = write!(out, " {cell:<width$} |");
    }
    out.push('\n');
}

fn format_cost(cost: f64) -> String {
    if cost.fract() == 0.0 {
        format!("{cost:.0}")
    } else {
        format!("{cost}")
    }
}
