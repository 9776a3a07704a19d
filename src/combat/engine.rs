//! Battle state machine: one barrage phase, then simultaneous combat rounds until a fleet is gone.
//!
//! Both sides roll against their start-of-round composition before any hits land, so side 1
//! assigning first has no effect on the outcome. There is no round cap: a catalog where no unit
//! can ever hit would loop forever, and every standard archetype hits with positive probability.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::combat::barrage::{run_barrage, BarrageReport};
use crate::combat::hits::{assign_hits, roll_hits};
use crate::combat::rng::{Dice, Rng};
use crate::data::fleet::Fleet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[serde(rename = "side_1")]
    One,
    #[serde(rename = "side_2")]
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    Side1Wins,
    Side2Wins,
    Draw,
}

impl BattleOutcome {
    pub const fn winner(self) -> Option<Side> {
        match self {
            Self::Side1Wins => Some(Side::One),
            Self::Side2Wins => Some(Side::Two),
            Self::Draw => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "outcome")]
pub enum BattlePhase {
    Barrage,
    CombatRound,
    Resolved(BattleOutcome),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraceMode {
    #[default]
    Off,
    Events,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatEvent {
    pub event_type: String,
    pub round_index: u32,
    pub phase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    pub values: Map<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct TraceCollector {
    enabled: bool,
    events: Vec<CombatEvent>,
}

impl TraceCollector {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            events: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(&mut self, event: CombatEvent) {
        if self.enabled {
            self.events.push(event);
        }
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<CombatEvent> {
        self.events
    }
}

pub fn serialize_events_json(events: &[CombatEvent]) -> Result<String, serde_json::Error> {
    serde_json::to_string(events)
}

#[derive(Debug, Clone, Copy)]
pub struct BattleConfig {
    pub seed: u64,
    pub trace_mode: TraceMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct BattleResult {
    pub outcome: BattleOutcome,
    /// Round counter at resolution; starts at 1 and is never incremented past the final round.
    pub rounds: u32,
    pub side1_remaining: Fleet,
    pub side2_remaining: Fleet,
    pub events: Vec<CombatEvent>,
}

/// Terminal check applied after barrage and after every combat round.
pub fn outcome_of(side1: &Fleet, side2: &Fleet) -> Option<BattleOutcome> {
    match (side1.is_destroyed(), side2.is_destroyed()) {
        (true, true) => Some(BattleOutcome::Draw),
        (true, false) => Some(BattleOutcome::Side2Wins),
        (false, true) => Some(BattleOutcome::Side1Wins),
        (false, false) => None,
    }
}

/// One battle over two owned fleets.
#[derive(Debug, Clone)]
pub struct Battle {
    side1: Fleet,
    side2: Fleet,
    round: u32,
    phase: BattlePhase,
    trace: TraceCollector,
}

impl Battle {
    pub fn new(side1: Fleet, side2: Fleet, trace_mode: TraceMode) -> Self {
        Self {
            side1,
            side2,
            round: 1,
            phase: BattlePhase::Barrage,
            trace: TraceCollector::new(trace_mode == TraceMode::Events),
        }
    }

    /// Fresh battle over deep copies of two template fleets.
    pub fn from_templates(side1: &Fleet, side2: &Fleet, trace_mode: TraceMode) -> Self {
        Self::new(side1.clone(), side2.clone(), trace_mode)
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn side1(&self) -> &Fleet {
        &self.side1
    }

    pub fn side2(&self) -> &Fleet {
        &self.side2
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.phase {
            BattlePhase::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Perform one transition and return the new phase. A resolved battle stays resolved.
    pub fn step<D: Dice + ?Sized>(&mut self, dice: &mut D) -> BattlePhase {
        match self.phase {
            BattlePhase::Barrage => {
                // Sequential: side 2 fires at side 1 as it stands after side 1's own volley.
                let first = run_barrage(&self.side1, &mut self.side2, dice);
                self.record_barrage(Side::One, first);
                let second = run_barrage(&self.side2, &mut self.side1, dice);
                self.record_barrage(Side::Two, second);
                self.resolve_or(BattlePhase::CombatRound);
            }
            BattlePhase::CombatRound => {
                let side1_hits = roll_hits(&self.side1, dice);
                let side2_hits = roll_hits(&self.side2, dice);
                let side1_applied = assign_hits(side1_hits, &mut self.side2);
                let side2_applied = assign_hits(side2_hits, &mut self.side1);
                self.record_round(side1_hits, side1_applied, side2_hits, side2_applied);
                self.resolve_or(BattlePhase::CombatRound);
                if self.phase == BattlePhase::CombatRound {
                    self.round += 1;
                }
            }
            BattlePhase::Resolved(_) => {}
        }
        self.phase
    }

    /// Step until resolved.
    pub fn run<D: Dice + ?Sized>(mut self, dice: &mut D) -> BattleResult {
        loop {
            if let BattlePhase::Resolved(outcome) = self.step(dice) {
                tracing::trace!(?outcome, rounds = self.round, "battle resolved");
                return BattleResult {
                    outcome,
                    rounds: self.round,
                    side1_remaining: self.side1,
                    side2_remaining: self.side2,
                    events: self.trace.into_events(),
                };
            }
        }
    }

    fn resolve_or(&mut self, next: BattlePhase) {
        self.phase = match outcome_of(&self.side1, &self.side2) {
            Some(outcome) => {
                if self.trace.is_enabled() {
                    let mut values = Map::new();
                    values.insert(
                        "outcome".to_string(),
                        serde_json::to_value(outcome).unwrap_or(Value::Null),
                    );
                    self.trace.record(CombatEvent {
                        event_type: "battle_resolved".to_string(),
                        round_index: self.round,
                        phase: "resolved".to_string(),
                        side: outcome.winner(),
                        values,
                    });
                }
                BattlePhase::Resolved(outcome)
            }
            None => next,
        };
    }

    fn record_barrage(&mut self, side: Side, report: BarrageReport) {
        if !self.trace.is_enabled() {
            return;
        }
        let mut values = Map::new();
        values.insert("shots".to_string(), Value::from(report.shots));
        values.insert("hits".to_string(), Value::from(report.hits));
        values.insert("fighters_destroyed".to_string(), Value::from(report.fighters_destroyed));
        self.trace.record(CombatEvent {
            event_type: "anti_fighter_barrage".to_string(),
            round_index: 0,
            phase: "barrage".to_string(),
            side: Some(side),
            values,
        });
    }

    fn record_round(&mut self, side1_hits: u32, side1_applied: u32, side2_hits: u32, side2_applied: u32) {
        if !self.trace.is_enabled() {
            return;
        }
        for (side, hits, applied, remaining) in [
            (Side::One, side1_hits, side1_applied, &self.side2),
            (Side::Two, side2_hits, side2_applied, &self.side1),
        ] {
            let mut values = Map::new();
            values.insert("hits".to_string(), Value::from(hits));
            values.insert("hits_applied".to_string(), Value::from(applied));
            values.insert("target_units_remaining".to_string(), Value::from(remaining.len()));
            values.insert(
                "target_hit_points_remaining".to_string(),
                Value::from(remaining.total_hit_points()),
            );
            self.trace.record(CombatEvent {
                event_type: "hits_assigned".to_string(),
                round_index: self.round,
                phase: "combat".to_string(),
                side: Some(side),
                values,
            });
        }
    }
}

/// Run one battle over copies of the given fleets with a generator seeded from `config.seed`.
pub fn simulate_battle(side1: &Fleet, side2: &Fleet, config: BattleConfig) -> BattleResult {
    let mut rng = Rng::new(config.seed);
    Battle::from_templates(side1, side2, config.trace_mode).run(&mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::ScriptedDice;
    use crate::data::fleet::Unit;
    use crate::data::unit::UnitKind;

    fn fleet(kinds: &[UnitKind]) -> Fleet {
        Fleet::new(kinds.iter().map(|&kind| Unit::new(kind)).collect())
    }

    #[test]
    fn empty_enemy_resolves_without_combat() {
        let mut battle = Battle::new(fleet(&[UnitKind::Fighter]), Fleet::empty(), TraceMode::Off);
        let mut dice = ScriptedDice::always(10);
        assert_eq!(
            battle.step(&mut dice),
            BattlePhase::Resolved(BattleOutcome::Side1Wins)
        );
        assert_eq!(battle.round(), 1);
    }

    #[test]
    fn two_empty_fleets_draw() {
        let result = Battle::new(Fleet::empty(), Fleet::empty(), TraceMode::Off)
            .run(&mut ScriptedDice::always(1));
        assert_eq!(result.outcome, BattleOutcome::Draw);
        assert_eq!(result.rounds, 1);
    }

    #[test]
    fn mutual_destruction_is_a_draw() {
        // No barrage units; both fighters roll 10 and destroy each other in round one.
        let result = Battle::new(
            fleet(&[UnitKind::Fighter]),
            fleet(&[UnitKind::Fighter]),
            TraceMode::Off,
        )
        .run(&mut ScriptedDice::always(10));
        assert_eq!(result.outcome, BattleOutcome::Draw);
        assert_eq!(result.rounds, 1);
    }

    #[test]
    fn rolls_use_start_of_round_state() {
        // Side 1 kills side 2's only unit, but side 2's roll was already taken and still lands.
        let mut dice = ScriptedDice::new([10, 10], 1);
        let result = Battle::new(
            fleet(&[UnitKind::Dreadnought]),
            fleet(&[UnitKind::Carrier]),
            TraceMode::Off,
        )
        .run(&mut dice);
        assert_eq!(result.outcome, BattleOutcome::Side1Wins);
        assert_eq!(result.side1_remaining.units()[0].hit_points, 1);
    }

    #[test]
    fn round_counter_advances_only_while_unresolved() {
        // Round 1: both miss. Round 2: side 1 hits, side 2 misses.
        let mut dice = ScriptedDice::new([1, 1, 10, 1], 1);
        let mut battle = Battle::new(
            fleet(&[UnitKind::Carrier]),
            fleet(&[UnitKind::Carrier]),
            TraceMode::Off,
        );
        assert_eq!(battle.step(&mut dice), BattlePhase::CombatRound);
        assert_eq!(battle.step(&mut dice), BattlePhase::CombatRound);
        assert_eq!(battle.round(), 2);
        assert_eq!(
            battle.step(&mut dice),
            BattlePhase::Resolved(BattleOutcome::Side1Wins)
        );
        assert_eq!(battle.round(), 2);
        assert_eq!(
            battle.step(&mut dice),
            BattlePhase::Resolved(BattleOutcome::Side1Wins)
        );
    }

    #[test]
    fn barrage_is_sequential_and_runs_once() {
        // Side 1: destroyer + fighter. Side 2: destroyer + fighter.
        // Side 1 barrage hits (10); side 2 barrage hits (9). Both fighters removed before combat.
        // Combat: both destroyers hit on 1 and destroy each other.
        let mut dice = ScriptedDice::new([10, 9], 1);
        let mut battle = Battle::new(
            fleet(&[UnitKind::Fighter, UnitKind::Destroyer]),
            fleet(&[UnitKind::Fighter, UnitKind::Destroyer]),
            TraceMode::Events,
        );
        assert_eq!(battle.step(&mut dice), BattlePhase::CombatRound);
        assert_eq!(battle.side1().units(), &[Unit::new(UnitKind::Destroyer)]);
        assert_eq!(battle.side2().units(), &[Unit::new(UnitKind::Destroyer)]);

        let result = battle.run(&mut dice);
        assert_eq!(result.outcome, BattleOutcome::Draw);
        let barrages = result
            .events
            .iter()
            .filter(|event| event.event_type == "anti_fighter_barrage")
            .count();
        assert_eq!(barrages, 2);
    }

    #[test]
    fn trace_off_records_nothing() {
        let result = simulate_battle(
            &fleet(&[UnitKind::Dreadnought]),
            &fleet(&[UnitKind::Fighter]),
            BattleConfig {
                seed: 3,
                trace_mode: TraceMode::Off,
            },
        );
        assert!(result.events.is_empty());
    }

    #[test]
    fn trace_records_every_round_and_resolution() {
        let result = simulate_battle(
            &fleet(&[UnitKind::Dreadnought, UnitKind::Dreadnought]),
            &fleet(&[UnitKind::Carrier, UnitKind::Fighter, UnitKind::Fighter]),
            BattleConfig {
                seed: 11,
                trace_mode: TraceMode::Events,
            },
        );
        let round_events = result
            .events
            .iter()
            .filter(|event| event.event_type == "hits_assigned")
            .count() as u32;
        assert_eq!(round_events, result.rounds * 2);
        let last = result.events.last().expect("resolution event");
        assert_eq!(last.event_type, "battle_resolved");
        assert_eq!(last.side, result.outcome.winner());
    }
}
