pub mod barrage;
pub mod engine;
pub mod hits;
pub mod rng;

pub use barrage::{run_barrage, BarrageReport, BARRAGE_THRESHOLD};
pub use engine::{
    outcome_of, serialize_events_json, simulate_battle, Battle, BattleConfig, BattleOutcome,
    BattlePhase, BattleResult, CombatEvent, Side, TraceCollector, TraceMode,
};
pub use hits::{absorb_order, assign_hits, next_target, roll_hits};
pub use rng::{entropy_seed, Dice, Rng, ScriptedDice};
