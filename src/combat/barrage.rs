//! Anti-fighter barrage: a single pre-combat volley that can only destroy fighter-class units.

use serde::Serialize;

use crate::combat::rng::Dice;
use crate::data::fleet::{Capability, Fleet};

/// Barrage dice hit on this face or higher, regardless of the unit's combat threshold.
pub const BARRAGE_THRESHOLD: u8 = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BarrageReport {
    pub shots: u32,
    pub hits: u32,
    pub fighters_destroyed: u32,
}

/// One die per barrage-capable unit in `attacker`; each hit removes one fighter from `defender`.
/// Hits beyond the defender's fighters are wasted.
pub fn run_barrage<D: Dice + ?Sized>(attacker: &Fleet, defender: &mut Fleet, dice: &mut D) -> BarrageReport {
    let shots = attacker.count_units_with(Capability::AntiFighterBarrage) as u32;
    let hits = (0..shots)
        .filter(|_| dice.roll_d10() >= BARRAGE_THRESHOLD)
        .count() as u32;

    let mut fighters_destroyed = 0;
    for _ in 0..hits {
        if defender
            .remove_first_matching(|unit| unit.kind.is_fighter_class())
            .is_none()
        {
            break;
        }
        fighters_destroyed += 1;
    }

    BarrageReport {
        shots,
        hits,
        fighters_destroyed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::ScriptedDice;
    use crate::data::fleet::Unit;
    use crate::data::unit::UnitKind;

    fn destroyers(count: usize) -> Fleet {
        Fleet::new((0..count).map(|_| Unit::new(UnitKind::Destroyer)).collect())
    }

    fn fighter_screen() -> Fleet {
        Fleet::new(vec![
            Unit::new(UnitKind::Carrier),
            Unit::new(UnitKind::Fighter),
            Unit::new(UnitKind::Fighter),
        ])
    }

    #[test]
    fn no_capable_units_rolls_nothing() {
        let attacker = Fleet::new(vec![Unit::new(UnitKind::Dreadnought)]);
        let mut defender = fighter_screen();
        let mut dice = ScriptedDice::always(10);
        let report = run_barrage(&attacker, &mut defender, &mut dice);
        assert_eq!(report, BarrageReport::default());
        assert_eq!(defender, fighter_screen());
    }

    #[test]
    fn misses_leave_defender_untouched() {
        let mut defender = fighter_screen();
        let report = run_barrage(&destroyers(3), &mut defender, &mut ScriptedDice::always(8));
        assert_eq!(report.shots, 3);
        assert_eq!(report.hits, 0);
        assert_eq!(defender, fighter_screen());
    }

    #[test]
    fn surplus_hits_never_touch_other_units() {
        let mut defender = fighter_screen();
        let report = run_barrage(&destroyers(4), &mut defender, &mut ScriptedDice::always(9));
        assert_eq!(report.hits, 4);
        assert_eq!(report.fighters_destroyed, 2);
        assert_eq!(defender.units(), &[Unit::new(UnitKind::Carrier)]);
    }

    #[test]
    fn one_roll_per_capable_unit() {
        let mut defender = fighter_screen();
        let mut dice = ScriptedDice::new([10, 2], 10);
        let report = run_barrage(&destroyers(2), &mut defender, &mut dice);
        assert_eq!(report.hits, 1);
        assert_eq!(defender.len(), 2);
        assert_eq!(dice.remaining(), 0);
    }
}
