use std::cmp::Ordering;

use crate::combat::rng::Dice;
use crate::data::fleet::{Fleet, Unit};

/// Roll every attack of every surviving unit once; count rolls at or above the unit's threshold.
pub fn roll_hits<D: Dice + ?Sized>(fleet: &Fleet, dice: &mut D) -> u32 {
    let mut hits = 0;
    for unit in fleet.units() {
        let unit_type = unit.unit_type();
        for _ in 0..unit_type.attacks_per_round {
            if dice.roll_d10() >= unit_type.combat_threshold {
                hits += 1;
            }
        }
    }
    hits
}

/// Targeting order: most remaining hit points first, then highest priority.
/// `Ordering::Less` means `a` absorbs the next hit before `b`.
pub fn absorb_order(a: &Unit, b: &Unit) -> Ordering {
    b.hit_points
        .cmp(&a.hit_points)
        .then_with(|| b.unit_type().priority.cmp(&a.unit_type().priority))
}

/// Index of the unit that absorbs the next hit. Equal units resolve to the earliest in fleet order.
pub fn next_target(fleet: &Fleet) -> Option<usize> {
    fleet
        .units()
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| absorb_order(a, b))
        .map(|(index, _)| index)
}

/// Apply `hits` one at a time, re-ranking the survivors after each.
/// Hits left over once the fleet is empty are discarded. Returns the number of hits applied.
pub fn assign_hits(hits: u32, target: &mut Fleet) -> u32 {
    let mut applied = 0;
    for _ in 0..hits {
        let Some(index) = next_target(target) else {
            break;
        };
        target.apply_damage(index);
        applied += 1;
    }
    applied
}
