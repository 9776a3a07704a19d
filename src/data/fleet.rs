//! Fleet: an ordered collection of surviving units owned by one side of a battle.
//! Cloning a fleet deep-copies every unit, so each trial mutates isolated state.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::unit::{UnitKind, UnitType};

/// Boolean unit capabilities queried by combat phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    AntiFighterBarrage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    pub kind: UnitKind,
    pub hit_points: u32,
}

impl Unit {
    pub fn new(kind: UnitKind) -> Self {
        Self {
            kind,
            hit_points: kind.unit_type().max_hit_points,
        }
    }

    /// A unit that has already taken damage. Used to set up mid-battle states.
    pub fn damaged(kind: UnitKind, hit_points: u32) -> Self {
        Self { kind, hit_points }
    }

    pub fn unit_type(&self) -> &'static UnitType {
        self.kind.unit_type()
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::AntiFighterBarrage => self.unit_type().has_anti_fighter_barrage,
        }
    }
}

/// Invariant: never holds a unit with zero hit points.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fleet {
    units: Vec<Unit>,
}

impl Fleet {
    pub fn new(units: Vec<Unit>) -> Self {
        Self {
            units: units.into_iter().filter(|unit| unit.hit_points > 0).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, unit: Unit) {
        if unit.hit_points > 0 {
            self.units.push(unit);
        }
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn is_destroyed(&self) -> bool {
        self.units.is_empty()
    }

    pub fn total_cost(&self) -> f64 {
        self.units.iter().map(|unit| unit.unit_type().cost).sum()
    }

    pub fn total_hit_points(&self) -> u32 {
        self.units.iter().map(|unit| unit.hit_points).sum()
    }

    /// Surviving units per kind, in catalog order.
    pub fn composition(&self) -> BTreeMap<UnitKind, u32> {
        let mut counts = BTreeMap::new();
        for unit in &self.units {
            *counts.entry(unit.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Apply one point of damage to the unit at `index`, removing it when it reaches zero.
    /// Returns true when the unit was destroyed. Out-of-range indices are ignored.
    pub fn apply_damage(&mut self, index: usize) -> bool {
        let Some(unit) = self.units.get_mut(index) else {
            return false;
        };
        unit.hit_points = unit.hit_points.saturating_sub(1);
        if unit.hit_points == 0 {
            self.units.remove(index);
            true
        } else {
            false
        }
    }

    pub fn count_units_with(&self, capability: Capability) -> usize {
        self.units.iter().filter(|unit| unit.has(capability)).count()
    }

    /// Remove and return the first unit matching `predicate`; `None` when nothing matches.
    pub fn remove_first_matching<P>(&mut self, predicate: P) -> Option<Unit>
    where
        P: Fn(&Unit) -> bool,
    {
        let index = self.units.iter().position(predicate)?;
        Some(self.units.remove(index))
    }
}
