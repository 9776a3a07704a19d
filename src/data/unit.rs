//! Unit catalog: static combat attributes for every unit archetype.
//! Units carry a `UnitKind` tag; attributes are looked up from the table, never stored per unit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Immutable catalog entry for one archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitType {
    pub name: &'static str,
    pub max_hit_points: u32,
    /// A d10 roll is a hit iff the rolled value is >= this threshold.
    pub combat_threshold: u8,
    pub attacks_per_round: u32,
    /// Tie-break when remaining hit points are equal: the highest value absorbs the hit first.
    pub priority: i32,
    pub cost: f64,
    pub has_anti_fighter_barrage: bool,
}

pub const FIGHTER: UnitType = UnitType {
    name: "fighter",
    max_hit_points: 1,
    combat_threshold: 9,
    attacks_per_round: 1,
    priority: 4,
    cost: 0.5,
    has_anti_fighter_barrage: false,
};

pub const CARRIER: UnitType = UnitType {
    name: "carrier",
    max_hit_points: 1,
    combat_threshold: 9,
    attacks_per_round: 1,
    priority: 5,
    cost: 3.0,
    has_anti_fighter_barrage: false,
};

pub const DREADNOUGHT: UnitType = UnitType {
    name: "dreadnought",
    max_hit_points: 2,
    combat_threshold: 5,
    attacks_per_round: 1,
    priority: 2,
    cost: 4.0,
    has_anti_fighter_barrage: false,
};

pub const DESTROYER: UnitType = UnitType {
    name: "destroyer",
    max_hit_points: 1,
    combat_threshold: 1,
    attacks_per_round: 1,
    priority: 3,
    cost: 1.0,
    has_anti_fighter_barrage: true,
};

pub const WARSUN: UnitType = UnitType {
    name: "warsun",
    max_hit_points: 2,
    combat_threshold: 3,
    attacks_per_round: 3,
    priority: 1,
    cost: 12.0,
    has_anti_fighter_barrage: false,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Fighter,
    Carrier,
    Dreadnought,
    Destroyer,
    Warsun,
}

impl UnitKind {
    /// Catalog order; fleets built from a composition list their units in this order.
    pub const ALL: [UnitKind; 5] = [
        Self::Fighter,
        Self::Carrier,
        Self::Dreadnought,
        Self::Destroyer,
        Self::Warsun,
    ];

    pub fn unit_type(self) -> &'static UnitType {
        match self {
            Self::Fighter => &FIGHTER,
            Self::Carrier => &CARRIER,
            Self::Dreadnought => &DREADNOUGHT,
            Self::Destroyer => &DESTROYER,
            Self::Warsun => &WARSUN,
        }
    }

    pub fn name(self) -> &'static str {
        self.unit_type().name
    }

    /// Fighter-class units are the only valid anti-fighter barrage targets.
    pub const fn is_fighter_class(self) -> bool {
        matches!(self, Self::Fighter)
    }

    /// Resolve a catalog entry by name. Case-insensitive; accepts plurals and "dreadnaught".
    pub fn from_name(name: &str) -> Result<Self> {
        let normalized = normalize_lookup(name);
        let singular = normalized.strip_suffix('s').unwrap_or(&normalized);
        let kind = match singular {
            "fighter" => Self::Fighter,
            "carrier" => Self::Carrier,
            "dreadnought" | "dreadnaught" => Self::Dreadnought,
            "destroyer" => Self::Destroyer,
            "warsun" | "war_sun" => Self::Warsun,
            _ => return Err(SimError::UnknownUnitType(name.trim().to_string())),
        };
        Ok(kind)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercase, collapse whitespace/underscores/hyphens into single underscores.
fn normalize_lookup(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' || c == '-' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_accepts_plurals_and_case() {
        assert_eq!(UnitKind::from_name("Fighters").unwrap(), UnitKind::Fighter);
        assert_eq!(UnitKind::from_name(" CARRIER ").unwrap(), UnitKind::Carrier);
        assert_eq!(UnitKind::from_name("dreadnaughts").unwrap(), UnitKind::Dreadnought);
        assert_eq!(UnitKind::from_name("war sun").unwrap(), UnitKind::Warsun);
        assert_eq!(UnitKind::from_name("warsuns").unwrap(), UnitKind::Warsun);
    }

    #[test]
    fn lookup_rejects_unknown_archetype() {
        let err = UnitKind::from_name("flagship").unwrap_err();
        assert!(matches!(err, SimError::UnknownUnitType(ref name) if name == "flagship"));
    }

    #[test]
    fn only_destroyer_carries_barrage() {
        let capable: Vec<_> = UnitKind::ALL
            .iter()
            .filter(|kind| kind.unit_type().has_anti_fighter_barrage)
            .collect();
        assert_eq!(capable, vec![&UnitKind::Destroyer]);
    }

    #[test]
    fn thresholds_are_valid_d10_faces() {
        for kind in UnitKind::ALL {
            let unit_type = kind.unit_type();
            assert!((1..=10).contains(&unit_type.combat_threshold), "{kind}");
            assert!(unit_type.max_hit_points > 0);
            assert!(unit_type.attacks_per_round > 0);
            assert!(unit_type.cost >= 0.0);
        }
    }
}
