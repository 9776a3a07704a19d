//! Fleet composition input: unit name to count, validated before any fleet is built.
//! Sources: inline text (`fighter=4,carrier=1`), or a JSON/YAML file holding a name -> count map.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::data::fleet::{Fleet, Unit};
use crate::data::unit::UnitKind;
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FleetComposition {
    counts: BTreeMap<UnitKind, u32>,
}

impl FleetComposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper. Repeated kinds accumulate.
    pub fn with(mut self, kind: UnitKind, count: u32) -> Self {
        let entry = self.counts.entry(kind).or_insert(0);
        *entry = entry.saturating_add(count);
        self
    }

    pub fn count(&self, kind: UnitKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_units(&self) -> u64 {
        self.counts.values().map(|&count| u64::from(count)).sum()
    }

    /// Validate `(name, raw count)` pairs. Fails on the first bad entry; nothing is built on failure.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut counts: BTreeMap<UnitKind, u32> = BTreeMap::new();
        for (name, raw_count) in entries {
            let kind = UnitKind::from_name(name)?;
            let count = parse_count(kind, raw_count)?;
            add_count(&mut counts, kind, count)?;
        }
        Ok(Self { counts })
    }

    /// Parse `fighter=4,carrier=1` (`:` is accepted in place of `=`). Empty input is an empty fleet.
    pub fn parse_inline(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for part in text.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let Some((name, count)) = part.split_once(|c| c == '=' || c == ':') else {
                return Err(SimError::InvalidComposition(format!(
                    "expected name=count, got '{part}'"
                )));
            };
            entries.push((name.trim(), count.trim()));
        }
        Self::from_entries(entries)
    }

    /// Build from a JSON object of `name: count`. Counts must be non-negative integers.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let Some(map) = value.as_object() else {
            return Err(SimError::InvalidComposition(
                "fleet document must be a map of unit name to count".to_string(),
            ));
        };
        let mut counts: BTreeMap<UnitKind, u32> = BTreeMap::new();
        for (name, raw) in map {
            let kind = UnitKind::from_name(name)?;
            let count = raw
                .as_u64()
                .and_then(|count| u32::try_from(count).ok())
                .ok_or_else(|| SimError::InvalidUnitCount {
                    unit: kind.name().to_string(),
                    value: raw.to_string(),
                })?;
            add_count(&mut counts, kind, count)?;
        }
        Ok(Self { counts })
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json_value(&value)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(raw)?;
        Self::from_json_value(&value)
    }

    /// Instantiate a fresh fleet at full hit points, units listed in catalog order.
    pub fn build_fleet(&self) -> Fleet {
        let mut units = Vec::with_capacity(self.total_units() as usize);
        for (&kind, &count) in &self.counts {
            units.extend((0..count).map(|_| Unit::new(kind)));
        }
        Fleet::new(units)
    }
}

/// Load a composition from a `.json`, `.yaml` or `.yml` file.
pub fn load_fleet_file(path: impl AsRef<Path>) -> Result<FleetComposition> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => FleetComposition::from_json_str(&fs::read_to_string(path)?),
        Some("yaml") | Some("yml") => FleetComposition::from_yaml_str(&fs::read_to_string(path)?),
        _ => Err(SimError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Treat `arg` as a fleet file when it names an existing path or a json/yaml file, else as inline text.
pub fn parse_fleet_arg(arg: &str) -> Result<FleetComposition> {
    let lower = arg.to_ascii_lowercase();
    let looks_like_file = [".json", ".yaml", ".yml"]
        .iter()
        .any(|suffix| lower.ends_with(suffix));
    if looks_like_file || Path::new(arg).is_file() {
        load_fleet_file(arg)
    } else {
        FleetComposition::parse_inline(arg)
    }
}

fn parse_count(kind: UnitKind, raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| SimError::InvalidUnitCount {
            unit: kind.name().to_string(),
            value: raw.to_string(),
        })
}

fn add_count(counts: &mut BTreeMap<UnitKind, u32>, kind: UnitKind, count: u32) -> Result<()> {
    let entry = counts.entry(kind).or_insert(0);
    let current = *entry;
    *entry = current
        .checked_add(count)
        .ok_or_else(|| SimError::InvalidUnitCount {
            unit: kind.name().to_string(),
            value: format!("{current} + {count}"),
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_parses_and_builds_in_catalog_order() {
        let composition = FleetComposition::parse_inline("dreadnought=1, carrier:1, fighters=4").unwrap();
        assert_eq!(composition.count(UnitKind::Fighter), 4);
        assert_eq!(composition.total_units(), 6);

        let fleet = composition.build_fleet();
        let kinds: Vec<_> = fleet.units().iter().map(|unit| unit.kind).collect();
        assert_eq!(
            kinds,
            vec![
                UnitKind::Fighter,
                UnitKind::Fighter,
                UnitKind::Fighter,
                UnitKind::Fighter,
                UnitKind::Carrier,
                UnitKind::Dreadnought,
            ]
        );
        assert_eq!(fleet.total_hit_points(), 7);
    }

    #[test]
    fn repeated_names_accumulate() {
        let composition = FleetComposition::parse_inline("fighter=1,fighters=2").unwrap();
        assert_eq!(composition.count(UnitKind::Fighter), 3);
    }

    #[test]
    fn empty_inline_is_empty_fleet() {
        let composition = FleetComposition::parse_inline("").unwrap();
        assert!(composition.build_fleet().is_destroyed());
    }

    #[test]
    fn rejects_negative_and_fractional_counts() {
        for bad in ["fighter=-1", "fighter=1.5", "fighter=two", "fighter="] {
            let err = FleetComposition::parse_inline(bad).unwrap_err();
            assert!(
                matches!(err, SimError::InvalidUnitCount { ref unit, .. } if unit == "fighter"),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn rejects_unknown_name_and_missing_separator() {
        assert!(matches!(
            FleetComposition::parse_inline("cruiser=2").unwrap_err(),
            SimError::UnknownUnitType(_)
        ));
        assert!(matches!(
            FleetComposition::parse_inline("fighter 2").unwrap_err(),
            SimError::InvalidComposition(_)
        ));
    }

    #[test]
    fn json_requires_non_negative_integers() {
        let ok = FleetComposition::from_json_str(r#"{"Dreadnoughts": 2}"#).unwrap();
        assert_eq!(ok.count(UnitKind::Dreadnought), 2);

        for bad in [r#"{"fighter": -3}"#, r#"{"fighter": 2.5}"#, r#"{"fighter": "4"}"#] {
            assert!(matches!(
                FleetComposition::from_json_str(bad).unwrap_err(),
                SimError::InvalidUnitCount { .. }
            ));
        }
        assert!(matches!(
            FleetComposition::from_json_str("[1, 2]").unwrap_err(),
            SimError::InvalidComposition(_)
        ));
    }

    #[test]
    fn yaml_composition() {
        let composition = FleetComposition::from_yaml_str("warsun: 1\ndestroyer: 3\n").unwrap();
        assert_eq!(composition.count(UnitKind::Warsun), 1);
        assert_eq!(composition.count(UnitKind::Destroyer), 3);
    }

    #[test]
    fn unsupported_extension() {
        assert!(matches!(
            load_fleet_file("fleet.toml").unwrap_err(),
            SimError::UnsupportedFormat(_)
        ));
    }
}
