//! Stat Engine
//!
//! Derives attribute totals and the scalar "power" from an allocated node set.
//!
//! Order matters: every flat effect is summed first, percent bonuses are
//! accumulated per base stat, and a single multiplicative pass runs at the
//! end. Percent bonuses are never applied incrementally per node.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::constants::{round_half_up, BASE_STATS, PERCENT_SUFFIX, POWER_WEIGHTS};

/// Classified effect key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKey<'a> {
    /// Added directly to the named total
    Flat(&'a str),
    /// Percentage multiplier of the named base total
    Percent(&'a str),
}

impl<'a> EffectKey<'a> {
    pub fn parse(key: &'a str) -> Self {
        let split = key.len().saturating_sub(PERCENT_SUFFIX.len());
        match (key.get(..split), key.get(split..)) {
            (Some(base), Some(suffix)) if suffix.eq_ignore_ascii_case(PERCENT_SUFFIX) => {
                Self::Percent(base)
            }
            _ => Self::Flat(key),
        }
    }
}

/// Named attribute totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatTotals(BTreeMap<String, f64>);

impl Default for StatTotals {
    fn default() -> Self {
        Self::base()
    }
}

impl StatTotals {
    pub fn base() -> Self {
        Self(BASE_STATS.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }

    /// Total for a stat; absent stats read as zero
    pub fn get(&self, stat: &str) -> f64 {
        self.0.get(stat).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Weighted power score, rounded half up
    pub fn power(&self) -> i64 {
        let raw: f64 = POWER_WEIGHTS
            .iter()
            .map(|(stat, weight)| self.get(stat) * weight)
            .sum();
        round_half_up(raw) as i64
    }
}

/// Totals plus the derived power value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSheet {
    pub totals: StatTotals,
    pub power: i64,
}

/// Fold the allocated nodes into a stat sheet. Unknown node ids are ignored.
pub fn compute<S: AsRef<str>>(catalog: &Catalog, allocated: &[S]) -> StatSheet {
    let mut totals = StatTotals::base();
    let mut percents: BTreeMap<String, f64> = BTreeMap::new();

    for node in allocated.iter().filter_map(|id| catalog.node(id.as_ref())) {
        for (key, value) in &node.effects {
            match EffectKey::parse(key) {
                EffectKey::Percent(base) => {
                    *percents.entry(base.to_string()).or_insert(0.0) += value;
                }
                EffectKey::Flat(stat) => {
                    *totals.0.entry(stat.to_string()).or_insert(0.0) += value;
                }
            }
        }
    }

    for (stat, percent) in percents {
        if let Some(total) = totals.0.get_mut(&stat) {
            *total = round_half_up(*total * (1.0 + percent / 100.0));
        }
    }

    let power = totals.power();
    StatSheet { totals, power }
}

/// Power only
pub fn power<S: AsRef<str>>(catalog: &Catalog, allocated: &[S]) -> i64 {
    compute(catalog, allocated).power
}

/// Render an effect map as "key: +value" pairs, percent keys suffixed with %
pub fn format_effects(effects: &BTreeMap<String, f64>) -> String {
    effects
        .iter()
        .map(|(key, value)| {
            let suffix = match EffectKey::parse(key) {
                EffectKey::Percent(_) => "%",
                EffectKey::Flat(_) => "",
            };
            format!("{key}: +{value}{suffix}")
        })
        .collect::<Vec<_>>()
        .join(" · ")
}
