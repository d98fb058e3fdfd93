//! Monte-Carlo Balance Simulation
//!
//! Runs many independent batch runs of one character on one map and reports
//! how often each encounter tier is beaten. Trials are spread across cores
//! with rayon; each trial gets its own character clone and dice seeded from
//! the base seed and the trial index, so a report is reproducible.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, EncounterTier, MapDef};
use crate::character::Character;
use crate::combat::{self, EncounterOutcome};
use crate::rng::{derive_seed, SeededDice};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub trials: u64,
    pub base_seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trials: 10_000,
            base_seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierStats {
    pub tier: EncounterTier,
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub map_id: String,
    pub trials: u64,
    pub starting_power: i64,
    pub tiers: Vec<TierStats>,
    /// Mean xp earned from victories per run
    pub mean_xp_gained: f64,
    pub mean_final_level: f64,
}

impl BalanceReport {
    pub fn win_rate(&self, tier: EncounterTier) -> Option<f64> {
        self.tiers.iter().find(|t| t.tier == tier).map(|t| t.win_rate)
    }
}

struct TrialResult {
    wins: Vec<bool>,
    xp_gained: u64,
    final_level: u32,
}

fn run_trial(catalog: &Catalog, character: &Character, map: &MapDef, seed: u64) -> TrialResult {
    let mut character = character.clone();
    let mut dice = SeededDice::from_seed(seed);
    let report = combat::run_map(&mut character, catalog, map, &mut dice);
    let xp_gained = report
        .encounters
        .iter()
        .map(|e| match e.outcome {
            EncounterOutcome::Victory { xp_gained, .. } => xp_gained,
            EncounterOutcome::Defeat { .. } => 0,
        })
        .sum();
    TrialResult {
        wins: report.encounters.iter().map(|e| e.is_victory()).collect(),
        xp_gained,
        final_level: character.level,
    }
}

/// Simulate `config.trials` batch runs in parallel
pub fn simulate(
    catalog: &Catalog,
    character: &Character,
    map: &MapDef,
    config: &SimConfig,
) -> BalanceReport {
    let _span = tracing::info_span!("balance", map = %map.id, trials = config.trials).entered();

    let results: Vec<TrialResult> = (0..config.trials)
        .into_par_iter()
        .map(|i| run_trial(catalog, character, map, derive_seed(config.base_seed, "trial", i)))
        .collect();

    let trials = results.len().max(1) as f64;
    let tiers = catalog
        .encounters()
        .iter()
        .enumerate()
        .map(|(i, encounter)| {
            let wins = results
                .iter()
                .filter(|r| r.wins.get(i).copied().unwrap_or(false))
                .count();
            TierStats {
                tier: encounter.tier,
                win_rate: wins as f64 / trials,
            }
        })
        .collect();

    let report = BalanceReport {
        map_id: map.id.clone(),
        trials: config.trials,
        starting_power: character.power(catalog),
        tiers,
        mean_xp_gained: results.iter().map(|r| r.xp_gained as f64).sum::<f64>() / trials,
        mean_final_level: results.iter().map(|r| r.final_level as f64).sum::<f64>() / trials,
    };
    tracing::info!(
        power = report.starting_power,
        mean_xp = report.mean_xp_gained,
        "balance simulation finished"
    );
    report
}
