//! Batch encounter resolution: one roll-off per tier, always all four.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, EncounterTier, MapDef};
use crate::character::Character;
use crate::constants::{
    round_half_up, DEFEAT_XP_DIVISOR, ENEMY_ROLL_MAX, ENEMY_ROLL_MIN, PLAYER_ROLL_MAX,
    PLAYER_ROLL_MIN,
};
use crate::progression::{self, LevelUp};
use crate::rng::Dice;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncounterOutcome {
    Victory {
        xp_gained: u64,
        level_ups: Vec<LevelUp>,
    },
    Defeat {
        xp_lost: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterResult {
    pub tier: EncounterTier,
    pub label: String,
    /// Power at the moment of this encounter
    pub power: i64,
    pub enemy_power: i64,
    pub player_roll: i64,
    pub outcome: EncounterOutcome,
}

impl EncounterResult {
    pub fn is_victory(&self) -> bool {
        matches!(self.outcome, EncounterOutcome::Victory { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub map_id: String,
    pub encounters: Vec<EncounterResult>,
}

impl BatchReport {
    pub fn victories(&self) -> usize {
        self.encounters.iter().filter(|e| e.is_victory()).count()
    }

    pub fn levels_gained(&self) -> usize {
        self.encounters
            .iter()
            .map(|e| match &e.outcome {
                EncounterOutcome::Victory { level_ups, .. } => level_ups.len(),
                EncounterOutcome::Defeat { .. } => 0,
            })
            .sum()
    }
}

/// XP removed by a defeat against an encounter worth `reward`
pub fn defeat_penalty(reward: u64) -> u64 {
    round_half_up(reward as f64 / DEFEAT_XP_DIVISOR) as u64
}

/// Resolve every encounter tier of `map` in order, mutating the character.
pub fn run_map(
    character: &mut Character,
    catalog: &Catalog,
    map: &MapDef,
    dice: &mut dyn Dice,
) -> BatchReport {
    run_map_with(character, catalog, map, dice, |c| c.power(catalog))
}

/// `run_map` with the power source supplied by the caller. `power_of` is
/// asked once per encounter, after the previous encounter has been applied.
fn run_map_with(
    character: &mut Character,
    catalog: &Catalog,
    map: &MapDef,
    dice: &mut dyn Dice,
    mut power_of: impl FnMut(&Character) -> i64,
) -> BatchReport {
    let _span = tracing::info_span!("run_map", map = %map.id, character = %character.id).entered();
    let mut encounters = Vec::with_capacity(catalog.encounters().len());

    for encounter in catalog.encounters() {
        let power = power_of(character);
        let enemy_power = round_half_up(
            map.base_difficulty * encounter.multiplier * dice.uniform(ENEMY_ROLL_MIN, ENEMY_ROLL_MAX),
        ) as i64;
        let player_roll =
            round_half_up(power as f64 * dice.uniform(PLAYER_ROLL_MIN, PLAYER_ROLL_MAX)) as i64;

        let outcome = if player_roll >= enemy_power {
            let level_ups = progression::gain_xp(character, encounter.xp);
            EncounterOutcome::Victory {
                xp_gained: encounter.xp,
                level_ups,
            }
        } else {
            let xp_lost = progression::lose_xp(character, defeat_penalty(encounter.xp));
            EncounterOutcome::Defeat { xp_lost }
        };

        tracing::debug!(
            tier = encounter.tier.as_str(),
            power,
            enemy_power,
            player_roll,
            victory = player_roll >= enemy_power,
            "encounter resolved"
        );

        encounters.push(EncounterResult {
            tier: encounter.tier,
            label: encounter.label.clone(),
            power,
            enemy_power,
            player_roll,
            outcome,
        });
    }

    BatchReport {
        map_id: map.id.clone(),
        encounters,
    }
}
