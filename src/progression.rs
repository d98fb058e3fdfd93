//! Progression Engine
//!
//! Experience accrual and the level curve. A single grant may cross several
//! thresholds; each crossing is a separate level-up with its own 1.15x
//! curve step, applied in sequence.

use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::constants::{round_half_up, POINTS_PER_LEVEL, XP_CURVE_GROWTH};

/// One level gained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub level: u32,
    pub points: u32,
    pub xp_to_next: u64,
}

/// Threshold after a level-up
pub fn next_threshold(xp_to_next: u64) -> u64 {
    round_half_up(xp_to_next as f64 * XP_CURVE_GROWTH) as u64
}

pub fn level_up(character: &mut Character) -> LevelUp {
    character.level = character.level.saturating_add(1);
    character.points = character.points.saturating_add(POINTS_PER_LEVEL);
    character.xp_to_next = next_threshold(character.xp_to_next);
    tracing::info!(
        character = %character.id,
        level = character.level,
        xp_to_next = character.xp_to_next,
        "level up"
    );
    LevelUp {
        level: character.level,
        points: character.points,
        xp_to_next: character.xp_to_next,
    }
}

/// Add experience and resolve every threshold crossed.
/// Xp saturates at `u64::MAX`; the curve reaches that ceiling too, so the
/// loop always ends.
pub fn gain_xp(character: &mut Character, amount: u64) -> Vec<LevelUp> {
    character.xp = character.xp.saturating_add(amount);
    let mut levels = Vec::new();
    while character.xp >= character.xp_to_next {
        character.xp -= character.xp_to_next;
        levels.push(level_up(character));
    }
    levels
}

/// Remove experience without ever going below zero or losing a level.
/// Returns the amount actually removed.
pub fn lose_xp(character: &mut Character, amount: u64) -> u64 {
    let lost = amount.min(character.xp);
    character.xp -= lost;
    lost
}
