//! Interactive grid arena.
//!
//! A 12x12 field with the player at the center and one enemy per encounter
//! tier. Movement is orthogonal and clamped to the field; enemies never block.
//! Attacks target the nearest enemy by Manhattan distance (first in spawn
//! order on ties) and only connect within range 2.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, EncounterTier, MapDef};
use crate::constants::{
    round_half_up, ARENA_GRID, ATTACK_RANGE, ATTACK_ROLL_MAX, ATTACK_ROLL_MIN, ENEMY_HP_SCALE,
    MIN_ATTACK_DAMAGE,
};
use crate::rng::Dice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: GridPos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: String,
    pub tier: EncounterTier,
    pub label: String,
    pub position: GridPos,
    pub hp: i64,
    pub max_hp: i64,
    pub xp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttackOutcome {
    NoEnemies,
    TooFar {
        distance: i32,
    },
    Hit {
        target: String,
        tier: EncounterTier,
        label: String,
        damage: i64,
        remaining_hp: i64,
    },
    /// Target removed from the arena; its xp is still to be granted
    Defeated {
        enemy: Enemy,
        damage: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub map_id: String,
    pub map_name: String,
    pub grid: i32,
    pub player: GridPos,
    pub enemies: Vec<Enemy>,
}

/// Enemy hit points for a map/tier pair
pub fn enemy_hp(base_difficulty: f64, multiplier: f64) -> i64 {
    round_half_up(base_difficulty * multiplier * ENEMY_HP_SCALE) as i64
}

impl Arena {
    /// Player at the center, one enemy per tier on distinct free cells
    pub fn spawn(catalog: &Catalog, map: &MapDef, dice: &mut dyn Dice) -> Self {
        let grid = ARENA_GRID;
        let player = GridPos::new(grid / 2, grid / 2);
        let mut taken = vec![player];
        let mut enemies = Vec::with_capacity(catalog.encounters().len());

        for encounter in catalog.encounters() {
            let position = free_cell(grid, &taken, dice);
            taken.push(position);
            let hp = enemy_hp(map.base_difficulty, encounter.multiplier);
            enemies.push(Enemy {
                id: format!("{}-{}-{}", encounter.tier.as_str(), position.x, position.y),
                tier: encounter.tier,
                label: encounter.label.clone(),
                position,
                hp,
                max_hp: hp,
                xp: encounter.xp,
            });
        }

        tracing::info!(map = %map.id, enemies = enemies.len(), "arena spawned");
        Self {
            map_id: map.id.clone(),
            map_name: map.name.clone(),
            grid,
            player,
            enemies,
        }
    }

    /// Move one cell, clamped to the field
    pub fn step(&mut self, direction: Direction) -> GridPos {
        let (dx, dy) = direction.delta();
        self.player = GridPos::new(
            (self.player.x + dx).clamp(0, self.grid - 1),
            (self.player.y + dy).clamp(0, self.grid - 1),
        );
        self.player
    }

    /// Index and distance of the nearest enemy; earliest wins ties
    pub fn nearest(&self) -> Option<(usize, i32)> {
        self.enemies
            .iter()
            .enumerate()
            .map(|(i, e)| (i, e.position.manhattan(self.player)))
            .fold(None, |best, (i, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((i, d)),
            })
    }

    pub fn attack(&mut self, power: i64, dice: &mut dyn Dice) -> AttackOutcome {
        let Some((index, distance)) = self.nearest() else {
            return AttackOutcome::NoEnemies;
        };
        if distance > ATTACK_RANGE {
            return AttackOutcome::TooFar { distance };
        }

        let rolled = round_half_up(power as f64 * dice.uniform(ATTACK_ROLL_MIN, ATTACK_ROLL_MAX));
        let damage = (rolled as i64).max(MIN_ATTACK_DAMAGE);
        let target = &mut self.enemies[index];
        target.hp -= damage;

        if target.hp <= 0 {
            let enemy = self.enemies.remove(index);
            tracing::debug!(enemy = %enemy.id, damage, "enemy defeated");
            AttackOutcome::Defeated { enemy, damage }
        } else {
            AttackOutcome::Hit {
                target: target.id.clone(),
                tier: target.tier,
                label: target.label.clone(),
                damage,
                remaining_hp: target.hp,
            }
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.enemies.is_empty()
    }
}

/// Uniformly random cell not in `taken`, retried until free.
fn free_cell(grid: i32, taken: &[GridPos], dice: &mut dyn Dice) -> GridPos {
    // scripted dice can repeat the same cell forever; bail out to a scan
    let max_attempts = grid * grid * 8;
    for _ in 0..max_attempts {
        let candidate = GridPos::new(dice.below(grid), dice.below(grid));
        if !taken.contains(&candidate) {
            return candidate;
        }
    }
    (0..grid)
        .flat_map(|y| (0..grid).map(move |x| GridPos::new(x, y)))
        .find(|cell| !taken.contains(cell))
        .unwrap_or(GridPos::new(0, 0))
}
