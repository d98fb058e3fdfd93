//! Centralized game constants for the passive tree core.
//!
//! Catalog values (node effects, map difficulty, encounter rewards) live in
//! `catalog::data`; this file holds the formulas' fixed coefficients.

// =====================================================
// Stats
// =====================================================

/// Base totals before any passive node is folded in
pub const BASE_STATS: [(&str, f64); 8] = [
    ("vida", 50.0),
    ("mana", 30.0),
    ("dano", 5.0),
    ("magia", 5.0),
    ("agilidade", 5.0),
    ("evasao", 0.0),
    ("armadura", 0.0),
    ("veneno", 0.0),
];

/// Power weights: power = round(sum(total * weight))
pub const POWER_WEIGHTS: [(&str, f64); 6] = [
    ("dano", 1.2),
    ("magia", 1.3),
    ("agilidade", 0.9),
    ("veneno", 0.8),
    ("vida", 0.1),
    ("armadura", 0.15),
];

/// Effect key suffix marking a percentage multiplier (matched case-insensitively)
pub const PERCENT_SUFFIX: &str = "percent";

// =====================================================
// Progression
// =====================================================

/// Experience needed for the first level-up
pub const INITIAL_XP_TO_NEXT: u64 = 60;

/// Growth factor applied to xp_to_next on every level-up
pub const XP_CURVE_GROWTH: f64 = 1.15;

/// Skill points a new character starts with
pub const STARTING_POINTS: u32 = 1;

/// Skill points granted per level-up
pub const POINTS_PER_LEVEL: u32 = 1;

// =====================================================
// Batch combat
// =====================================================

/// Enemy power variance: U(ENEMY_ROLL_MIN, ENEMY_ROLL_MAX)
pub const ENEMY_ROLL_MIN: f64 = 0.8;
pub const ENEMY_ROLL_MAX: f64 = 1.4;

/// Player roll variance: U(PLAYER_ROLL_MIN, PLAYER_ROLL_MAX)
pub const PLAYER_ROLL_MIN: f64 = 0.85;
pub const PLAYER_ROLL_MAX: f64 = 1.2;

/// Fraction of the encounter reward lost on defeat
pub const DEFEAT_XP_DIVISOR: f64 = 3.0;

// =====================================================
// Interactive arena
// =====================================================

/// Arena side length in cells (square grid)
pub const ARENA_GRID: i32 = 12;

/// Enemy hp = round(base_difficulty * multiplier * ENEMY_HP_SCALE)
pub const ENEMY_HP_SCALE: f64 = 10.0;

/// Maximum Manhattan distance at which an attack connects
pub const ATTACK_RANGE: i32 = 2;

/// Attack damage variance: U(ATTACK_ROLL_MIN, ATTACK_ROLL_MAX)
pub const ATTACK_ROLL_MIN: f64 = 0.35;
pub const ATTACK_ROLL_MAX: f64 = 0.60;

/// Damage floor for a connecting attack
pub const MIN_ATTACK_DAMAGE: i64 = 4;

// =====================================================
// Persistence
// =====================================================

/// Well-known key the roster is stored under
pub const ROSTER_KEY: &str = "poe-characters";

/// Round half up (ties toward positive infinity).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
