//! Injected randomness for combat.
//!
//! Combat code never touches an ambient RNG: every draw goes through a
//! `Dice` implementation owned by the caller. `SeededDice` wraps xoshiro256++
//! so a seed reproduces a whole session; tests can substitute scripted dice.
//! Character ids are minted the same way, through an injected generator.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use sha3::{Digest, Sha3_256};

/// Source of uniform draws
pub trait Dice: Send + Sync {
    /// Uniform real in `[low, high)`
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Uniform integer in `[0, upper)`; 0 when `upper <= 1`
    fn below(&mut self, upper: i32) -> i32;
}

#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: Xoshiro256PlusPlus,
}

impl SeededDice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Xoshiro256PlusPlus::from_entropy(),
        }
    }
}

impl Dice for SeededDice {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + self.rng.gen::<f64>() * (high - low)
    }

    fn below(&mut self, upper: i32) -> i32 {
        if upper <= 1 {
            return 0;
        }
        self.rng.gen_range(0..upper)
    }
}

/// Deterministic sub-seed from a base seed, a label and an index
pub fn derive_seed(base_seed: u64, label: &str, index: u64) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(label.as_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}

/// Dice replaying fixed fractions in `[0, 1)`, cycling when exhausted.
///
/// `uniform` maps a fraction `f` to `low + f * (high - low)`; `below` maps it
/// to `floor(f * upper)`.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    fractions: Vec<f64>,
    cursor: usize,
}

impl ScriptedDice {
    pub fn new(fractions: Vec<f64>) -> Self {
        Self {
            fractions,
            cursor: 0,
        }
    }

    /// Every draw returns the same fraction
    pub fn constant(fraction: f64) -> Self {
        Self::new(vec![fraction])
    }

    fn next_fraction(&mut self) -> f64 {
        if self.fractions.is_empty() {
            return 0.0;
        }
        let f = self.fractions[self.cursor % self.fractions.len()];
        self.cursor += 1;
        f.clamp(0.0, 0.999_999)
    }
}

impl Dice for ScriptedDice {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_fraction() * (high - low)
    }

    fn below(&mut self, upper: i32) -> i32 {
        if upper <= 1 {
            return 0;
        }
        ((self.next_fraction() * upper as f64).floor() as i32).min(upper - 1)
    }
}

/// Mints character ids
pub trait IdGenerator: Send + Sync {
    fn generate(&mut self) -> String;
}

/// 32-hex-char ids from SHA3-256 over a salt and a counter
#[derive(Debug, Clone)]
pub struct HashIdGenerator {
    salt: u64,
    counter: u64,
}

impl HashIdGenerator {
    pub fn new(salt: u64) -> Self {
        Self { salt, counter: 0 }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }
}

impl IdGenerator for HashIdGenerator {
    fn generate(&mut self) -> String {
        self.counter += 1;
        let mut hasher = Sha3_256::new();
        hasher.update(self.salt.to_le_bytes());
        hasher.update(self.counter.to_le_bytes());
        hasher.finalize()[..16]
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

/// `prefix-1`, `prefix-2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
