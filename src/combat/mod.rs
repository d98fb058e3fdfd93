//! Combat Resolver
//!
//! Two alternative modes, selected by entry point:
//! - `batch::run_map`: auto-resolves the four encounter tiers in order
//! - `arena::Arena`: interactive grid with movement and melee attacks
//!
//! Only the arena has lasting state; it lives in `PlayState::Active` until
//! the last enemy falls or the player closes the map.

pub mod arena;
pub mod batch;

use serde::{Deserialize, Serialize};

pub use arena::{Arena, AttackOutcome, Direction, Enemy, GridPos};
pub use batch::{run_map, BatchReport, EncounterOutcome, EncounterResult};

/// Interactive play state machine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum PlayState {
    #[default]
    Inactive,
    Active(Arena),
}

impl PlayState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub fn arena(&self) -> Option<&Arena> {
        match self {
            Self::Active(arena) => Some(arena),
            Self::Inactive => None,
        }
    }

    pub fn arena_mut(&mut self) -> Option<&mut Arena> {
        match self {
            Self::Active(arena) => Some(arena),
            Self::Inactive => None,
        }
    }

    /// Back to Inactive, dropping player and enemy transient state
    pub fn finish(&mut self) -> Option<Arena> {
        match std::mem::take(self) {
            Self::Active(arena) => Some(arena),
            Self::Inactive => None,
        }
    }
}
