//! Game Session
//!
//! The explicit state object every user action goes through. It owns the
//! active character, the roster and its store, the interactive play state,
//! the injected dice and id generator, and a feed of `GameEvent`s for the
//! front end to drain.
//!
//! Invalid actions never fail loudly: validation guards on creation return a
//! `CreationError` whose text is the status message, and eligibility guards
//! (points, prerequisites, range, missing map) degrade to a no-op or a log
//! event.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{Catalog, EncounterTier, PassiveNode};
use crate::character::{Character, NodeState};
use crate::combat::{self, Arena, AttackOutcome, BatchReport, Direction, EncounterOutcome, GridPos, PlayState};
use crate::command::PlayerCommand;
use crate::progression::{self, LevelUp};
use crate::rng::{Dice, IdGenerator, SeededDice, SequentialIds};
use crate::stats::{self, StatSheet};
use crate::storage::{KeyValueStore, MemoryStore, Roster};

/// Creation guard failures; `Display` is the user-facing status line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreationError {
    #[error("Enter a name and choose a class.")]
    MissingFields,
    #[error("A character with that name already exists.")]
    DuplicateName,
}

/// Append-only event feed entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CreationRejected(String),
    CharacterCreated { name: String, class_label: String },
    CharacterLoaded { name: String, class_label: String },
    CharacterDeleted { name: String, was_active: bool },
    NodeAllocated { node: String },
    LevelUp { level: u32 },
    MapSelected { map: String },
    MapNeedsSetup,
    EncounterWon {
        label: String,
        player_roll: i64,
        enemy_power: i64,
        xp: u64,
    },
    EncounterLost {
        label: String,
        player_roll: i64,
        enemy_power: i64,
        xp_lost: u64,
    },
    MapRunFinished { map: String, victories: usize, total: usize },
    ArenaEntered { map: String },
    AttackHit { label: String, tier: EncounterTier, damage: i64 },
    AttackTooFar { distance: i32 },
    NoEnemiesLeft,
    EnemyDefeated { label: String, xp: u64 },
    MapCleared { map: String },
    ArenaClosed { map: String },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreationRejected(status) => write!(f, "{status}"),
            Self::CharacterCreated { name, class_label } => {
                write!(f, "Character {name} created as {class_label}! Choose a map and advance.")
            }
            Self::CharacterLoaded { name, class_label } => {
                write!(f, "Loaded character {name} ({class_label}).")
            }
            Self::CharacterDeleted { name, was_active } => {
                if *was_active {
                    write!(f, "Deleted {name}. No active character; create or load one.")
                } else {
                    write!(f, "Deleted {name}.")
                }
            }
            Self::NodeAllocated { node } => write!(f, "You allocated {node}."),
            Self::LevelUp { level } => {
                write!(f, "Reached level {level}! You gained 1 tree point.")
            }
            Self::MapSelected { map } => write!(f, "Map selected: {map}."),
            Self::MapNeedsSetup => write!(f, "Create a character and choose a map."),
            Self::EncounterWon {
                label,
                player_roll,
                enemy_power,
                xp,
            } => write!(
                f,
                "Victory against {label} ({player_roll} vs {enemy_power}): +{xp} XP."
            ),
            Self::EncounterLost {
                label,
                player_roll,
                enemy_power,
                xp_lost,
            } => write!(
                f,
                "Defeat against {label} ({player_roll} vs {enemy_power}): -{xp_lost} XP."
            ),
            Self::MapRunFinished {
                map,
                victories,
                total,
            } => write!(f, "Run through {map} finished: {victories}/{total} victories."),
            Self::ArenaEntered { map } => write!(
                f,
                "Entered {map}. Defeat every enemy: move with WASD/arrows, attack with space."
            ),
            Self::AttackHit {
                label,
                tier,
                damage,
            } => write!(f, "Attack on {label} ({}): {damage} damage.", tier.as_str()),
            Self::AttackTooFar { distance } => write!(
                f,
                "Get closer to attack (max distance 2 cells, nearest is {distance})."
            ),
            Self::NoEnemiesLeft => write!(f, "No enemies left on this map."),
            Self::EnemyDefeated { label, xp } => write!(f, "You defeated a {label}! +{xp} XP."),
            Self::MapCleared { map } => write!(f, "Map {map} cleared!"),
            Self::ArenaClosed { map } => write!(f, "Left {map}."),
        }
    }
}

// =====================================================
// Read-only projection for the renderer
// =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub id: String,
    pub name: String,
    pub class_label: String,
    pub level: u32,
    pub xp: u64,
    pub xp_to_next: u64,
    pub points: u32,
    pub selected_map: Option<String>,
    pub stats: StatSheet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub effects: String,
    pub state: NodeState,
    pub can_allocate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub id: String,
    pub name: String,
    pub color: String,
    pub description: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
    pub class_name: String,
    pub level: u32,
    pub allocated: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub character: Option<CharacterSummary>,
    pub nodes: Vec<NodeView>,
    pub maps: Vec<MapView>,
    pub roster: Vec<RosterEntry>,
    pub arena: Option<Arena>,
}

pub struct GameSession {
    catalog: Catalog,
    active: Option<Character>,
    roster: Roster,
    store: Box<dyn KeyValueStore>,
    dice: Box<dyn Dice>,
    ids: Box<dyn IdGenerator>,
    play: PlayState,
    events: Vec<GameEvent>,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("active", &self.active)
            .field("roster", &self.roster.len())
            .field("play", &self.play.is_active())
            .finish()
    }
}

impl GameSession {
    /// Load the roster and silently activate its first record
    pub fn new(
        catalog: Catalog,
        store: Box<dyn KeyValueStore>,
        dice: Box<dyn Dice>,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        let roster = Roster::load(store.as_ref(), &catalog);
        let active = roster.first().cloned();
        if let Some(c) = &active {
            tracing::info!(id = %c.id, name = %c.name, "restored character from roster");
        }
        Self {
            catalog,
            active,
            roster,
            store,
            dice,
            ids,
            play: PlayState::Inactive,
            events: Vec::new(),
        }
    }

    /// Standard catalog, in-memory store, seeded dice, sequential ids
    pub fn in_memory(seed: u64) -> Self {
        Self::new(
            Catalog::standard(),
            Box::new(MemoryStore::new()),
            Box::new(SeededDice::from_seed(seed)),
            Box::new(SequentialIds::new("char")),
        )
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn active(&self) -> Option<&Character> {
        self.active.as_ref()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn play_state(&self) -> &PlayState {
        &self.play
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: GameEvent) {
        tracing::debug!(event = %event, "game event");
        self.events.push(event);
    }

    fn class_label(&self, class_id: &str) -> String {
        self.catalog
            .class(class_id)
            .map(|c| c.label.clone())
            .unwrap_or_else(|| class_id.to_string())
    }

    fn persist_current(&mut self) {
        let Some(active) = &self.active else {
            return;
        };
        self.roster.upsert(active.clone());
        self.save_roster();
    }

    fn save_roster(&mut self) {
        if let Err(e) = self.roster.save(self.store.as_mut()) {
            tracing::warn!(error = %e, "failed to save roster");
        }
    }

    // =====================================================
    // Roster operations
    // =====================================================

    pub fn create_character(&mut self, name: &str, class_id: &str) -> Result<&Character, CreationError> {
        let name = name.trim();
        let class = match self.catalog.class(class_id) {
            Some(class) if !name.is_empty() => class.clone(),
            _ => return Err(CreationError::MissingFields),
        };
        if self.roster.name_taken(name) {
            return Err(CreationError::DuplicateName);
        }

        let character = Character::new(self.ids.generate(), name, &class);
        tracing::info!(id = %character.id, name, class = %class.id, "character created");
        self.play.finish();
        self.roster.upsert(character.clone());
        self.save_roster();
        self.emit(GameEvent::CharacterCreated {
            name: name.to_string(),
            class_label: class.label.clone(),
        });
        Ok(&*self.active.insert(character))
    }

    /// Replace the in-memory character with a roster record
    pub fn load_character(&mut self, id: &str) -> bool {
        let Some(record) = self.roster.get(id).cloned() else {
            return false;
        };
        self.play.finish();
        let event = GameEvent::CharacterLoaded {
            name: record.name.clone(),
            class_label: self.class_label(&record.class_id),
        };
        self.active = Some(record);
        self.emit(event);
        true
    }

    /// Remove a record; clears the active character if it was this one
    pub fn delete_character(&mut self, id: &str) -> bool {
        let Some(removed) = self.roster.remove(id) else {
            return false;
        };
        self.save_roster();
        let was_active = self.active.as_ref().is_some_and(|c| c.id == id);
        if was_active {
            self.active = None;
            self.play.finish();
        }
        tracing::info!(id, was_active, "character deleted");
        self.emit(GameEvent::CharacterDeleted {
            name: removed.name,
            was_active,
        });
        true
    }

    // =====================================================
    // Tree, stats, progression
    // =====================================================

    pub fn stats(&self) -> StatSheet {
        match &self.active {
            Some(c) => c.stats(&self.catalog),
            None => stats::compute::<String>(&self.catalog, &[]),
        }
    }

    pub fn power(&self) -> i64 {
        self.stats().power
    }

    pub fn is_unlocked(&self, node: &PassiveNode) -> bool {
        match &self.active {
            Some(c) => c.is_unlocked(node),
            None => node.is_root(),
        }
    }

    /// Spend a point on a node; silent no-op when not eligible
    pub fn allocate(&mut self, node_id: &str) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        match active.allocate(&self.catalog, node_id) {
            Ok(node) => {
                let event = GameEvent::NodeAllocated {
                    node: node.name.clone(),
                };
                tracing::info!(node = node_id, points = active.points, "node allocated");
                self.emit(event);
                self.persist_current();
                true
            }
            Err(reason) => {
                tracing::debug!(node = node_id, %reason, "allocation ignored");
                false
            }
        }
    }

    pub fn gain_xp(&mut self, amount: u64) -> Vec<LevelUp> {
        let Some(active) = self.active.as_mut() else {
            return Vec::new();
        };
        let levels = progression::gain_xp(active, amount);
        for level in &levels {
            self.emit(GameEvent::LevelUp { level: level.level });
        }
        self.persist_current();
        levels
    }

    pub fn select_map(&mut self, map_id: &str) -> bool {
        let Some(map) = self.catalog.map(map_id) else {
            return false;
        };
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        active.selected_map = Some(map.id.clone());
        let event = GameEvent::MapSelected {
            map: map.name.clone(),
        };
        self.persist_current();
        self.emit(event);
        true
    }

    // =====================================================
    // Combat
    // =====================================================

    /// Auto-resolve the selected map's four encounters
    pub fn run_map(&mut self) -> Option<BatchReport> {
        let map = self
            .active
            .as_ref()
            .and_then(|c| c.selected_map.as_deref())
            .and_then(|id| self.catalog.map(id))
            .cloned();
        let Some(map) = map else {
            self.emit(GameEvent::MapNeedsSetup);
            return None;
        };
        let Some(active) = self.active.as_mut() else {
            return None;
        };

        let report = combat::run_map(active, &self.catalog, &map, self.dice.as_mut());
        for result in &report.encounters {
            match &result.outcome {
                EncounterOutcome::Victory { xp_gained, level_ups } => {
                    self.emit(GameEvent::EncounterWon {
                        label: result.label.clone(),
                        player_roll: result.player_roll,
                        enemy_power: result.enemy_power,
                        xp: *xp_gained,
                    });
                    for level in level_ups {
                        self.emit(GameEvent::LevelUp { level: level.level });
                    }
                }
                EncounterOutcome::Defeat { xp_lost } => {
                    self.emit(GameEvent::EncounterLost {
                        label: result.label.clone(),
                        player_roll: result.player_roll,
                        enemy_power: result.enemy_power,
                        xp_lost: *xp_lost,
                    });
                }
            }
        }
        self.emit(GameEvent::MapRunFinished {
            map: map.name.clone(),
            victories: report.victories(),
            total: report.encounters.len(),
        });
        self.persist_current();
        Some(report)
    }

    /// Enter the interactive arena for the selected map
    pub fn start_interactive(&mut self) -> bool {
        let map = self
            .active
            .as_ref()
            .and_then(|c| c.selected_map.as_deref())
            .and_then(|id| self.catalog.map(id))
            .cloned();
        let Some(map) = map else {
            self.emit(GameEvent::MapNeedsSetup);
            return false;
        };
        let arena = Arena::spawn(&self.catalog, &map, self.dice.as_mut());
        self.play = PlayState::Active(arena);
        self.emit(GameEvent::ArenaEntered { map: map.name });
        true
    }

    pub fn move_player(&mut self, direction: Direction) -> Option<GridPos> {
        self.play.arena_mut().map(|arena| arena.step(direction))
    }

    /// Attack the nearest enemy; ignored while no arena is active
    pub fn attack(&mut self) -> Option<AttackOutcome> {
        let power = self.power();
        let arena = self.play.arena_mut()?;
        let outcome = arena.attack(power, self.dice.as_mut());
        let cleared = arena.is_cleared();
        let map_name = arena.map_name.clone();

        match &outcome {
            AttackOutcome::NoEnemies => self.emit(GameEvent::NoEnemiesLeft),
            AttackOutcome::TooFar { distance } => {
                self.emit(GameEvent::AttackTooFar {
                    distance: *distance,
                })
            }
            AttackOutcome::Hit {
                label,
                tier,
                damage,
                ..
            } => self.emit(GameEvent::AttackHit {
                label: label.clone(),
                tier: *tier,
                damage: *damage,
            }),
            AttackOutcome::Defeated { enemy, damage } => {
                self.emit(GameEvent::AttackHit {
                    label: enemy.label.clone(),
                    tier: enemy.tier,
                    damage: *damage,
                });
                self.emit(GameEvent::EnemyDefeated {
                    label: enemy.label.clone(),
                    xp: enemy.xp,
                });
                self.gain_xp(enemy.xp);
            }
        }

        if cleared && matches!(outcome, AttackOutcome::Defeated { .. }) {
            self.play.finish();
            self.emit(GameEvent::MapCleared { map: map_name });
        }
        Some(outcome)
    }

    /// Leave the arena without clearing it
    pub fn close_map(&mut self) -> bool {
        match self.play.finish() {
            Some(arena) => {
                self.emit(GameEvent::ArenaClosed {
                    map: arena.map_name,
                });
                true
            }
            None => false,
        }
    }

    // =====================================================
    // Commands and views
    // =====================================================

    /// Route a front-end command to the matching operation
    pub fn apply(&mut self, command: &PlayerCommand) {
        match command {
            PlayerCommand::Create { name, class_id } => {
                if let Err(e) = self.create_character(name, class_id) {
                    self.emit(GameEvent::CreationRejected(e.to_string()));
                }
            }
            PlayerCommand::Load(id) => {
                self.load_character(id);
            }
            PlayerCommand::Delete(id) => {
                self.delete_character(id);
            }
            PlayerCommand::Allocate(node) => {
                self.allocate(node);
            }
            PlayerCommand::SelectMap(map) => {
                self.select_map(map);
            }
            PlayerCommand::RunMap => {
                self.run_map();
            }
            PlayerCommand::EnterMap => {
                self.start_interactive();
            }
            PlayerCommand::Move(direction) => {
                self.move_player(*direction);
            }
            PlayerCommand::Attack => {
                self.attack();
            }
            PlayerCommand::CloseMap => {
                self.close_map();
            }
        }
    }

    pub fn view(&self) -> SessionView {
        let character = self.active.as_ref().map(|c| CharacterSummary {
            id: c.id.clone(),
            name: c.name.clone(),
            class_label: self.class_label(&c.class_id),
            level: c.level,
            xp: c.xp,
            xp_to_next: c.xp_to_next,
            points: c.points,
            selected_map: c.selected_map.clone(),
            stats: c.stats(&self.catalog),
        });

        let nodes = self
            .catalog
            .nodes()
            .iter()
            .map(|node| {
                let (state, can_allocate) = match &self.active {
                    Some(c) => (c.node_state(node), c.can_allocate(node)),
                    None if node.is_root() => (NodeState::Available, false),
                    None => (NodeState::Locked, false),
                };
                NodeView {
                    id: node.id.clone(),
                    name: node.name.clone(),
                    description: node.description.clone(),
                    effects: stats::format_effects(&node.effects),
                    state,
                    can_allocate,
                }
            })
            .collect();

        let selected = self.active.as_ref().and_then(|c| c.selected_map.as_deref());
        let maps = self
            .catalog
            .maps()
            .iter()
            .map(|m| MapView {
                id: m.id.clone(),
                name: m.name.clone(),
                color: m.color.clone(),
                description: m.description.clone(),
                selected: selected == Some(m.id.as_str()),
            })
            .collect();

        let active_id = self.active.as_ref().map(|c| c.id.as_str());
        let roster = self
            .roster
            .records()
            .iter()
            .map(|r| RosterEntry {
                id: r.id.clone(),
                name: r.name.clone(),
                class_name: self
                    .catalog
                    .class(&r.class_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                level: r.level,
                allocated: r.allocated.len(),
                active: active_id == Some(r.id.as_str()),
            })
            .collect();

        SessionView {
            character,
            nodes,
            maps,
            roster,
            arena: self.play.arena().cloned(),
        }
    }
}
