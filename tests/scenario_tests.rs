//! End-to-end session scenarios
//!
//! Drives `GameSession` the way a front end would and checks the state the
//! renderer and the store observe afterwards.

use passive_core::catalog::Catalog;
use passive_core::character::NodeState;
use passive_core::combat::{AttackOutcome, Direction};
use passive_core::constants::ROSTER_KEY;
use passive_core::rng::{ScriptedDice, SeededDice, SequentialIds};
use passive_core::session::{GameEvent, GameSession};
use passive_core::storage::{FileStore, KeyValueStore, MemoryStore};

fn session_with_store(store: Box<dyn KeyValueStore>, seed: u64) -> GameSession {
    GameSession::new(
        Catalog::standard(),
        store,
        Box::new(SeededDice::from_seed(seed)),
        Box::new(SequentialIds::new("hero")),
    )
}

// ============================================================
// Red character walkthrough
// ============================================================

#[test]
fn red_character_walkthrough() {
    let mut s = GameSession::in_memory(42);

    let c = s.create_character("Ash", "red").unwrap();
    assert_eq!(c.level, 1);
    assert_eq!(c.points, 1);
    assert_eq!(c.allocated, vec!["ember-core"]);
    assert_eq!(s.power(), 29);

    // flame-wheel multiplies dano 9 -> 9.9
    assert!(s.allocate("flame-wheel"));
    assert_eq!(s.power(), 30);
    assert_eq!(s.active().unwrap().points, 0);

    // blue branch is locked and there are no points left anyway
    assert!(!s.allocate("glacial-control"));
    assert_eq!(s.active().unwrap().allocated.len(), 2);

    let levels = s.gain_xp(70);
    assert_eq!(levels.len(), 1);
    let c = s.active().unwrap();
    assert_eq!(c.level, 2);
    assert_eq!(c.xp, 10);
    assert_eq!(c.xp_to_next, 69);
    assert_eq!(c.points, 1);

    // steel-frame needs both ember-core and verdant-core
    assert!(!s.allocate("steel-frame"));
    assert_eq!(s.active().unwrap().points, 1);
    let view = s.view();
    let steel = view.nodes.iter().find(|n| n.id == "steel-frame").unwrap();
    assert_eq!(steel.state, NodeState::Locked);
    // other class roots have no prerequisites and stay open
    let open: Vec<&str> = view
        .nodes
        .iter()
        .filter(|n| n.can_allocate)
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(open, vec!["sapphire-core", "verdant-core"]);
    let glacial = view.nodes.iter().find(|n| n.id == "glacial-control").unwrap();
    assert_eq!(glacial.state, NodeState::Locked);

    let events = s.drain_events();
    assert!(events.contains(&GameEvent::LevelUp { level: 2 }));
}

#[test]
fn batch_run_then_reload_from_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = session_with_store(Box::new(FileStore::new(dir.path())), 7);
    s.create_character("Rin", "blue").unwrap();
    s.allocate("arcane-burst");
    s.select_map("sapphire-caves");
    let report = s.run_map().unwrap();
    assert_eq!(report.encounters.len(), 4);
    let expected = s.active().unwrap().clone();

    let reopened = session_with_store(Box::new(FileStore::new(dir.path())), 8);
    assert_eq!(reopened.active(), Some(&expected));
    assert_eq!(
        reopened.active().unwrap().selected_map.as_deref(),
        Some("sapphire-caves")
    );
}

#[test]
fn roster_of_three_restores_first() {
    let mut s = GameSession::in_memory(1);
    s.create_character("Ash", "red").unwrap();
    s.create_character("Rin", "blue").unwrap();
    s.create_character("Ivy", "green").unwrap();
    let blob = s.roster().to_json().unwrap();

    let mut restored =
        session_with_store(Box::new(MemoryStore::with_entry(ROSTER_KEY, &blob)), 1);
    assert_eq!(restored.roster().len(), 3);
    assert_eq!(restored.active().unwrap().name, "Ash");
    // activation on startup is silent
    assert!(restored.drain_events().is_empty());
}

// ============================================================
// Interactive arena
// ============================================================

#[test]
fn arena_walk_and_fight() {
    let mut s = GameSession::new(
        Catalog::standard(),
        Box::new(MemoryStore::new()),
        Box::new(ScriptedDice::constant(0.0)),
        Box::new(SequentialIds::new("hero")),
    );
    s.create_character("Ivy", "green").unwrap();
    s.select_map("verdant-hollow");
    assert!(s.start_interactive());

    // constant 0.0 draws: normal at (0,0), the rest scanned along row 0
    let arena = s.play_state().arena().unwrap();
    assert_eq!(arena.enemies[0].position.x, 0);
    assert_eq!(arena.enemies[0].position.y, 0);

    assert!(matches!(
        s.attack(),
        Some(AttackOutcome::TooFar { .. })
    ));

    for _ in 0..6 {
        s.move_player(Direction::Up);
    }
    for _ in 0..5 {
        s.move_player(Direction::Left);
    }
    // standing on the magic enemy's cell; enemies never block
    let arena = s.play_state().arena().unwrap();
    assert_eq!(arena.player.y, 0);
    assert_eq!(arena.player.x, 1);

    let hp_before: i64 = arena.enemies.iter().map(|e| e.hp).sum();
    let outcome = s.attack().unwrap();
    assert!(matches!(
        outcome,
        AttackOutcome::Hit { .. } | AttackOutcome::Defeated { .. }
    ));
    let hp_after: i64 = s
        .play_state()
        .arena()
        .map(|a| a.enemies.iter().map(|e| e.hp).sum())
        .unwrap_or(0);
    assert!(hp_after < hp_before);

    assert!(s.close_map());
    assert!(!s.play_state().is_active());
    assert!(s.attack().is_none());
}

#[test]
fn deleting_active_character_mid_arena() {
    let mut s = GameSession::in_memory(5);
    s.create_character("Ash", "red").unwrap();
    s.select_map("ashes");
    s.start_interactive();
    let id = s.active().unwrap().id.clone();
    assert!(s.delete_character(&id));
    assert!(s.active().is_none());
    assert!(!s.play_state().is_active());
    assert!(s.view().character.is_none());
}
