//! Property-based tests using proptest
//!
//! Invariants that must hold for all inputs:
//! - Stats: power is non-negative and a pure function of the allocated set
//! - Allocation: points never go negative, nodes never duplicate, locked
//!   nodes never get bought
//! - Progression: xp stays below the threshold after every gain
//! - Combat: batch runs always resolve four encounters; arena spawns are
//!   distinct and out-of-range attacks change nothing

use proptest::prelude::*;

use passive_core::catalog::Catalog;
use passive_core::character::Character;
use passive_core::combat::{self, Arena, AttackOutcome, Direction, GridPos};
use passive_core::progression;
use passive_core::rng::SeededDice;
use passive_core::stats;

const CLASSES: [&str; 3] = ["red", "blue", "green"];

fn node_ids(catalog: &Catalog) -> Vec<String> {
    catalog.nodes().iter().map(|n| n.id.clone()).collect()
}

fn fresh(catalog: &Catalog, class_index: usize) -> Character {
    let class = catalog.class(CLASSES[class_index % 3]).unwrap();
    Character::new("prop", "Prop", class)
}

// ============================================================
// Stat Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_power_non_negative(mask in 0u32..512) {
        let catalog = Catalog::standard();
        let ids = node_ids(&catalog);
        let allocated: Vec<&String> = ids
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, id)| id)
            .collect();
        prop_assert!(stats::power(&catalog, &allocated) >= 0);
    }

    #[test]
    fn prop_power_independent_of_order(mask in 0u32..512, seed in any::<u64>()) {
        let catalog = Catalog::standard();
        let ids = node_ids(&catalog);
        let mut allocated: Vec<String> = ids
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, id)| id.clone())
            .collect();
        let forward = stats::compute(&catalog, &allocated);
        let rotate = (seed as usize) % allocated.len().max(1);
        allocated.rotate_left(rotate);
        allocated.reverse();
        prop_assert_eq!(forward, stats::compute(&catalog, &allocated));
    }
}

// ============================================================
// Allocation Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_allocation_keeps_invariants(
        class_index in 0usize..3,
        points in 0u32..6,
        attempts in prop::collection::vec(0usize..12, 0..30),
    ) {
        let catalog = Catalog::standard();
        let ids = node_ids(&catalog);
        let mut c = fresh(&catalog, class_index);
        c.points = points;

        for attempt in attempts {
            // indices past the catalog stand in for unknown ids
            let id = ids.get(attempt).cloned().unwrap_or_else(|| format!("ghost-{attempt}"));
            let before = c.clone();
            let unlocked = catalog.node(&id).map(|n| c.is_unlocked(n));
            match c.allocate(&catalog, &id) {
                Ok(_) => {
                    prop_assert_eq!(unlocked, Some(true));
                    prop_assert_eq!(c.points + 1, before.points);
                    prop_assert_eq!(c.allocated.len(), before.allocated.len() + 1);
                }
                Err(_) => prop_assert_eq!(&c, &before),
            }
        }

        let mut sorted = c.allocated.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), c.allocated.len());
        for id in &c.allocated {
            let node = catalog.node(id).unwrap();
            prop_assert!(node.requires.iter().all(|r| c.has_node(r)));
        }
    }

    #[test]
    fn prop_locked_node_never_allocatable(class_index in 0usize..3, points in 1u32..100) {
        let catalog = Catalog::standard();
        let mut c = fresh(&catalog, class_index);
        c.points = points;
        for node in catalog.nodes() {
            if !c.is_unlocked(node) {
                prop_assert!(!c.can_allocate(node));
                prop_assert!(c.clone().allocate(&catalog, &node.id).is_err());
            }
        }
    }
}

// ============================================================
// Progression Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_xp_below_threshold_after_gain(gains in prop::collection::vec(0u64..2_000, 1..20)) {
        let catalog = Catalog::standard();
        let mut c = fresh(&catalog, 0);
        let mut total_levels = 0;
        for gain in gains {
            let level_before = c.level;
            let ups = progression::gain_xp(&mut c, gain);
            prop_assert!(c.xp < c.xp_to_next);
            prop_assert_eq!(c.level, level_before + ups.len() as u32);
            total_levels += ups.len() as u32;
        }
        prop_assert_eq!(c.points, 1 + total_levels);
    }

    #[test]
    fn prop_threshold_strictly_increases(start in 4u64..10_000) {
        prop_assert!(progression::next_threshold(start) > start);
    }

    #[test]
    fn prop_losing_xp_never_underflows(xp in 0u64..59, loss in 0u64..200) {
        let catalog = Catalog::standard();
        let mut c = fresh(&catalog, 1);
        c.xp = xp;
        let lost = progression::lose_xp(&mut c, loss);
        prop_assert_eq!(c.xp, xp.saturating_sub(loss));
        prop_assert_eq!(lost, xp.min(loss));
        prop_assert_eq!(c.level, 1);
    }
}

// ============================================================
// Combat Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_batch_always_four_encounters(seed in any::<u64>(), class_index in 0usize..3, map_index in 0usize..3) {
        let catalog = Catalog::standard();
        let map = catalog.maps()[map_index].clone();
        let mut c = fresh(&catalog, class_index);
        let mut dice = SeededDice::from_seed(seed);
        let report = combat::run_map(&mut c, &catalog, &map, &mut dice);
        prop_assert_eq!(report.encounters.len(), 4);
        prop_assert!(c.xp < c.xp_to_next);
        prop_assert!(c.level >= 1);
    }

    #[test]
    fn prop_spawn_cells_distinct(seed in any::<u64>(), map_index in 0usize..3) {
        let catalog = Catalog::standard();
        let map = &catalog.maps()[map_index];
        let arena = Arena::spawn(&catalog, map, &mut SeededDice::from_seed(seed));
        let mut cells: Vec<GridPos> = arena.enemies.iter().map(|e| e.position).collect();
        cells.push(arena.player);
        for cell in &cells {
            prop_assert!((0..arena.grid).contains(&cell.x));
            prop_assert!((0..arena.grid).contains(&cell.y));
        }
        cells.sort_by_key(|c| (c.x, c.y));
        cells.dedup();
        prop_assert_eq!(cells.len(), 5);
    }

    #[test]
    fn prop_moves_stay_in_grid(seed in any::<u64>(), moves in prop::collection::vec(0u8..4, 0..60)) {
        let catalog = Catalog::standard();
        let map = &catalog.maps()[0];
        let mut arena = Arena::spawn(&catalog, map, &mut SeededDice::from_seed(seed));
        for m in moves {
            let direction = match m {
                0 => Direction::Up,
                1 => Direction::Down,
                2 => Direction::Left,
                _ => Direction::Right,
            };
            let pos = arena.step(direction);
            prop_assert!((0..arena.grid).contains(&pos.x));
            prop_assert!((0..arena.grid).contains(&pos.y));
        }
    }

    #[test]
    fn prop_out_of_range_attack_is_noop(seed in any::<u64>(), power in 0i64..500) {
        let catalog = Catalog::standard();
        let map = &catalog.maps()[0];
        let mut dice = SeededDice::from_seed(seed);
        let mut arena = Arena::spawn(&catalog, map, &mut dice);
        let nearest = arena.nearest().map(|(_, d)| d).unwrap_or(0);
        let before = arena.clone();
        let outcome = arena.attack(power, &mut dice);
        if nearest > 2 {
            prop_assert_eq!(outcome, AttackOutcome::TooFar { distance: nearest });
            prop_assert_eq!(arena, before);
        } else {
            let dealt = match outcome {
                AttackOutcome::Hit { damage, .. } | AttackOutcome::Defeated { damage, .. } => damage,
                other => return Err(TestCaseError::fail(format!("unexpected {other:?}"))),
            };
            prop_assert!(dealt >= 4);
        }
    }
}
