//! Property tests for planning over generated dungeons.

use dungeon_planner::{
    config, generation::utils, AreaId, ContentPoolConfig, ContentTag, DungeonGraph, GenerationConfig,
    Generator, GridDungeonGenerator, GridIndex, LevelPlan, LevelPlanner, PlannerConfig, WeightedPool,
};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::{HashMap, HashSet};

const ALL_CONTENT: [ContentTag; 6] = [
    ContentTag::Combat,
    ContentTag::Boss,
    ContentTag::Treasure,
    ContentTag::Merchant,
    ContentTag::Rest,
    ContentTag::Puzzle,
];

/// Planner config whose pools can cover every room of a dungeon this size.
fn roomy_config(rooms: usize) -> PlannerConfig {
    PlannerConfig {
        content_pools: ALL_CONTENT
            .iter()
            .map(|&tag| ContentPoolConfig::numbered(tag, &format!("{:?}", tag).to_lowercase(), rooms))
            .collect(),
        ..PlannerConfig::new()
    }
}

fn generate(seed: u64, winding: bool) -> DungeonGraph {
    let config = GenerationConfig::for_detailed_generation(seed);
    let generator = if winding {
        GridDungeonGenerator::winding()
    } else {
        GridDungeonGenerator::new()
    };
    generator
        .generate(&config, &mut utils::create_rng(&config))
        .expect("generation should succeed")
}

fn plan(dungeon: &DungeonGraph, seed: u64) -> LevelPlan {
    let config = roomy_config(dungeon.len());
    let mut pools = config.build_pools().expect("pools should build");
    let mut rng = StdRng::seed_from_u64(seed);
    LevelPlanner::new(&config)
        .create_initial_plan(dungeon, &mut pools, &[], &mut rng)
        .expect("planning should succeed")
        .plan
}

fn area_by_room(plan: &LevelPlan) -> HashMap<GridIndex, AreaId> {
    plan.areas()
        .iter()
        .enumerate()
        .map(|(index, area)| (area.room_index, AreaId(index)))
        .collect()
}

proptest! {
    #[test]
    fn every_room_is_planned_exactly_once(seed in any::<u64>(), winding in any::<bool>()) {
        let dungeon = generate(seed, winding);
        let plan = plan(&dungeon, seed);

        let planned: HashSet<GridIndex> = plan.areas().iter().map(|area| area.room_index).collect();
        prop_assert_eq!(planned.len(), plan.areas().len(), "no room planned twice");

        let rooms: HashSet<GridIndex> = dungeon.rooms().map(|room| room.position).collect();
        prop_assert_eq!(planned, rooms);
        prop_assert_eq!(plan.spawn().map(|area| area.room_index), Some(config::SPAWN_INDEX));
    }

    #[test]
    fn every_doorway_has_exactly_one_connection(seed in any::<u64>(), winding in any::<bool>()) {
        let dungeon = generate(seed, winding);
        let plan = plan(&dungeon, seed);
        let areas = area_by_room(&plan);

        prop_assert_eq!(plan.connections().len(), dungeon.edge_count());
        for room in dungeon.rooms() {
            for &neighbour in room.adjacent.values() {
                let other = dungeon.room(neighbour).unwrap();
                let count = plan
                    .connections_between(areas[&room.position], areas[&other.position])
                    .count();
                prop_assert_eq!(count, 1, "rooms {} and {}", room.position, other.position);
            }
        }
        prop_assert!(plan.validate().is_ok());
    }

    #[test]
    fn boss_doorways_use_boss_entrance(seed in any::<u64>()) {
        let dungeon = generate(seed, false);
        let plan = plan(&dungeon, seed);
        let areas = area_by_room(&plan);

        let bosses: HashSet<AreaId> = dungeon
            .rooms()
            .filter(|room| room.content == ContentTag::Boss)
            .map(|room| areas[&room.position])
            .collect();

        for connection in plan.connections() {
            let touches_boss = bosses.iter().any(|&boss| connection.touches(boss));
            let expected = if touches_boss { "boss_door" } else { "dungeon_door" };
            prop_assert_eq!(&connection.first.prefab().unwrap().name, expected);
            prop_assert_eq!(&connection.second.prefab().unwrap().name, expected);
        }
    }

    #[test]
    fn blueprint_groups_are_never_reused(seed in any::<u64>()) {
        let dungeon = generate(seed, true);
        let plan = plan(&dungeon, seed);

        let groups: HashSet<&str> = plan
            .areas()
            .iter()
            .map(|area| area.blueprint_group.name.as_str())
            .collect();
        prop_assert_eq!(groups.len(), plan.areas().len());
    }

    #[test]
    fn pool_draws_are_a_permutation(
        weights in prop::collection::vec(0.01f64..100.0, 1..20),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pool = WeightedPool::new(weights.iter().copied().enumerate().collect()).unwrap();

        let mut drawn: Vec<usize> = (0..weights.len()).map(|_| pool.draw(&mut rng).unwrap()).collect();
        drawn.sort_unstable();
        prop_assert_eq!(drawn, (0..weights.len()).collect::<Vec<_>>());
        prop_assert!(pool.draw(&mut rng).is_err());
    }

    #[test]
    fn oversized_batches_do_not_touch_the_pool(
        size in 0usize..10,
        extra in 1usize..5,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pool = WeightedPool::new((0..size).map(|n| (n, 1.0)).collect()).unwrap();

        prop_assert!(pool.draw_many(size + extra, &mut rng).is_err());
        prop_assert_eq!(pool.len(), size);
        prop_assert_eq!(pool.draw_many(size, &mut rng).unwrap().len(), size);
    }
}
