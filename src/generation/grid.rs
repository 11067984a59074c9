//! # Dungeon Generation
//!
//! Grid random-walk generation of dungeon room graphs.
//!
//! Rooms grow outward from the spawn index one grid step at a time, each new
//! room joined to the room it grew from. That tree is then loosened with a
//! few extra doorways between neighbours, the deepest room becomes the boss
//! room, and the rest get weighted random content.

use crate::generation::utils;
use crate::{
    config, ContentTag, Direction, DungeonGraph, GenerationConfig, Generator, GridIndex,
    PlannerError, PlannerResult,
};
use log::debug;
use rand::{rngs::StdRng, Rng};
use std::collections::HashMap;

/// Dungeon generator that walks the room grid.
#[derive(Debug, Clone)]
pub struct GridDungeonGenerator {
    /// Strategy for choosing where the next room grows from
    pub growth_strategy: GrowthStrategy,
    /// Attempts per requested room before giving up
    pub max_placement_attempts: u32,
}

/// Strategies for growing the room layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrowthStrategy {
    /// Grow from any placed room, giving compact blob-like layouts
    Frontier,
    /// Mostly grow from the newest room, giving long winding layouts
    Corridor,
}

impl GridDungeonGenerator {
    /// Creates a new dungeon generator with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_planner::{GenerationConfig, Generator, GridDungeonGenerator};
    /// use dungeon_planner::generation::utils;
    ///
    /// let config = GenerationConfig::for_testing(3);
    /// let mut rng = utils::create_rng(&config);
    /// let dungeon = GridDungeonGenerator::new().generate(&config, &mut rng).unwrap();
    /// assert!(dungeon.len() >= 3);
    /// ```
    pub fn new() -> Self {
        Self {
            growth_strategy: GrowthStrategy::Frontier,
            max_placement_attempts: 50,
        }
    }

    /// Creates a generator producing long, corridor-like dungeons.
    pub fn winding() -> Self {
        Self {
            growth_strategy: GrowthStrategy::Corridor,
            max_placement_attempts: 100,
        }
    }

    /// Lays out room positions. Returns positions with the index of the room
    /// each one grew from.
    fn place_rooms(&self, target: usize, rng: &mut StdRng) -> Vec<(GridIndex, Option<usize>)> {
        let mut rooms = vec![(config::SPAWN_INDEX, None)];
        let mut occupied: HashMap<GridIndex, usize> = HashMap::from([(config::SPAWN_INDEX, 0)]);
        let max_attempts = self.max_placement_attempts as usize * target;

        for _ in 0..max_attempts {
            if rooms.len() >= target {
                break;
            }

            let from = match self.growth_strategy {
                GrowthStrategy::Frontier => rng.gen_range(0..rooms.len()),
                GrowthStrategy::Corridor if rng.gen_bool(0.75) => rooms.len() - 1,
                GrowthStrategy::Corridor => rng.gen_range(0..rooms.len()),
            };
            let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
            let candidate = rooms[from].0.step(direction);

            if occupied.contains_key(&candidate) {
                continue;
            }

            occupied.insert(candidate, rooms.len());
            rooms.push((candidate, Some(from)));
        }

        rooms
    }

    /// Picks content for each placed room: spawn is combat, the room furthest
    /// from spawn along the layout is the boss, the rest are weighted picks.
    fn assign_content(
        &self,
        rooms: &[(GridIndex, Option<usize>)],
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> PlannerResult<Vec<ContentTag>> {
        let mut depths = vec![0usize; rooms.len()];
        for (index, (_, parent)) in rooms.iter().enumerate() {
            if let Some(parent) = parent {
                depths[index] = depths[*parent] + 1;
            }
        }

        let boss = if rooms.len() > 1 {
            depths
                .iter()
                .enumerate()
                .max_by_key(|(_, depth)| **depth)
                .map(|(index, _)| index)
        } else {
            None
        };

        let mut contents = Vec::with_capacity(rooms.len());
        for index in 0..rooms.len() {
            let content = if index == 0 {
                ContentTag::Combat
            } else if Some(index) == boss {
                ContentTag::Boss
            } else {
                utils::pick_content(config, rng)?
            };
            contents.push(content);
        }
        Ok(contents)
    }
}

impl Generator<DungeonGraph> for GridDungeonGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> PlannerResult<DungeonGraph> {
        config.validate()?;

        let target = rng.gen_range(config.min_rooms..=config.max_rooms) as usize;
        let rooms = self.place_rooms(target, rng);
        if rooms.len() < config.min_rooms as usize {
            return Err(PlannerError::GenerationFailed(format!(
                "Placed only {} of at least {} rooms",
                rooms.len(),
                config.min_rooms
            )));
        }

        let contents = self.assign_content(&rooms, config, rng)?;

        let mut dungeon = DungeonGraph::new();
        let mut ids = Vec::with_capacity(rooms.len());
        for ((position, _), content) in rooms.iter().zip(contents) {
            ids.push(dungeon.add_room(*position, content)?);
        }

        // Layout tree
        for (index, (_, parent)) in rooms.iter().enumerate() {
            if let Some(parent) = parent {
                dungeon.connect(ids[*parent], ids[index])?;
            }
        }

        // Extra doorways; checking east and north visits each pair once
        let mut extra = 0;
        for (index, (position, _)) in rooms.iter().enumerate() {
            for direction in [Direction::East, Direction::North] {
                let Some(neighbour) = dungeon.room_at(position.step(direction)).map(|room| room.id) else {
                    continue;
                };
                if dungeon.are_connected(ids[index], neighbour) {
                    continue;
                }
                if rng.gen_bool(config.extra_connection_chance) {
                    dungeon.connect(ids[index], neighbour)?;
                    extra += 1;
                }
            }
        }

        debug!(
            "Generated {} rooms with {} doorways ({} extra)",
            dungeon.len(),
            dungeon.edge_count(),
            extra
        );

        self.validate(&dungeon, config)?;
        Ok(dungeon)
    }

    fn validate(&self, dungeon: &DungeonGraph, config: &GenerationConfig) -> PlannerResult<()> {
        dungeon.validate()?;

        if dungeon.room_at(config::SPAWN_INDEX).is_none() {
            return Err(PlannerError::MissingSpawnRoom(config::SPAWN_INDEX));
        }

        if dungeon.len() < config.min_rooms as usize || dungeon.len() > config.max_rooms as usize {
            return Err(PlannerError::GenerationFailed(format!(
                "Dungeon has {} rooms, expected {}..={}",
                dungeon.len(),
                config.min_rooms,
                config.max_rooms
            )));
        }

        let bosses = dungeon.rooms().filter(|room| room.content == ContentTag::Boss).count();
        if bosses > 1 {
            return Err(PlannerError::GenerationFailed(format!(
                "Dungeon has {} boss rooms",
                bosses
            )));
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "GridDungeonGenerator"
    }
}

impl Default for GridDungeonGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn reachable_rooms(dungeon: &DungeonGraph) -> usize {
        let spawn = dungeon.room_at(config::SPAWN_INDEX).unwrap().id;
        let mut seen = HashSet::from([spawn]);
        let mut stack = vec![spawn];
        while let Some(id) = stack.pop() {
            for (_, neighbour) in dungeon.neighbours(id) {
                if seen.insert(neighbour.id) {
                    stack.push(neighbour.id);
                }
            }
        }
        seen.len()
    }

    #[test]
    fn test_generator_creation() {
        let generator = GridDungeonGenerator::new();
        assert_eq!(generator.growth_strategy, GrowthStrategy::Frontier);
        assert_eq!(generator.generator_type(), "GridDungeonGenerator");
        assert_eq!(GridDungeonGenerator::winding().growth_strategy, GrowthStrategy::Corridor);
    }

    #[test]
    fn test_generation_with_small_dungeon() {
        let generator = GridDungeonGenerator::new();
        let config = GenerationConfig::for_testing(12345);
        let mut rng = utils::create_rng(&config);

        let dungeon = generator.generate(&config, &mut rng).unwrap();
        assert!(dungeon.len() >= 3 && dungeon.len() <= 6);
        assert_eq!(dungeon.room_at(config::SPAWN_INDEX).unwrap().content, ContentTag::Combat);
        assert_eq!(
            dungeon.rooms().filter(|room| room.content == ContentTag::Boss).count(),
            1
        );
        assert_eq!(reachable_rooms(&dungeon), dungeon.len());
        assert!(dungeon.edge_count() >= dungeon.len() - 1);
    }

    #[test]
    fn test_same_seed_same_dungeon() {
        let generator = GridDungeonGenerator::winding();
        let config = GenerationConfig::for_detailed_generation(777);

        let first = generator.generate(&config, &mut utils::create_rng(&config)).unwrap();
        let second = generator.generate(&config, &mut utils::create_rng(&config)).unwrap();

        let first_rooms: Vec<_> = first.rooms().cloned().collect();
        let second_rooms: Vec<_> = second.rooms().cloned().collect();
        assert_eq!(first_rooms, second_rooms);
    }

    #[test]
    fn test_single_room_dungeon_has_no_boss() {
        let mut config = GenerationConfig::for_testing(9);
        config.min_rooms = 1;
        config.max_rooms = 1;
        let mut rng = utils::create_rng(&config);

        let dungeon = GridDungeonGenerator::new().generate(&config, &mut rng).unwrap();
        assert_eq!(dungeon.len(), 1);
        assert_eq!(dungeon.edge_count(), 0);
        assert!(dungeon.rooms().all(|room| room.content != ContentTag::Boss));
    }

    #[test]
    fn test_boss_is_deepest_room() {
        let generator = GridDungeonGenerator::new();
        let config = GenerationConfig::for_testing(4);
        let mut rng = utils::create_rng(&config);

        let rooms = generator.place_rooms(5, &mut rng);
        let contents = generator.assign_content(&rooms, &config, &mut rng).unwrap();

        let mut depth = vec![0; rooms.len()];
        for (index, (_, parent)) in rooms.iter().enumerate() {
            if let Some(parent) = parent {
                depth[index] = depth[*parent] + 1;
            }
        }
        let boss = contents.iter().position(|c| *c == ContentTag::Boss).unwrap();
        assert_eq!(depth[boss], *depth.iter().max().unwrap());
    }

    #[test]
    fn test_validation_rejects_wrong_size() {
        let generator = GridDungeonGenerator::new();
        let config = GenerationConfig::for_testing(1);

        let mut dungeon = DungeonGraph::new();
        dungeon.add_room(config::SPAWN_INDEX, ContentTag::Combat).unwrap();
        assert!(generator.validate(&dungeon, &config).is_err());

        let empty = DungeonGraph::new();
        assert!(matches!(
            generator.validate(&empty, &config),
            Err(PlannerError::MissingSpawnRoom(_))
        ));
    }
}
