//! # Planner Configuration
//!
//! Prefab references, content pools and the other inputs a
//! [`LevelPlanner`](crate::LevelPlanner) is built from.
//!
//! Everything here is plain data with serde support so callers can keep
//! planner setups in JSON files. The planner itself never touches the
//! filesystem; loading is the caller's job.

use crate::{ContentTag, Direction, GridIndex, PlannerError, PlannerResult, WeightedPool};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Opaque content descriptor assigned to a plan area.
///
/// The builder uses the name to look up the actual blueprints (mob layouts,
/// props, terrain variants) that fill an area.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlueprintGroup {
    pub name: String,
}

impl BlueprintGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Reference to the prefab every dungeon room is instantiated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaPrefab {
    /// Prefab name understood by the builder
    pub name: String,
    /// Walls of the prefab that can hold an entrance
    pub wall_entry_directions: BTreeSet<Direction>,
}

impl AreaPrefab {
    /// Creates a prefab with entrances allowed only on the given walls.
    pub fn new(name: impl Into<String>, wall_entry_directions: impl IntoIterator<Item = Direction>) -> Self {
        Self {
            name: name.into(),
            wall_entry_directions: wall_entry_directions.into_iter().collect(),
        }
    }

    /// Creates a prefab with an entrance slot on all four walls.
    pub fn with_full_perimeter(name: impl Into<String>) -> Self {
        Self::new(name, Direction::ALL)
    }
}

/// Reference to an entrance (doorway) prefab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntrancePrefab {
    pub name: String,
}

impl EntrancePrefab {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One weighted entry of a content pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedBlueprint {
    pub group: BlueprintGroup,
    pub weight: f64,
}

/// Blueprint candidates for every room of one content tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPoolConfig {
    pub content: ContentTag,
    pub blueprints: Vec<WeightedBlueprint>,
}

impl ContentPoolConfig {
    /// Creates a pool of `count` groups named `{prefix}_{n}`, all weighted 1.
    pub fn numbered(content: ContentTag, prefix: &str, count: usize) -> Self {
        Self {
            content,
            blueprints: (0..count)
                .map(|n| WeightedBlueprint {
                    group: BlueprintGroup::new(format!("{}_{:02}", prefix, n)),
                    weight: 1.0,
                })
                .collect(),
        }
    }

    /// Builds a fresh pool from this configuration.
    pub fn build(&self) -> PlannerResult<WeightedPool<BlueprintGroup>> {
        WeightedPool::new(
            self.blueprints
                .iter()
                .map(|entry| (entry.group.clone(), entry.weight))
                .collect(),
        )
    }
}

/// Weighted blueprint pools keyed by content tag.
///
/// Pools are consumed as the planner draws from them, so every planning run
/// needs its own instance; [`PlannerConfig::build_pools`] makes one.
#[derive(Debug, Clone, Default)]
pub struct ContentPools {
    pools: HashMap<ContentTag, WeightedPool<BlueprintGroup>>,
}

impl ContentPools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the pool for `content`, returning any pool it replaces.
    pub fn insert(
        &mut self,
        content: ContentTag,
        pool: WeightedPool<BlueprintGroup>,
    ) -> Option<WeightedPool<BlueprintGroup>> {
        self.pools.insert(content, pool)
    }

    pub fn get(&self, content: ContentTag) -> Option<&WeightedPool<BlueprintGroup>> {
        self.pools.get(&content)
    }

    pub fn contains(&self, content: ContentTag) -> bool {
        self.pools.contains_key(&content)
    }

    /// Gets the pool for `content`, or the `fallback` pool when no pool is
    /// registered for it.
    pub fn resolve_mut(
        &mut self,
        content: ContentTag,
        fallback: ContentTag,
    ) -> PlannerResult<&mut WeightedPool<BlueprintGroup>> {
        let key = if self.pools.contains_key(&content) {
            content
        } else {
            debug!(
                "No blueprint pool for {:?}, drawing from the {:?} pool instead",
                content, fallback
            );
            fallback
        };

        self.pools
            .get_mut(&key)
            .ok_or(PlannerError::MissingContentPool(content))
    }
}

impl FromIterator<(ContentTag, WeightedPool<BlueprintGroup>)> for ContentPools {
    fn from_iter<I: IntoIterator<Item = (ContentTag, WeightedPool<BlueprintGroup>)>>(iter: I) -> Self {
        Self {
            pools: iter.into_iter().collect(),
        }
    }
}

/// Everything a [`LevelPlanner`](crate::LevelPlanner) needs besides the
/// dungeon itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Blueprint candidates per content tag
    pub content_pools: Vec<ContentPoolConfig>,
    /// Tag whose pool stands in for tags without one
    pub fallback_content: ContentTag,
    /// Prefab used for every dungeon room
    pub area_prefab: AreaPrefab,
    /// Entrance between two ordinary rooms
    pub dungeon_entrance: EntrancePrefab,
    /// Entrance used when either side is a boss room
    pub boss_entrance: EntrancePrefab,
    /// Entrance placed in the spawn room to lead back to a sub level
    pub exit_entrance: EntrancePrefab,
    /// Grid index of the spawn room
    pub spawn_index: GridIndex,
    /// Mob generator the builder should run in every planned area
    pub mob_generator: Option<String>,
}

impl PlannerConfig {
    /// Creates the standard planner configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_planner::{ContentTag, PlannerConfig};
    ///
    /// let config = PlannerConfig::new();
    /// assert_eq!(config.fallback_content, ContentTag::Combat);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self {
            content_pools: vec![
                ContentPoolConfig::numbered(ContentTag::Combat, "combat", 32),
                ContentPoolConfig::numbered(ContentTag::Boss, "boss", 3),
                ContentPoolConfig::numbered(ContentTag::Treasure, "treasure", 12),
                ContentPoolConfig::numbered(ContentTag::Merchant, "merchant", 8),
                ContentPoolConfig::numbered(ContentTag::Rest, "rest", 8),
                ContentPoolConfig::numbered(ContentTag::Puzzle, "puzzle", 10),
            ],
            fallback_content: ContentTag::Combat,
            area_prefab: AreaPrefab::with_full_perimeter("dungeon_room"),
            dungeon_entrance: EntrancePrefab::new("dungeon_door"),
            boss_entrance: EntrancePrefab::new("boss_door"),
            exit_entrance: EntrancePrefab::new("exit_stairs"),
            spawn_index: crate::config::SPAWN_INDEX,
            mob_generator: Some("dungeon_mobs".to_string()),
        }
    }

    /// Creates a configuration for testing with small pools.
    ///
    /// Only combat, boss and treasure rooms get their own pools; every other
    /// tag draws from the combat pool.
    pub fn for_testing() -> Self {
        Self {
            content_pools: vec![
                ContentPoolConfig::numbered(ContentTag::Combat, "combat", 16),
                ContentPoolConfig::numbered(ContentTag::Boss, "boss", 1),
                ContentPoolConfig::numbered(ContentTag::Treasure, "treasure", 4),
            ],
            mob_generator: None,
            ..Self::new()
        }
    }

    /// Reads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> PlannerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parses and validates a configuration from JSON text.
    pub fn from_json(text: &str) -> PlannerResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> PlannerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that pools are unique per tag, weights are usable and the
    /// fallback tag has a pool.
    pub fn validate(&self) -> PlannerResult<()> {
        let mut seen = BTreeSet::new();
        for pool in &self.content_pools {
            if !seen.insert(pool.content) {
                return Err(PlannerError::InvalidConfig(format!(
                    "Content {:?} has more than one blueprint pool",
                    pool.content
                )));
            }
            pool.build()?;
        }

        if !seen.contains(&self.fallback_content) {
            return Err(PlannerError::MissingContentPool(self.fallback_content));
        }

        Ok(())
    }

    /// Builds fresh pools for one planning run.
    pub fn build_pools(&self) -> PlannerResult<ContentPools> {
        self.content_pools
            .iter()
            .map(|pool| pool.build().map(|built| (pool.content, built)))
            .collect()
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new()
    }
}
