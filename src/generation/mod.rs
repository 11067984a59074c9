//! # Generation Module
//!
//! Procedural generation of dungeon graphs to feed the planner.
//!
//! The planner only consumes a [`DungeonGraph`](crate::DungeonGraph); this
//! module holds the seeded generator the command line tool and the property
//! tests use to produce one.

pub mod grid;

pub use grid::*;

use crate::{ContentTag, PlannerError, PlannerResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Controls the size of generated dungeons, how often extra doorways close
/// loops, and how often each content tag shows up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Minimum number of rooms per dungeon
    pub min_rooms: u32,
    /// Maximum number of rooms per dungeon
    pub max_rooms: u32,
    /// Probability of a doorway between neighbouring rooms that the layout
    /// did not already join (0.0 to 1.0)
    pub extra_connection_chance: f64,
    /// Relative weights of the content tags given to ordinary rooms
    pub content_weights: Vec<(ContentTag, f64)>,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_planner::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert!(config.min_rooms >= 1);
    /// assert!(config.max_rooms >= config.min_rooms);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            min_rooms: crate::config::DEFAULT_MIN_ROOMS,
            max_rooms: crate::config::DEFAULT_MAX_ROOMS,
            extra_connection_chance: 0.2,
            content_weights: vec![
                (ContentTag::Combat, 6.0),
                (ContentTag::Treasure, 1.5),
                (ContentTag::Puzzle, 1.0),
                (ContentTag::Merchant, 0.5),
                (ContentTag::Rest, 0.5),
            ],
        }
    }

    /// Creates a configuration for testing with smaller, simpler dungeons.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            min_rooms: 3,
            max_rooms: 6,
            extra_connection_chance: 0.1,
            content_weights: vec![(ContentTag::Combat, 3.0), (ContentTag::Treasure, 1.0)],
        }
    }

    /// Creates a configuration for large, loop-heavy dungeons.
    pub fn for_detailed_generation(seed: u64) -> Self {
        Self {
            seed,
            min_rooms: 16,
            max_rooms: 28,
            extra_connection_chance: 0.35,
            ..Self::new(seed)
        }
    }

    /// Checks that the ranges and weights make sense.
    pub fn validate(&self) -> PlannerResult<()> {
        if self.min_rooms == 0 || self.min_rooms > self.max_rooms {
            return Err(PlannerError::InvalidConfig(format!(
                "Room range {}..={} is empty",
                self.min_rooms, self.max_rooms
            )));
        }
        if !(0.0..=1.0).contains(&self.extra_connection_chance) {
            return Err(PlannerError::InvalidConfig(format!(
                "Extra connection chance {} is not a probability",
                self.extra_connection_chance
            )));
        }
        if let Some(&(_, weight)) = self
            .content_weights
            .iter()
            .find(|(_, weight)| !weight.is_finite() || *weight <= 0.0)
        {
            return Err(PlannerError::InvalidWeight(weight));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> PlannerResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> PlannerResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Picks a content tag according to the configured weights.
    pub fn pick_content(config: &GenerationConfig, rng: &mut StdRng) -> PlannerResult<ContentTag> {
        config
            .content_weights
            .choose_weighted(rng, |(_, weight)| *weight)
            .map(|(content, _)| *content)
            .map_err(|err| PlannerError::GenerationFailed(format!("Cannot pick room content: {}", err)))
    }
}
