//! # Dungeon Planner
//!
//! Turns abstract, graph-shaped dungeon layouts into level plans that a
//! level builder can instantiate.
//!
//! ## Architecture Overview
//!
//! - **Dungeon**: the room graph consumed by the planner (rooms on an integer
//!   grid, content tags, symmetric adjacency)
//! - **Generation**: seeded grid generator producing dungeon graphs
//! - **Planning**: weighted content pools, the level plan arena, and the
//!   breadth-first planner that fills it
//!
//! Data flows one way: dungeon graph → planner (drawing from content pools)
//! → level plan → external builder. Planning is synchronous and performs no
//! I/O.

pub mod dungeon;
pub mod generation;
pub mod planning;

// Core module re-exports
pub use dungeon::*;
pub use generation::*;
pub use planning::*;

/// Core error type for the dungeon planner.
#[derive(thiserror::Error, Debug)]
pub enum PlannerError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A pool was drawn from after its last candidate was taken
    #[error("Weighted pool is exhausted")]
    ExhaustedPool,

    /// A batch draw asked for more candidates than the pool holds
    #[error("Requested {requested} candidates but only {available} remain")]
    InsufficientCandidates { requested: usize, available: usize },

    /// Pool weights must be finite and positive
    #[error("Invalid pool weight: {0}")]
    InvalidWeight(f64),

    /// Neither the content tag nor the fallback tag has a pool
    #[error("No blueprint pool for {0:?} and no fallback pool")]
    MissingContentPool(ContentTag),

    /// The dungeon has no room at the spawn index
    #[error("No spawn room at {0}")]
    MissingSpawnRoom(GridIndex),

    /// Dungeon graph is malformed
    #[error("Invalid dungeon graph: {0}")]
    InvalidGraph(String),

    /// A sub-level entrance is not inside its own area's grid
    #[error("Entrance {entrance} lies outside area {area}")]
    EntranceOutsideArea { entrance: String, area: String },

    /// More sub-level entrances were supplied than a dungeon plan supports
    #[error("Cannot link {count} sub level entrances, at most 1 is supported")]
    UnsupportedMultipleExternalEntrances { count: usize },

    /// The spawn wall a sub-level entrance would attach to already holds a doorway
    #[error("Spawn area {wall:?} wall already holds an entrance, sub level link skipped")]
    SpawnWallOccupied { wall: Direction },

    /// Level plan breaks a structural invariant
    #[error("Invalid level plan: {0}")]
    InvalidPlan(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type used throughout the dungeon planner.
pub type PlannerResult<T> = Result<T, PlannerError>;

/// Version information for the planner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Planner configuration constants.
pub mod config {
    use crate::GridIndex;

    /// Grid index of the spawn room in generated dungeons
    pub const SPAWN_INDEX: GridIndex = GridIndex { x: 0, y: 0 };

    /// Default minimum number of rooms per dungeon
    pub const DEFAULT_MIN_ROOMS: u32 = 8;

    /// Default maximum number of rooms per dungeon
    pub const DEFAULT_MAX_ROOMS: u32 = 14;
}
