//! # Planning Module
//!
//! Turns a generated [`DungeonGraph`](crate::DungeonGraph) into a
//! [`LevelPlan`]: which prefab and content every room gets, which doorways
//! join them, and how the dungeon links back to the level it was entered
//! from.

pub mod external;
pub mod plan;
pub mod planner;
pub mod pool;
pub mod settings;

pub use external::*;
pub use plan::*;
pub use planner::*;
pub use pool::*;
pub use settings::*;
