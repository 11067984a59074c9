//! # Level Plans
//!
//! The output of planning: placeholder areas, the entrances joining them,
//! and a distinguished spawn area. A downstream builder turns a
//! [`LevelPlan`] into real geometry.

use crate::{AreaPrefab, BlueprintGroup, Direction, EntrancePrefab, GridIndex, PlannerError, PlannerResult, Terrain};
use pathfinding::prelude::bfs_reach;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Index of an area inside its [`LevelPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AreaId(pub usize);

/// Placeholder for one area to be instantiated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanArea {
    /// Prefab the area is built from
    pub prefab: AreaPrefab,
    /// Content drawn for this area
    pub blueprint_group: BlueprintGroup,
    /// Grid index of the dungeon room this area stands for
    pub room_index: GridIndex,
    remaining_wall_entry_directions: BTreeSet<Direction>,
}

impl PlanArea {
    /// Creates an area with every wall slot of its prefab still free.
    pub fn new(prefab: AreaPrefab, blueprint_group: BlueprintGroup, room_index: GridIndex) -> Self {
        let remaining_wall_entry_directions = prefab.wall_entry_directions.clone();
        Self {
            prefab,
            blueprint_group,
            room_index,
            remaining_wall_entry_directions,
        }
    }

    /// Walls that do not hold an entrance yet.
    pub fn remaining_wall_entry_directions(&self) -> &BTreeSet<Direction> {
        &self.remaining_wall_entry_directions
    }

    /// Whether the wall facing `direction` can still take an entrance.
    pub fn has_wall_entry(&self, direction: Direction) -> bool {
        self.remaining_wall_entry_directions.contains(&direction)
    }

    fn consume_wall_entry(&mut self, direction: Direction) {
        self.remaining_wall_entry_directions.remove(&direction);
    }
}

/// One side of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanEntrance {
    /// An entrance to be built in a planned area
    Area { area: AreaId, prefab: EntrancePrefab },
    /// An existing entrance in an area outside the plan
    SubLevel { entrance: String, area: String },
}

impl PlanEntrance {
    pub fn area(area: AreaId, prefab: EntrancePrefab) -> Self {
        PlanEntrance::Area { area, prefab }
    }

    pub fn sub_level(entrance: impl Into<String>, area: impl Into<String>) -> Self {
        PlanEntrance::SubLevel {
            entrance: entrance.into(),
            area: area.into(),
        }
    }

    /// The planned area this entrance belongs to, if any.
    pub fn area_id(&self) -> Option<AreaId> {
        match self {
            PlanEntrance::Area { area, .. } => Some(*area),
            PlanEntrance::SubLevel { .. } => None,
        }
    }

    /// The entrance prefab to build, if any.
    pub fn prefab(&self) -> Option<&EntrancePrefab> {
        match self {
            PlanEntrance::Area { prefab, .. } => Some(prefab),
            PlanEntrance::SubLevel { .. } => None,
        }
    }
}

/// A doorway or passage between two entrances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConnection {
    pub first: PlanEntrance,
    pub second: PlanEntrance,
    /// Direction leading from `first` to `second`
    pub direction: Direction,
    /// Terrain the connection must be pinned to
    pub forced_terrain: Option<Terrain>,
}

impl PlanConnection {
    pub fn new(first: PlanEntrance, second: PlanEntrance, direction: Direction) -> Self {
        Self {
            first,
            second,
            direction,
            forced_terrain: None,
        }
    }

    pub fn with_forced_terrain(mut self, terrain: Terrain) -> Self {
        self.forced_terrain = Some(terrain);
        self
    }

    /// Whether this connection joins `a` and `b`, in either order.
    pub fn joins(&self, a: AreaId, b: AreaId) -> bool {
        let ends = (self.first.area_id(), self.second.area_id());
        ends == (Some(a), Some(b)) || ends == (Some(b), Some(a))
    }

    /// Whether either side belongs to `area`.
    pub fn touches(&self, area: AreaId) -> bool {
        self.first.area_id() == Some(area) || self.second.area_id() == Some(area)
    }
}

/// Areas and connections ready for a level builder.
///
/// The spawn area is always the first area. Areas are kept in discovery
/// order and connections in creation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelPlan {
    spawn_area: AreaId,
    areas: Vec<PlanArea>,
    connections: Vec<PlanConnection>,
    mob_generator: Option<String>,
}

impl LevelPlan {
    /// Starts a plan from its spawn area.
    pub fn new(spawn: PlanArea, mob_generator: Option<String>) -> Self {
        Self {
            spawn_area: AreaId(0),
            areas: vec![spawn],
            connections: Vec::new(),
            mob_generator,
        }
    }

    pub fn spawn_area(&self) -> AreaId {
        self.spawn_area
    }

    /// The spawn area, `None` only for a malformed deserialized plan.
    pub fn spawn(&self) -> Option<&PlanArea> {
        self.areas.get(self.spawn_area.0)
    }

    pub fn area(&self, id: AreaId) -> Option<&PlanArea> {
        self.areas.get(id.0)
    }

    pub fn areas(&self) -> &[PlanArea] {
        &self.areas
    }

    pub fn connections(&self) -> &[PlanConnection] {
        &self.connections
    }

    /// Mob generator the builder should run in the planned areas.
    pub fn mob_generator(&self) -> Option<&str> {
        self.mob_generator.as_deref()
    }

    /// Appends an area and returns its id.
    pub fn add_area(&mut self, area: PlanArea) -> AreaId {
        self.areas.push(area);
        AreaId(self.areas.len() - 1)
    }

    /// Appends a connection.
    ///
    /// The connection's direction is taken off the first area's free walls
    /// and the opposite direction off the second area's, so the same doorway
    /// is never offered twice. Fails without changing the plan when an area
    /// is unknown or the wall it needs already holds an entrance.
    pub fn add_connection(&mut self, connection: PlanConnection) -> PlannerResult<()> {
        let walls = Self::walls_used(&connection);
        for &(id, direction) in &walls {
            let area = self.areas.get(id.0).ok_or_else(|| {
                PlannerError::InvalidPlan(format!("Connection refers to unknown area {:?}", id))
            })?;
            if !area.has_wall_entry(direction) {
                return Err(PlannerError::InvalidPlan(format!(
                    "Area {:?} at {} has no free {:?} wall",
                    id, area.room_index, direction
                )));
            }
        }

        for (id, direction) in walls {
            self.areas[id.0].consume_wall_entry(direction);
        }

        self.connections.push(connection);
        Ok(())
    }

    /// The planned area walls a connection occupies.
    fn walls_used(connection: &PlanConnection) -> Vec<(AreaId, Direction)> {
        [
            connection.first.area_id().map(|id| (id, connection.direction)),
            connection.second.area_id().map(|id| (id, connection.direction.opposite())),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Connections with either side in `area`.
    pub fn connections_of(&self, area: AreaId) -> impl Iterator<Item = &PlanConnection> {
        self.connections.iter().filter(move |connection| connection.touches(area))
    }

    /// Connections joining `a` and `b`.
    pub fn connections_between(&self, a: AreaId, b: AreaId) -> impl Iterator<Item = &PlanConnection> {
        self.connections.iter().filter(move |connection| connection.joins(a, b))
    }

    /// Areas directly connected to `area`.
    pub fn neighbours(&self, area: AreaId) -> Vec<AreaId> {
        self.connections_of(area)
            .filter_map(|connection| match (connection.first.area_id(), connection.second.area_id()) {
                (Some(a), Some(b)) if a == area => Some(b),
                (Some(a), Some(b)) if b == area => Some(a),
                _ => None,
            })
            .collect()
    }

    /// Checks the structural invariants a builder relies on: the spawn area
    /// and connection endpoints exist, no wall holds two entrances, no pair
    /// of areas is joined twice, and every area can be reached from spawn.
    pub fn validate(&self) -> PlannerResult<()> {
        if self.spawn().is_none() {
            return Err(PlannerError::InvalidPlan(format!(
                "Spawn area {:?} is missing",
                self.spawn_area
            )));
        }

        let mut pairs = HashSet::new();
        let mut walls = HashSet::new();
        for connection in &self.connections {
            for id in [connection.first.area_id(), connection.second.area_id()].into_iter().flatten() {
                if id.0 >= self.areas.len() {
                    return Err(PlannerError::InvalidPlan(format!(
                        "Connection refers to unknown area {:?}",
                        id
                    )));
                }
            }

            for (id, direction) in Self::walls_used(connection) {
                if !walls.insert((id, direction)) {
                    return Err(PlannerError::InvalidPlan(format!(
                        "{:?} wall of area {:?} holds more than one entrance",
                        direction, id
                    )));
                }
            }

            if let (Some(a), Some(b)) = (connection.first.area_id(), connection.second.area_id()) {
                if !pairs.insert((a.min(b), a.max(b))) {
                    return Err(PlannerError::InvalidPlan(format!(
                        "Areas {:?} and {:?} are connected more than once",
                        a, b
                    )));
                }
            }
        }

        let reachable = bfs_reach(self.spawn_area, |&area| self.neighbours(area)).count();
        if reachable != self.areas.len() {
            return Err(PlannerError::InvalidPlan(format!(
                "Only {} of {} areas are reachable from spawn",
                reachable,
                self.areas.len()
            )));
        }

        Ok(())
    }
}
