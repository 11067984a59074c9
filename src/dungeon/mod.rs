//! # Dungeon Module
//!
//! The abstract dungeon layout consumed by the planner.
//!
//! A [`DungeonGraph`] is a set of rooms sitting on an integer grid. Each room
//! carries a [`ContentTag`] describing its gameplay purpose and knows which
//! rooms sit next to it in each cardinal [`Direction`]. Rooms live in a flat
//! arena and refer to each other by [`RoomId`], so the graph has no ownership
//! cycles even though adjacency is symmetric.

use crate::{PlannerError, PlannerResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Integer coordinates of a room on the dungeon grid.
///
/// # Examples
///
/// ```
/// use dungeon_planner::GridIndex;
///
/// let a = GridIndex::new(1, 0);
/// let b = GridIndex::new(2, 0);
/// assert_eq!(b - a, GridIndex::new(1, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridIndex {
    pub x: i32,
    pub y: i32,
}

impl GridIndex {
    /// Creates a new grid index.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin index (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Returns the index one step away in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        self + direction.offset()
    }

    /// Returns the 4 cardinal neighbours of this index.
    pub fn cardinal_neighbours(self) -> [GridIndex; 4] {
        Direction::ALL.map(|direction| self.step(direction))
    }
}

impl std::ops::Add for GridIndex {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for GridIndex {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for GridIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal directions between neighbouring rooms.
///
/// The grid is y-up: `North` is `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four directions, clockwise from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Converts a direction to its unit grid offset.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_planner::{Direction, GridIndex};
    ///
    /// assert_eq!(Direction::North.offset(), GridIndex::new(0, 1));
    /// assert_eq!(Direction::West.offset(), GridIndex::new(-1, 0));
    /// ```
    pub fn offset(self) -> GridIndex {
        match self {
            Direction::North => GridIndex::new(0, 1),
            Direction::East => GridIndex::new(1, 0),
            Direction::South => GridIndex::new(0, -1),
            Direction::West => GridIndex::new(-1, 0),
        }
    }

    /// Converts a unit grid offset back into a direction.
    ///
    /// Returns `None` for anything that is not one of the four cardinal unit
    /// vectors.
    pub fn from_offset(offset: GridIndex) -> Option<Direction> {
        match (offset.x, offset.y) {
            (0, 1) => Some(Direction::North),
            (1, 0) => Some(Direction::East),
            (0, -1) => Some(Direction::South),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }

    /// Returns the opposite direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Gameplay purpose assigned to a room by the dungeon generator.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ContentTag {
    /// Standard fight room, also the default content
    #[default]
    Combat,
    /// Room with the level boss
    Boss,
    /// Room containing treasure or valuable items
    Treasure,
    /// Shop or merchant room
    Merchant,
    /// Safe rest area
    Rest,
    /// Puzzle or challenge room
    Puzzle,
}

/// Index of a room inside its [`DungeonGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub usize);

/// A single room of a generated dungeon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonRoom {
    /// Arena index of this room
    pub id: RoomId,
    /// Position of the room on the dungeon grid
    pub position: GridIndex,
    /// Type/purpose of this room
    pub content: ContentTag,
    /// Neighbouring rooms keyed by the direction leading to them
    pub adjacent: BTreeMap<Direction, RoomId>,
}

impl DungeonRoom {
    /// Creates an unconnected room.
    pub fn new(id: RoomId, position: GridIndex, content: ContentTag) -> Self {
        Self {
            id,
            position,
            content,
            adjacent: BTreeMap::new(),
        }
    }

    /// Gets the neighbour in `direction`, if any.
    pub fn neighbour(&self, direction: Direction) -> Option<RoomId> {
        self.adjacent.get(&direction).copied()
    }
}

/// Rooms plus symmetric adjacency, as produced by a dungeon generator.
///
/// # Examples
///
/// ```
/// use dungeon_planner::{ContentTag, DungeonGraph, GridIndex, Direction};
///
/// let mut dungeon = DungeonGraph::new();
/// let a = dungeon.add_room(GridIndex::new(0, 0), ContentTag::Combat).unwrap();
/// let b = dungeon.add_room(GridIndex::new(1, 0), ContentTag::Boss).unwrap();
/// assert_eq!(dungeon.connect(a, b).unwrap(), Direction::East);
/// assert_eq!(dungeon.room(b).unwrap().neighbour(Direction::West), Some(a));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DungeonGraph {
    rooms: Vec<DungeonRoom>,
    by_position: HashMap<GridIndex, RoomId>,
}

impl DungeonGraph {
    /// Creates an empty dungeon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an unconnected room at `position`.
    pub fn add_room(&mut self, position: GridIndex, content: ContentTag) -> PlannerResult<RoomId> {
        if self.by_position.contains_key(&position) {
            return Err(PlannerError::InvalidGraph(format!(
                "Room already exists at {}",
                position
            )));
        }

        let id = RoomId(self.rooms.len());
        self.rooms.push(DungeonRoom::new(id, position, content));
        self.by_position.insert(position, id);
        Ok(id)
    }

    /// Connects two rooms that sit next to each other on the grid.
    ///
    /// Both rooms record the other, so adjacency stays symmetric. Returns the
    /// direction leading from `a` to `b`.
    pub fn connect(&mut self, a: RoomId, b: RoomId) -> PlannerResult<Direction> {
        let a_pos = self.require(a)?.position;
        let b_pos = self.require(b)?.position;

        let direction = Direction::from_offset(b_pos - a_pos).ok_or_else(|| {
            PlannerError::InvalidGraph(format!(
                "Rooms at {} and {} are not cardinal neighbours",
                a_pos, b_pos
            ))
        })?;

        self.rooms[a.0].adjacent.insert(direction, b);
        self.rooms[b.0].adjacent.insert(direction.opposite(), a);
        Ok(direction)
    }

    /// Checks whether two rooms are connected.
    pub fn are_connected(&self, a: RoomId, b: RoomId) -> bool {
        self.room(a)
            .map(|room| room.adjacent.values().any(|&other| other == b))
            .unwrap_or(false)
    }

    /// Gets a room by id.
    pub fn room(&self, id: RoomId) -> Option<&DungeonRoom> {
        self.rooms.get(id.0)
    }

    /// Gets the room at a grid position.
    pub fn room_at(&self, position: GridIndex) -> Option<&DungeonRoom> {
        self.by_position.get(&position).and_then(|&id| self.room(id))
    }

    /// Iterates rooms in creation order.
    pub fn rooms(&self) -> impl Iterator<Item = &DungeonRoom> {
        self.rooms.iter()
    }

    /// Iterates the neighbours of a room as `(direction, room)` pairs.
    pub fn neighbours(&self, id: RoomId) -> impl Iterator<Item = (Direction, &DungeonRoom)> + '_ {
        self.room(id)
            .into_iter()
            .flat_map(|room| room.adjacent.iter())
            .filter_map(move |(&direction, &other)| self.room(other).map(|room| (direction, room)))
    }

    /// Groups room ids by content tag, each group in creation order.
    pub fn rooms_by_content(&self) -> BTreeMap<ContentTag, Vec<RoomId>> {
        let mut groups: BTreeMap<ContentTag, Vec<RoomId>> = BTreeMap::new();
        for room in &self.rooms {
            groups.entry(room.content).or_default().push(room.id);
        }
        groups
    }

    /// Number of undirected adjacency edges.
    pub fn edge_count(&self) -> usize {
        self.rooms.iter().map(|room| room.adjacent.len()).sum::<usize>() / 2
    }

    /// Number of rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether the dungeon has no rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Checks that adjacency is symmetric and every edge joins cardinal
    /// neighbours.
    pub fn validate(&self) -> PlannerResult<()> {
        for room in &self.rooms {
            for (&direction, &other_id) in &room.adjacent {
                let other = self.require(other_id)?;
                if other.position - room.position != direction.offset() {
                    return Err(PlannerError::InvalidGraph(format!(
                        "Room at {} lists {} as {:?} but it is not there",
                        room.position, other.position, direction
                    )));
                }
                if other.neighbour(direction.opposite()) != Some(room.id) {
                    return Err(PlannerError::InvalidGraph(format!(
                        "Adjacency between {} and {} is not symmetric",
                        room.position, other.position
                    )));
                }
            }
        }
        Ok(())
    }

    fn require(&self, id: RoomId) -> PlannerResult<&DungeonRoom> {
        self.room(id)
            .ok_or_else(|| PlannerError::InvalidGraph(format!("Unknown room {:?}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_round_trip_and_opposites() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_offset(direction.offset()), Some(direction));
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(
                direction.offset() + direction.opposite().offset(),
                GridIndex::origin()
            );
        }
        assert_eq!(Direction::from_offset(GridIndex::new(1, 1)), None);
        assert_eq!(Direction::from_offset(GridIndex::new(2, 0)), None);
    }

    #[test]
    fn test_connect_is_symmetric() {
        let mut dungeon = DungeonGraph::new();
        let a = dungeon.add_room(GridIndex::new(0, 0), ContentTag::Combat).unwrap();
        let b = dungeon.add_room(GridIndex::new(0, -1), ContentTag::Treasure).unwrap();

        assert_eq!(dungeon.connect(a, b).unwrap(), Direction::South);
        assert_eq!(dungeon.room(a).unwrap().neighbour(Direction::South), Some(b));
        assert_eq!(dungeon.room(b).unwrap().neighbour(Direction::North), Some(a));
        assert!(dungeon.are_connected(a, b));
        assert!(dungeon.are_connected(b, a));
        assert_eq!(dungeon.edge_count(), 1);
        assert!(dungeon.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_neighbours_and_duplicates() {
        let mut dungeon = DungeonGraph::new();
        let a = dungeon.add_room(GridIndex::new(0, 0), ContentTag::Combat).unwrap();
        let far = dungeon.add_room(GridIndex::new(2, 0), ContentTag::Combat).unwrap();
        let diagonal = dungeon.add_room(GridIndex::new(1, 1), ContentTag::Combat).unwrap();

        assert!(dungeon.connect(a, far).is_err());
        assert!(dungeon.connect(a, diagonal).is_err());
        assert!(dungeon.add_room(GridIndex::new(0, 0), ContentTag::Boss).is_err());
        assert_eq!(dungeon.edge_count(), 0);
    }

    #[test]
    fn test_rooms_by_content_preserves_creation_order() {
        let mut dungeon = DungeonGraph::new();
        let a = dungeon.add_room(GridIndex::new(0, 0), ContentTag::Combat).unwrap();
        let b = dungeon.add_room(GridIndex::new(1, 0), ContentTag::Boss).unwrap();
        let c = dungeon.add_room(GridIndex::new(2, 0), ContentTag::Combat).unwrap();

        let groups = dungeon.rooms_by_content();
        assert_eq!(groups[&ContentTag::Combat], vec![a, c]);
        assert_eq!(groups[&ContentTag::Boss], vec![b]);
        assert!(!groups.contains_key(&ContentTag::Treasure));
    }

    #[test]
    fn test_room_lookup_by_position() {
        let mut dungeon = DungeonGraph::new();
        let a = dungeon.add_room(GridIndex::new(3, -2), ContentTag::Rest).unwrap();

        assert_eq!(dungeon.room_at(GridIndex::new(3, -2)).map(|r| r.id), Some(a));
        assert!(dungeon.room_at(GridIndex::origin()).is_none());
        assert_eq!(dungeon.len(), 1);
        assert!(!dungeon.is_empty());
    }

    #[test]
    fn test_neighbours_iterates_adjacency() {
        let mut dungeon = DungeonGraph::new();
        let centre = dungeon.add_room(GridIndex::origin(), ContentTag::Combat).unwrap();
        for neighbour in GridIndex::origin().cardinal_neighbours() {
            let id = dungeon.add_room(neighbour, ContentTag::Combat).unwrap();
            dungeon.connect(centre, id).unwrap();
        }

        let directions: Vec<Direction> = dungeon.neighbours(centre).map(|(d, _)| d).collect();
        assert_eq!(directions, Direction::ALL.to_vec());
    }
}
