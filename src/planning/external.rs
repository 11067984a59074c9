//! # External Areas
//!
//! Already-built areas outside the dungeon that the plan has to link to,
//! such as the overworld room holding the staircase down into the dungeon.
//!
//! Tile indexing convention: one tile per world unit, tile `(0, 0)` is the
//! lowest-left tile of the area's main rectangle, and an area's absolute
//! center sits exactly in the middle of that rectangle.

use crate::{GridIndex, PlannerError, PlannerResult};
use serde::{Deserialize, Serialize};

/// Terrain kind of a single navigation tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// No walkable surface
    #[default]
    None,
    Land,
    Fluid,
    Chasm,
}

/// Absolute position in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
}

impl WorldPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Terrain of every tile in an area, stored row by row from the bottom.
///
/// The tile count always matches the dimensions; deserialization checks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NavigationGridData")]
pub struct NavigationGrid {
    width: u32,
    height: u32,
    tiles: Vec<Terrain>,
}

/// Unchecked wire form of a [`NavigationGrid`].
#[derive(Deserialize)]
struct NavigationGridData {
    width: u32,
    height: u32,
    tiles: Vec<Terrain>,
}

impl TryFrom<NavigationGridData> for NavigationGrid {
    type Error = PlannerError;

    fn try_from(data: NavigationGridData) -> PlannerResult<Self> {
        NavigationGrid::new(data.width, data.height, data.tiles)
    }
}

impl NavigationGrid {
    /// Creates a grid from bottom-up rows of tiles.
    pub fn new(width: u32, height: u32, tiles: Vec<Terrain>) -> PlannerResult<Self> {
        let expected = Self::tile_count(width, height)?;
        if tiles.len() != expected {
            return Err(PlannerError::InvalidConfig(format!(
                "A {}x{} navigation grid needs {} tiles, got {}",
                width,
                height,
                expected,
                tiles.len()
            )));
        }

        Ok(Self { width, height, tiles })
    }

    /// Creates a grid filled with a single terrain.
    pub fn filled(width: u32, height: u32, terrain: Terrain) -> PlannerResult<Self> {
        let count = Self::tile_count(width, height)?;
        Ok(Self {
            width,
            height,
            tiles: vec![terrain; count],
        })
    }

    fn tile_count(width: u32, height: u32) -> PlannerResult<usize> {
        (width as usize).checked_mul(height as usize).ok_or_else(|| {
            PlannerError::InvalidConfig(format!("Navigation grid {}x{} is too large", width, height))
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Gets the terrain at a tile, or `None` outside the grid.
    pub fn terrain_at(&self, tile: GridIndex) -> Option<Terrain> {
        self.offset(tile).and_then(|offset| self.tiles.get(offset).copied())
    }

    /// Overwrites the terrain at a tile.
    pub fn set_terrain(&mut self, tile: GridIndex, terrain: Terrain) -> PlannerResult<()> {
        let offset = self.offset(tile).ok_or_else(|| {
            PlannerError::InvalidConfig(format!(
                "Tile {} is outside a {}x{} navigation grid",
                tile, self.width, self.height
            ))
        })?;
        match self.tiles.get_mut(offset) {
            Some(slot) => {
                *slot = terrain;
                Ok(())
            }
            None => Err(PlannerError::InvalidConfig(format!("Tile {} has no terrain entry", tile))),
        }
    }

    fn offset(&self, tile: GridIndex) -> Option<usize> {
        if tile.x < 0 || tile.y < 0 || tile.x as u32 >= self.width || tile.y as u32 >= self.height {
            return None;
        }
        Some(tile.y as usize * self.width as usize + tile.x as usize)
    }
}

/// Converts an absolute position into tile indices of an area.
///
/// Returns `None` when the position falls outside the area's main rectangle.
///
/// # Examples
///
/// ```
/// use dungeon_planner::{tile_from_absolute_position, GridIndex, WorldPosition};
///
/// let center = WorldPosition::new(10.0, 10.0);
/// let tile = tile_from_absolute_position(WorldPosition::new(8.5, 11.2), center, (4, 4));
/// assert_eq!(tile, Some(GridIndex::new(0, 3)));
/// ```
pub fn tile_from_absolute_position(
    position: WorldPosition,
    center: WorldPosition,
    dimensions: (u32, u32),
) -> Option<GridIndex> {
    let local_x = (position.x - center.x + dimensions.0 as f32 / 2.0).floor();
    let local_y = (position.y - center.y + dimensions.1 as f32 / 2.0).floor();

    if local_x < 0.0 || local_y < 0.0 || local_x >= dimensions.0 as f32 || local_y >= dimensions.1 as f32 {
        return None;
    }

    Some(GridIndex::new(local_x as i32, local_y as i32))
}

/// An instantiated area living outside the planned dungeon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalArea {
    /// Name the builder knows the area by
    pub name: String,
    /// World position of the middle of the area
    pub absolute_center: WorldPosition,
    /// Terrain of the area's main rectangle
    pub navigation_grid: NavigationGrid,
}

impl ExternalArea {
    pub fn new(name: impl Into<String>, absolute_center: WorldPosition, navigation_grid: NavigationGrid) -> Self {
        Self {
            name: name.into(),
            absolute_center,
            navigation_grid,
        }
    }

    /// Size of the main rectangle in tiles.
    pub fn main_area_dimensions(&self) -> (u32, u32) {
        (self.navigation_grid.width(), self.navigation_grid.height())
    }

    /// Gets the terrain under an absolute position.
    pub fn terrain_under(&self, position: WorldPosition) -> Option<Terrain> {
        tile_from_absolute_position(position, self.absolute_center, self.main_area_dimensions())
            .and_then(|tile| self.navigation_grid.terrain_at(tile))
    }
}

/// An entrance inside an external area that should lead into the dungeon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubLevelEntrance {
    /// Name the builder knows the entrance by
    pub entrance: String,
    /// Absolute position of the entrance
    pub position: WorldPosition,
    /// The area containing the entrance
    pub area: ExternalArea,
}

impl SubLevelEntrance {
    pub fn new(entrance: impl Into<String>, position: WorldPosition, area: ExternalArea) -> Self {
        Self {
            entrance: entrance.into(),
            position,
            area,
        }
    }

    /// Terrain under the entrance, used to pin the connection to that tile.
    pub fn terrain(&self) -> PlannerResult<Terrain> {
        self.area
            .terrain_under(self.position)
            .ok_or_else(|| PlannerError::EntranceOutsideArea {
                entrance: self.entrance.clone(),
                area: self.area.name.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overworld() -> ExternalArea {
        let mut grid = NavigationGrid::filled(4, 4, Terrain::Land).unwrap();
        grid.set_terrain(GridIndex::new(3, 0), Terrain::Fluid).unwrap();
        ExternalArea::new("overworld", WorldPosition::new(0.0, 0.0), grid)
    }

    #[test]
    fn test_tile_indexing_corners() {
        let center = WorldPosition::new(0.0, 0.0);
        assert_eq!(
            tile_from_absolute_position(WorldPosition::new(-2.0, -2.0), center, (4, 4)),
            Some(GridIndex::new(0, 0))
        );
        assert_eq!(
            tile_from_absolute_position(WorldPosition::new(1.5, 1.5), center, (4, 4)),
            Some(GridIndex::new(3, 3))
        );
        assert_eq!(tile_from_absolute_position(WorldPosition::new(2.0, 0.0), center, (4, 4)), None);
        assert_eq!(tile_from_absolute_position(WorldPosition::new(0.0, -2.5), center, (4, 4)), None);
    }

    #[test]
    fn test_tile_indexing_odd_dimensions() {
        let center = WorldPosition::new(5.0, 5.0);
        // 3 wide: tiles span [3.5, 6.5)
        assert_eq!(
            tile_from_absolute_position(WorldPosition::new(5.0, 5.0), center, (3, 3)),
            Some(GridIndex::new(1, 1))
        );
        assert_eq!(tile_from_absolute_position(WorldPosition::new(3.4, 5.0), center, (3, 3)), None);
    }

    #[test]
    fn test_terrain_under_entrance() {
        let area = overworld();
        assert_eq!(area.terrain_under(WorldPosition::new(1.5, -1.5)), Some(Terrain::Fluid));
        assert_eq!(area.terrain_under(WorldPosition::new(-1.5, -1.5)), Some(Terrain::Land));

        let stairs = SubLevelEntrance::new("stairs", WorldPosition::new(1.5, -1.5), area.clone());
        assert_eq!(stairs.terrain().unwrap(), Terrain::Fluid);

        let lost = SubLevelEntrance::new("lost", WorldPosition::new(9.0, 9.0), area);
        assert!(matches!(lost.terrain(), Err(PlannerError::EntranceOutsideArea { .. })));
    }

    #[test]
    fn test_navigation_grid_bounds() {
        let mut grid = NavigationGrid::filled(2, 3, Terrain::Chasm).unwrap();
        assert_eq!(grid.terrain_at(GridIndex::new(1, 2)), Some(Terrain::Chasm));
        assert_eq!(grid.terrain_at(GridIndex::new(2, 0)), None);
        assert_eq!(grid.terrain_at(GridIndex::new(0, -1)), None);
        assert!(grid.set_terrain(GridIndex::new(0, 3), Terrain::Land).is_err());
    }

    #[test]
    fn test_grid_rejects_mismatched_tiles() {
        assert!(NavigationGrid::new(2, 2, vec![Terrain::Land; 4]).is_ok());
        assert!(matches!(
            NavigationGrid::new(4, 4, vec![Terrain::Land]),
            Err(PlannerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_deserialized_grid_is_checked() {
        let short = r#"{"width":4,"height":4,"tiles":["Land"]}"#;
        assert!(serde_json::from_str::<NavigationGrid>(short).is_err());

        let area = r#"{"name":"overworld","absolute_center":{"x":0.0,"y":0.0},
            "navigation_grid":{"width":4,"height":4,"tiles":["Land"]}}"#;
        assert!(serde_json::from_str::<ExternalArea>(area).is_err());

        let grid = NavigationGrid::filled(3, 2, Terrain::Fluid).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(serde_json::from_str::<NavigationGrid>(&json).unwrap(), grid);
    }
}
