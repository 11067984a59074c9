//! # Level Planner
//!
//! Breadth-first transform from a [`DungeonGraph`] to a [`LevelPlan`].
//!
//! Planning runs in four steps:
//! 1. The spawn room gets its area and a blueprint group.
//! 2. Every other room's blueprint group is drawn up front, per content tag,
//!    so pool failures surface before any traversal work is done.
//! 3. Rooms are visited breadth-first from spawn. An area is created the
//!    first time a room is reached and a connection the first time a free
//!    wall is used to reach a neighbour.
//! 4. An optional sub-level entrance outside the dungeon is linked to the
//!    spawn area.

use crate::{
    AreaId, AreaPrefab, BlueprintGroup, ContentPools, ContentTag, Direction, DungeonGraph,
    EntrancePrefab, GridIndex, LevelPlan, PlanArea, PlanConnection, PlanEntrance, PlannerConfig,
    PlannerError, PlannerResult, RoomId, SubLevelEntrance,
};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Direction leading from a sub-level entrance into the spawn area
const SUB_LEVEL_DIRECTION: Direction = Direction::North;

/// A finished plan plus the non-fatal problems met while building it.
#[derive(Debug)]
pub struct PlanOutcome {
    pub plan: LevelPlan,
    /// Reported configuration problems that did not stop planning
    pub issues: Vec<PlannerError>,
}

/// Turns generated dungeons into level plans.
///
/// # Examples
///
/// ```
/// use dungeon_planner::{ContentTag, DungeonGraph, GridIndex, LevelPlanner, PlannerConfig};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut dungeon = DungeonGraph::new();
/// let spawn = dungeon.add_room(GridIndex::new(0, 0), ContentTag::Combat).unwrap();
/// let boss = dungeon.add_room(GridIndex::new(1, 0), ContentTag::Boss).unwrap();
/// dungeon.connect(spawn, boss).unwrap();
///
/// let config = PlannerConfig::for_testing();
/// let mut pools = config.build_pools().unwrap();
/// let mut rng = StdRng::seed_from_u64(42);
///
/// let outcome = LevelPlanner::new(&config)
///     .create_initial_plan(&dungeon, &mut pools, &[], &mut rng)
///     .unwrap();
/// assert_eq!(outcome.plan.areas().len(), 2);
/// assert_eq!(outcome.plan.connections().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct LevelPlanner {
    area_prefab: AreaPrefab,
    dungeon_entrance: EntrancePrefab,
    boss_entrance: EntrancePrefab,
    exit_entrance: EntrancePrefab,
    spawn_index: GridIndex,
    fallback_content: ContentTag,
    mob_generator: Option<String>,
}

impl LevelPlanner {
    /// Creates a planner from a configuration.
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            area_prefab: config.area_prefab.clone(),
            dungeon_entrance: config.dungeon_entrance.clone(),
            boss_entrance: config.boss_entrance.clone(),
            exit_entrance: config.exit_entrance.clone(),
            spawn_index: config.spawn_index,
            fallback_content: config.fallback_content,
            mob_generator: config.mob_generator.clone(),
        }
    }

    /// Plans `dungeon`, drawing content from `pools`.
    ///
    /// Pool exhaustion, a missing spawn room or a missing fallback pool abort
    /// planning. Passing more than one sub-level entrance, or a spawn room
    /// whose south wall already holds a doorway, is reported in
    /// [`PlanOutcome::issues`] and skips the sub-level link; the plan is
    /// still returned.
    pub fn create_initial_plan(
        &self,
        dungeon: &DungeonGraph,
        pools: &mut ContentPools,
        sub_levels: &[SubLevelEntrance],
        rng: &mut StdRng,
    ) -> PlannerResult<PlanOutcome> {
        let spawn_room = dungeon
            .room_at(self.spawn_index)
            .ok_or(PlannerError::MissingSpawnRoom(self.spawn_index))?;

        debug!(
            "Planning dungeon of {} rooms from spawn at {}",
            dungeon.len(),
            spawn_room.position
        );

        let spawn_group = pools
            .resolve_mut(spawn_room.content, self.fallback_content)?
            .draw(rng)?;
        let mut plan = LevelPlan::new(
            PlanArea::new(self.area_prefab.clone(), spawn_group, spawn_room.position),
            self.mob_generator.clone(),
        );

        let mut batches = self.draw_blueprint_batches(dungeon, spawn_room.id, pools, rng)?;

        let mut visited: HashMap<RoomId, AreaId> = HashMap::from([(spawn_room.id, plan.spawn_area())]);
        let mut queue = VecDeque::from([(spawn_room.id, plan.spawn_area())]);

        while let Some((room_id, area_id)) = queue.pop_front() {
            let room = dungeon
                .room(room_id)
                .ok_or_else(|| PlannerError::InvalidGraph(format!("Unknown room {:?}", room_id)))?;

            for (_, adjacent) in dungeon.neighbours(room_id) {
                let adjacent_area = match visited.get(&adjacent.id) {
                    Some(&id) => id,
                    None => {
                        let group = batches
                            .get_mut(&adjacent.content)
                            .and_then(Vec::pop)
                            .ok_or(PlannerError::ExhaustedPool)?;
                        let id = plan.add_area(PlanArea::new(self.area_prefab.clone(), group, adjacent.position));
                        visited.insert(adjacent.id, id);
                        queue.push_back((adjacent.id, id));
                        id
                    }
                };

                let entry_direction = Direction::from_offset(adjacent.position - room.position)
                    .ok_or_else(|| {
                        PlannerError::InvalidGraph(format!(
                            "Rooms at {} and {} are not cardinal neighbours",
                            room.position, adjacent.position
                        ))
                    })?;

                let wall_free = plan
                    .area(area_id)
                    .map_or(false, |area| area.has_wall_entry(entry_direction))
                    && plan
                        .area(adjacent_area)
                        .map_or(false, |area| area.has_wall_entry(entry_direction.opposite()));
                if !wall_free {
                    let walls = &self.area_prefab.wall_entry_directions;
                    if !walls.contains(&entry_direction) || !walls.contains(&entry_direction.opposite()) {
                        warn!(
                            "Prefab {} has no {:?}/{:?} wall entry pair, rooms at {} and {} stay unconnected",
                            self.area_prefab.name,
                            entry_direction,
                            entry_direction.opposite(),
                            room.position,
                            adjacent.position
                        );
                    }
                    continue;
                }

                let entrance = self.entrance_between(room.content, adjacent.content);
                plan.add_connection(PlanConnection::new(
                    PlanEntrance::area(area_id, entrance.clone()),
                    PlanEntrance::area(adjacent_area, entrance.clone()),
                    entry_direction,
                ))?;
            }
        }

        if visited.len() < dungeon.len() {
            debug!(
                "{} rooms are unreachable from spawn and were left out of the plan",
                dungeon.len() - visited.len()
            );
        }

        let mut issues = Vec::new();
        match sub_levels {
            [] => {}
            [sub_level] => self.stitch_sub_level(&mut plan, sub_level, &mut issues)?,
            _ => {
                error!(
                    "Dungeon plans support at most 1 sub level entrance, got {}; skipping the link",
                    sub_levels.len()
                );
                issues.push(PlannerError::UnsupportedMultipleExternalEntrances {
                    count: sub_levels.len(),
                });
            }
        }

        info!(
            "Planned {} areas and {} connections",
            plan.areas().len(),
            plan.connections().len()
        );

        Ok(PlanOutcome { plan, issues })
    }

    /// Draws one blueprint group per non-spawn room, batched by content tag.
    ///
    /// Each batch is popped from the end while traversing, which replays the
    /// pool's draw order.
    fn draw_blueprint_batches(
        &self,
        dungeon: &DungeonGraph,
        spawn: RoomId,
        pools: &mut ContentPools,
        rng: &mut StdRng,
    ) -> PlannerResult<BTreeMap<ContentTag, Vec<BlueprintGroup>>> {
        let mut batches = BTreeMap::new();

        for (content, rooms) in dungeon.rooms_by_content() {
            let count = rooms.iter().filter(|&&id| id != spawn).count();
            if count == 0 {
                continue;
            }

            let batch = pools
                .resolve_mut(content, self.fallback_content)?
                .draw_many(count, rng)?;
            debug!("Drew {} blueprint groups for {:?} rooms", batch.len(), content);
            batches.insert(content, batch);
        }

        Ok(batches)
    }

    /// Picks the entrance prefab for a doorway between two rooms.
    fn entrance_between(&self, a: ContentTag, b: ContentTag) -> &EntrancePrefab {
        if a == ContentTag::Boss || b == ContentTag::Boss {
            &self.boss_entrance
        } else {
            &self.dungeon_entrance
        }
    }

    /// Links an external entrance to an exit in the spawn area.
    ///
    /// The link enters spawn through its south wall. When a dungeon doorway
    /// already sits there the link is skipped and reported in `issues`.
    fn stitch_sub_level(
        &self,
        plan: &mut LevelPlan,
        sub_level: &SubLevelEntrance,
        issues: &mut Vec<PlannerError>,
    ) -> PlannerResult<()> {
        let terrain = sub_level.terrain()?;

        let wall = SUB_LEVEL_DIRECTION.opposite();
        if !plan.spawn().map_or(false, |spawn| spawn.has_wall_entry(wall)) {
            error!(
                "Spawn {:?} wall is taken, cannot link sub level entrance {} in {}",
                wall, sub_level.entrance, sub_level.area.name
            );
            issues.push(PlannerError::SpawnWallOccupied { wall });
            return Ok(());
        }

        debug!(
            "Linking sub level entrance {} in {} to spawn over {:?}",
            sub_level.entrance, sub_level.area.name, terrain
        );

        let spawn = plan.spawn_area();
        plan.add_connection(
            PlanConnection::new(
                PlanEntrance::sub_level(sub_level.entrance.clone(), sub_level.area.name.clone()),
                PlanEntrance::area(spawn, self.exit_entrance.clone()),
                SUB_LEVEL_DIRECTION,
            )
            .with_forced_terrain(terrain),
        )
    }
}
