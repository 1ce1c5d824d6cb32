use log::{debug, trace};
use rustc_hash::FxHashSet;

use super::goal::{Goal, SearchOptions};
use super::room::{RoomInfo, RoomResolution, RoomResolver};
use super::types::{
    Cost, PosIndex, RoomIndex, SearchError, SearchOutcome, SearchResult, MAX_ROOMS, OBSTACLE,
};
use crate::datatypes::{
    terrain_for, CostMatrix, Direction, IndexedHeap, OpenClosed, RoomLocation, WorldPosition,
    ROOM_AREA,
};

/// Addressable tiles per search instance.
const TILE_COUNT: usize = ROOM_AREA * MAX_ROOMS;

/// In-room coordinate 0 or 49: the tile sits on a room border.
#[inline]
fn is_border_pos(val: u32) -> bool {
    val.wrapping_add(1) % 50 < 2
}

/// In-room coordinate 0, 1, 48 or 49: jump scans must stop here and hand
/// border handling back to the expansion step.
#[inline]
fn is_near_border_pos(val: u32) -> bool {
    val.wrapping_add(2) % 50 < 4
}

/// A reusable pathfinding instance.
///
/// Construction preallocates every large array (roughly 2 MB), and a search
/// never allocates on the hot path; `search` can be called any number of
/// times. One instance is strictly single-threaded and non-reentrant: a
/// resolver that needs to path mid-resolve must use a different instance
/// (see [`search`](super::search) for the pooled entry point that handles
/// this).
pub struct PathFinder {
    room_table: Vec<RoomInfo>,
    reverse_room_table: Vec<RoomIndex>,
    blocked_rooms: FxHashSet<RoomLocation>,
    parents: Vec<PosIndex>,
    open_closed: OpenClosed,
    heap: IndexedHeap,
    goals: Vec<Goal>,
}

impl PathFinder {
    pub fn new() -> Self {
        Self {
            room_table: Vec::with_capacity(MAX_ROOMS),
            reverse_room_table: vec![0; 1 << 16],
            blocked_rooms: FxHashSet::default(),
            parents: vec![0; TILE_COUNT],
            open_closed: OpenClosed::new(TILE_COUNT),
            heap: IndexedHeap::new(TILE_COUNT),
            goals: Vec::new(),
        }
    }

    /// Runs a search from `origin` to the cheapest tile satisfying `goals`.
    ///
    /// Transient state from the previous call is cleared on entry, so the
    /// instance stays reusable after any outcome, fatal errors included.
    pub fn search(
        &mut self,
        origin: WorldPosition,
        goals: &[Goal],
        resolver: &mut dyn RoomResolver,
        options: SearchOptions,
    ) -> Result<SearchOutcome, SearchError> {
        if goals.is_empty() {
            return Err(SearchError::EmptyGoals);
        }

        // Clean up from the previous search. Only the reverse-table slots
        // the last room table referenced need resetting.
        for info in &self.room_table {
            self.reverse_room_table[info.pos.id() as usize] = 0;
        }
        self.room_table.clear();
        self.blocked_rooms.clear();
        self.goals.clear();
        self.goals.extend_from_slice(goals);
        self.open_closed.clear();
        self.heap.clear();

        let mut search = Search {
            look_table: [options.plain_cost, OBSTACLE, options.swamp_cost, OBSTACLE],
            heuristic_weight: options.heuristic_weight,
            max_rooms: (options.max_rooms as usize).min(MAX_ROOMS),
            max_cost: options.max_cost,
            flee: options.flee,
            pf: self,
            resolver,
        };
        search.run(origin, options.max_ops)
    }
}

impl Default for PathFinder {
    fn default() -> Self {
        Self::new()
    }
}

/// One search call: the instance's arrays plus the per-call configuration
/// and the resolver borrow. Dropped when the call returns, so the instance
/// never holds a stale resolver.
struct Search<'a> {
    pf: &'a mut PathFinder,
    resolver: &'a mut dyn RoomResolver,
    look_table: [Cost; 4],
    heuristic_weight: f64,
    max_rooms: usize,
    max_cost: Cost,
    flee: bool,
}

impl<'a> Search<'a> {
    /// Room index for a map position, registering the room on first touch.
    /// 0 means the room is unavailable: over the room cap, or refused by
    /// the resolver.
    fn room_index_from_pos(&mut self, map_pos: RoomLocation) -> Result<RoomIndex, SearchError> {
        let room_index = self.pf.reverse_room_table[map_pos.id() as usize];
        if room_index != 0 {
            return Ok(room_index);
        }
        if self.pf.room_table.len() >= self.max_rooms {
            return Ok(0);
        }
        if self.pf.blocked_rooms.contains(&map_pos) {
            return Ok(0);
        }
        let terrain = match terrain_for(map_pos) {
            Some(terrain) => terrain,
            None => return Err(SearchError::MissingTerrain { room: map_pos }),
        };
        let cost_matrix = match self.resolver.resolve_room(map_pos) {
            Ok(RoomResolution::Overlay(matrix)) => Some(matrix),
            Ok(RoomResolution::TerrainOnly) => None,
            Ok(RoomResolution::Blocked) => {
                trace!("room {} refused by resolver", map_pos);
                self.pf.blocked_rooms.insert(map_pos);
                return Ok(0);
            }
            Err(source) => {
                return Err(SearchError::Resolver {
                    room: map_pos,
                    source,
                })
            }
        };
        self.pf
            .room_table
            .push(RoomInfo::new(terrain, cost_matrix, map_pos));
        let index = self.pf.room_table.len() as RoomIndex;
        self.pf.reverse_room_table[map_pos.id() as usize] = index;
        trace!("registered room {} at index {}", map_pos, index);
        Ok(index)
    }

    /// Flat tile index for a world position, or `None` when the room is
    /// unavailable.
    fn index_from_pos(&mut self, pos: WorldPosition) -> Result<Option<PosIndex>, SearchError> {
        let room_index = self.room_index_from_pos(pos.room_location())?;
        if room_index == 0 {
            return Ok(None);
        }
        Ok(Some(
            (room_index - 1) * ROOM_AREA as PosIndex + pos.xx % 50 * 50 + pos.yy % 50,
        ))
    }

    fn pos_from_index(&self, index: PosIndex) -> WorldPosition {
        let room_index = (index / ROOM_AREA as PosIndex) as usize;
        let info = &self.pf.room_table[room_index];
        let coord = index % ROOM_AREA as PosIndex;
        WorldPosition::new(
            coord / 50 + info.pos.xx as u32 * 50,
            coord % 50 + info.pos.yy as u32 * 50,
        )
    }

    /// Cost of moving onto a tile, registering its room on first touch.
    fn look(&mut self, pos: WorldPosition) -> Result<Cost, SearchError> {
        let room_index = self.room_index_from_pos(pos.room_location())?;
        if room_index == 0 {
            return Ok(OBSTACLE);
        }
        let info = &self.pf.room_table[(room_index - 1) as usize];
        let x = (pos.xx % 50) as u8;
        let y = (pos.yy % 50) as u8;
        if let Some(matrix) = &info.cost_matrix {
            match matrix.get(x, y) {
                0 => {}
                CostMatrix::BLOCKED => return Ok(OBSTACLE),
                value => return Ok(value as Cost),
            }
        }
        Ok(self.look_table[info.terrain.get(x, y) as usize])
    }

    /// Distance-to-goal estimate. Seek mode: minimum Chebyshev distance to
    /// any goal's range. Flee mode: how deep the position still is inside
    /// the range it must leave.
    fn heuristic(&self, pos: WorldPosition) -> Cost {
        if self.flee {
            let mut ret = 0;
            for goal in &self.pf.goals {
                let dist = pos.range_to(goal.pos);
                if dist < goal.range {
                    ret = ret.max(goal.range - dist);
                }
            }
            ret
        } else {
            let mut ret = Cost::MAX;
            for goal in &self.pf.goals {
                let dist = pos.range_to(goal.pos);
                if dist > goal.range {
                    ret = ret.min(dist - goal.range);
                } else {
                    ret = 0;
                }
            }
            ret
        }
    }

    #[inline]
    fn weighted(&self, h_cost: Cost) -> Cost {
        (h_cost as f64 * self.heuristic_weight) as Cost
    }

    /// Pushes a node to the heap, or improves its priority if it is
    /// already open.
    fn push_node(
        &mut self,
        parent_index: PosIndex,
        node: WorldPosition,
        g_cost: Cost,
    ) -> Result<(), SearchError> {
        let index = match self.index_from_pos(node)? {
            Some(index) => index,
            None => return Ok(()),
        };
        if self.pf.open_closed.is_closed(index as usize) {
            return Ok(());
        }
        let f_cost = g_cost + self.weighted(self.heuristic(node));

        if self.pf.open_closed.is_open(index as usize) {
            if self.pf.heap.priority(index) > f_cost {
                self.pf.heap.update(index, f_cost);
                self.pf.parents[index as usize] = parent_index;
            }
        } else {
            self.pf.heap.insert(index, f_cost)?;
            self.pf.open_closed.open(index as usize);
            self.pf.parents[index as usize] = parent_index;
        }
        Ok(())
    }

    /// One iteration of plain A*: considers all 8 neighbors. Used for the
    /// origin only; every later expansion goes through [`Self::jps`].
    fn astar(
        &mut self,
        index: PosIndex,
        pos: WorldPosition,
        g_cost: Cost,
    ) -> Result<(), SearchError> {
        for dir in Direction::ALL.iter() {
            let neighbor = pos.position_in_direction(*dir);

            // On a border tile some moves are impossible: sliding along the
            // border, and diagonals that miss the mirror tile next door.
            if pos.xx % 50 == 0 {
                if neighbor.xx % 50 == 49 && pos.yy != neighbor.yy {
                    continue;
                } else if pos.xx == neighbor.xx {
                    continue;
                }
            } else if pos.xx % 50 == 49 {
                if neighbor.xx % 50 == 0 && pos.yy != neighbor.yy {
                    continue;
                } else if pos.xx == neighbor.xx {
                    continue;
                }
            } else if pos.yy % 50 == 0 {
                if neighbor.yy % 50 == 49 && pos.xx != neighbor.xx {
                    continue;
                } else if pos.yy == neighbor.yy {
                    continue;
                }
            } else if pos.yy % 50 == 49 {
                if neighbor.yy % 50 == 0 && pos.xx != neighbor.xx {
                    continue;
                } else if pos.yy == neighbor.yy {
                    continue;
                }
            }

            let n_cost = self.look(neighbor)?;
            if n_cost == OBSTACLE {
                continue;
            }
            self.push_node(index, neighbor, g_cost + n_cost)?;
        }
        Ok(())
    }

    /// Scans along the x axis for the next jump point: a goal tile, a cost
    /// transition, a forced neighbor revealed by the two-cell look-ahead on
    /// either side, or border proximity. Null when the scan dead-ends in an
    /// obstacle.
    fn jump_x(
        &mut self,
        cost: Cost,
        mut pos: WorldPosition,
        dx: i32,
    ) -> Result<WorldPosition, SearchError> {
        let mut prev_cost_u = self.look(pos.offset(0, -1))?;
        let mut prev_cost_d = self.look(pos.offset(0, 1))?;
        loop {
            if self.heuristic(pos) == 0 || is_near_border_pos(pos.xx) {
                break;
            }

            let cost_u = self.look(pos.offset(dx, -1))?;
            let cost_d = self.look(pos.offset(dx, 1))?;
            if (cost_u != OBSTACLE && prev_cost_u != cost)
                || (cost_d != OBSTACLE && prev_cost_d != cost)
            {
                break;
            }
            prev_cost_u = cost_u;
            prev_cost_d = cost_d;
            pos = pos.offset(dx, 0);

            let jump_cost = self.look(pos)?;
            if jump_cost == OBSTACLE {
                pos = WorldPosition::null();
                break;
            } else if jump_cost != cost {
                break;
            }
        }
        Ok(pos)
    }

    fn jump_y(
        &mut self,
        cost: Cost,
        mut pos: WorldPosition,
        dy: i32,
    ) -> Result<WorldPosition, SearchError> {
        let mut prev_cost_l = self.look(pos.offset(-1, 0))?;
        let mut prev_cost_r = self.look(pos.offset(1, 0))?;
        loop {
            if self.heuristic(pos) == 0 || is_near_border_pos(pos.yy) {
                break;
            }

            let cost_l = self.look(pos.offset(-1, dy))?;
            let cost_r = self.look(pos.offset(1, dy))?;
            if (cost_l != OBSTACLE && prev_cost_l != cost)
                || (cost_r != OBSTACLE && prev_cost_r != cost)
            {
                break;
            }
            prev_cost_l = cost_l;
            prev_cost_r = cost_r;
            pos = pos.offset(0, dy);

            let jump_cost = self.look(pos)?;
            if jump_cost == OBSTACLE {
                pos = WorldPosition::null();
                break;
            } else if jump_cost != cost {
                break;
            }
        }
        Ok(pos)
    }

    /// Diagonal scan. Each step first sends the two straight scouts out;
    /// if either finds a jump point the diagonal terminates at the current
    /// tile so the straight expansion gets its turn.
    fn jump_xy(
        &mut self,
        cost: Cost,
        mut pos: WorldPosition,
        dx: i32,
        dy: i32,
    ) -> Result<WorldPosition, SearchError> {
        let mut prev_cost_x = self.look(pos.offset(-dx, 0))?;
        let mut prev_cost_y = self.look(pos.offset(0, -dy))?;
        loop {
            if self.heuristic(pos) == 0
                || is_near_border_pos(pos.xx)
                || is_near_border_pos(pos.yy)
            {
                break;
            }

            if (self.look(pos.offset(-dx, dy))? != OBSTACLE && prev_cost_x != cost)
                || (self.look(pos.offset(dx, -dy))? != OBSTACLE && prev_cost_y != cost)
            {
                break;
            }
            prev_cost_x = self.look(pos.offset(0, dy))?;
            prev_cost_y = self.look(pos.offset(dx, 0))?;
            if (prev_cost_y != OBSTACLE && !self.jump_x(cost, pos.offset(dx, 0), dx)?.is_null())
                || (prev_cost_x != OBSTACLE && !self.jump_y(cost, pos.offset(0, dy), dy)?.is_null())
            {
                break;
            }

            pos = pos.offset(dx, dy);

            let jump_cost = self.look(pos)?;
            if jump_cost == OBSTACLE {
                pos = WorldPosition::null();
                break;
            } else if jump_cost != cost {
                break;
            }
        }
        Ok(pos)
    }

    fn jump(
        &mut self,
        cost: Cost,
        pos: WorldPosition,
        dx: i32,
        dy: i32,
    ) -> Result<WorldPosition, SearchError> {
        if dx != 0 {
            if dy != 0 {
                self.jump_xy(cost, pos, dx, dy)
            } else {
                self.jump_x(cost, pos, dx)
            }
        } else {
            self.jump_y(cost, pos, dy)
        }
    }

    /// Either pushes `neighbor` directly (cost transition or border tile)
    /// or jumps past it, charging the skipped tiles at the center cost and
    /// the landing tile at its own.
    fn jump_neighbor(
        &mut self,
        pos: WorldPosition,
        index: PosIndex,
        mut neighbor: WorldPosition,
        mut g_cost: Cost,
        cost: Cost,
        n_cost: Cost,
    ) -> Result<(), SearchError> {
        if n_cost != cost || is_border_pos(neighbor.xx) || is_border_pos(neighbor.yy) {
            if n_cost == OBSTACLE {
                return Ok(());
            }
            g_cost += n_cost;
        } else {
            let dx = neighbor.xx.wrapping_sub(pos.xx) as i32;
            let dy = neighbor.yy.wrapping_sub(pos.yy) as i32;
            neighbor = self.jump(n_cost, neighbor, dx, dy)?;
            if neighbor.is_null() {
                return Ok(());
            }
            g_cost += n_cost * (pos.range_to(neighbor) - 1) + self.look(neighbor)?;
        }

        self.push_node(index, neighbor, g_cost)
    }

    /// Jump point search expansion of a closed node.
    fn jps(
        &mut self,
        index: PosIndex,
        pos: WorldPosition,
        g_cost: Cost,
    ) -> Result<(), SearchError> {
        let parent = self.pos_from_index(self.pf.parents[index as usize]);
        let dx: i32 = if pos.xx > parent.xx {
            1
        } else if pos.xx < parent.xx {
            -1
        } else {
            0
        };
        let dy: i32 = if pos.yy > parent.yy {
            1
        } else if pos.yy < parent.yy {
            -1
        } else {
            0
        };

        // Jumping to/from a border tile: the only legal moves are straight
        // across plus the two mirrored diagonals, pushed without jumping.
        let mut neighbors = [WorldPosition::null(); 3];
        let mut neighbor_count = 0;
        if pos.xx % 50 == 0 {
            if dx == -1 {
                neighbors[0] = pos.offset(-1, 0);
                neighbor_count = 1;
            } else if dx == 1 {
                neighbors[0] = pos.offset(1, -1);
                neighbors[1] = pos.offset(1, 0);
                neighbors[2] = pos.offset(1, 1);
                neighbor_count = 3;
            }
        } else if pos.xx % 50 == 49 {
            if dx == 1 {
                neighbors[0] = pos.offset(1, 0);
                neighbor_count = 1;
            } else if dx == -1 {
                neighbors[0] = pos.offset(-1, -1);
                neighbors[1] = pos.offset(-1, 0);
                neighbors[2] = pos.offset(-1, 1);
                neighbor_count = 3;
            }
        } else if pos.yy % 50 == 0 {
            if dy == -1 {
                neighbors[0] = pos.offset(0, -1);
                neighbor_count = 1;
            } else if dy == 1 {
                neighbors[0] = pos.offset(-1, 1);
                neighbors[1] = pos.offset(0, 1);
                neighbors[2] = pos.offset(1, 1);
                neighbor_count = 3;
            }
        } else if pos.yy % 50 == 49 {
            if dy == 1 {
                neighbors[0] = pos.offset(0, 1);
                neighbor_count = 1;
            } else if dy == -1 {
                neighbors[0] = pos.offset(-1, -1);
                neighbors[1] = pos.offset(0, -1);
                neighbors[2] = pos.offset(1, -1);
                neighbor_count = 3;
            }
        }

        if neighbor_count != 0 {
            for ii in 0..neighbor_count {
                let neighbor = neighbors[ii];
                let n_cost = self.look(neighbor)?;
                if n_cost == OBSTACLE {
                    continue;
                }
                self.push_node(index, neighbor, g_cost + n_cost)?;
            }
            return Ok(());
        }

        // Regular JPS iteration follows

        // Within one tile of a border the jump would stop immediately, so
        // those neighbors are pushed as-is instead.
        let border_dx: i32 = if pos.xx % 50 == 1 {
            -1
        } else if pos.xx % 50 == 48 {
            1
        } else {
            0
        };
        let border_dy: i32 = if pos.yy % 50 == 1 {
            -1
        } else if pos.yy % 50 == 48 {
            1
        } else {
            0
        };

        // Forward neighbors, shared between diagonal and straight parents
        let cost = self.look(pos)?;
        if dx != 0 {
            let neighbor = pos.offset(dx, 0);
            let n_cost = self.look(neighbor)?;
            if n_cost != OBSTACLE {
                if border_dy == 0 {
                    self.jump_neighbor(pos, index, neighbor, g_cost, cost, n_cost)?;
                } else {
                    self.push_node(index, neighbor, g_cost + n_cost)?;
                }
            }
        }
        if dy != 0 {
            let neighbor = pos.offset(0, dy);
            let n_cost = self.look(neighbor)?;
            if n_cost != OBSTACLE {
                if border_dx == 0 {
                    self.jump_neighbor(pos, index, neighbor, g_cost, cost, n_cost)?;
                } else {
                    self.push_node(index, neighbor, g_cost + n_cost)?;
                }
            }
        }

        // Forced neighbor rules
        if dx != 0 {
            if dy != 0 {
                // Diagonal parent
                let neighbor = pos.offset(dx, dy);
                let n_cost = self.look(neighbor)?;
                if n_cost != OBSTACLE {
                    self.jump_neighbor(pos, index, neighbor, g_cost, cost, n_cost)?;
                }
                if self.look(pos.offset(-dx, 0))? != cost {
                    let forced = pos.offset(-dx, dy);
                    let f_cost = self.look(forced)?;
                    self.jump_neighbor(pos, index, forced, g_cost, cost, f_cost)?;
                }
                if self.look(pos.offset(0, -dy))? != cost {
                    let forced = pos.offset(dx, -dy);
                    let f_cost = self.look(forced)?;
                    self.jump_neighbor(pos, index, forced, g_cost, cost, f_cost)?;
                }
            } else {
                // Straight parent, left/right
                if border_dy == 1 || self.look(pos.offset(0, 1))? != cost {
                    let forced = pos.offset(dx, 1);
                    let f_cost = self.look(forced)?;
                    self.jump_neighbor(pos, index, forced, g_cost, cost, f_cost)?;
                }
                if border_dy == -1 || self.look(pos.offset(0, -1))? != cost {
                    let forced = pos.offset(dx, -1);
                    let f_cost = self.look(forced)?;
                    self.jump_neighbor(pos, index, forced, g_cost, cost, f_cost)?;
                }
            }
        } else {
            // Straight parent, up/down
            if border_dx == 1 || self.look(pos.offset(1, 0))? != cost {
                let forced = pos.offset(1, dy);
                let f_cost = self.look(forced)?;
                self.jump_neighbor(pos, index, forced, g_cost, cost, f_cost)?;
            }
            if border_dx == -1 || self.look(pos.offset(-1, 0))? != cost {
                let forced = pos.offset(-1, dy);
                let f_cost = self.look(forced)?;
                self.jump_neighbor(pos, index, forced, g_cost, cost, f_cost)?;
            }
        }
        Ok(())
    }

    fn run(&mut self, origin: WorldPosition, max_ops: u32) -> Result<SearchOutcome, SearchError> {
        // Searching to the current tile would flood the whole map, because
        // the origin node itself never re-opens once closed.
        if self.heuristic(origin) == 0 {
            return Ok(SearchOutcome::NoPathNeeded);
        }

        if self.room_index_from_pos(origin.room_location())? == 0 {
            debug!("origin room {} is unavailable", origin.room_location());
            return Ok(SearchOutcome::OriginUnreachable);
        }
        let origin_index = match self.index_from_pos(origin)? {
            Some(index) => index,
            None => return Ok(SearchOutcome::OriginUnreachable),
        };

        let mut min_node = origin_index;
        let mut min_node_h_cost = Cost::MAX;
        let mut min_node_g_cost = Cost::MAX;

        // The first expansion is plain A*: JPS needs a parent direction.
        self.astar(origin_index, origin, 0)?;

        let mut ops_remaining = max_ops;
        while ops_remaining > 0 {
            let (index, f_cost) = match self.pf.heap.pop() {
                Some(entry) => entry,
                None => break,
            };
            self.pf.open_closed.close(index as usize);

            let pos = self.pos_from_index(index);
            let h_cost = self.heuristic(pos);
            let g_cost = f_cost - self.weighted(h_cost);

            if h_cost == 0 {
                min_node = index;
                min_node_h_cost = 0;
                min_node_g_cost = g_cost;
                break;
            } else if h_cost < min_node_h_cost {
                min_node = index;
                min_node_h_cost = h_cost;
                min_node_g_cost = g_cost;
            }
            if g_cost + h_cost > self.max_cost {
                debug!("cheapest frontier estimate exceeds max_cost, stopping");
                break;
            }

            self.jps(index, pos, g_cost)?;
            ops_remaining -= 1;

            if self.resolver.is_cancelled() {
                debug!("search cancelled after {} ops", max_ops - ops_remaining);
                return Ok(SearchOutcome::Cancelled);
            }
        }

        // Walk the parent graph back to the origin, filling in the tiles
        // the jumps skipped over. The result stays destination-first.
        let mut path = Vec::new();
        let mut index = min_node;
        let mut pos = self.pos_from_index(index);
        while pos != origin {
            path.push(pos);
            index = self.pf.parents[index as usize];
            let next = self.pos_from_index(index);
            if next.range_to(pos) > 1 {
                if let Some(dir) = pos.direction_to(next) {
                    loop {
                        pos = pos.position_in_direction(dir);
                        path.push(pos);
                        if pos.range_to(next) <= 1 {
                            break;
                        }
                    }
                }
            }
            pos = next;
        }

        let ops = max_ops - ops_remaining;
        debug!(
            "search from {} finished: {} ops, cost {}, {} tiles, incomplete {}",
            origin,
            ops,
            min_node_g_cost,
            path.len(),
            min_node_h_cost != 0
        );
        Ok(SearchOutcome::Path(SearchResult {
            path,
            ops,
            cost: min_node_g_cost,
            incomplete: min_node_h_cost != 0,
        }))
    }
}
