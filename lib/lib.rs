//! Least-cost pathfinding across a multi-room tiled world map.
//!
//! The world is a torus of 50x50-tile rooms. Static terrain (plain, swamp,
//! wall) is bulk-loaded once into a process-wide registry with
//! [`load_terrain`]; per-room dynamic costs come from a caller-supplied
//! [`RoomResolver`], consulted the first time a search touches each room.
//! A [`PathFinder`] instance then answers [`search`](PathFinder::search)
//! calls with A* seeded jump point search, honoring per-call cost tuning,
//! room caps, an operations budget and seek/flee heuristics.
//!
//! ```no_run
//! use roompath::{search, Goal, NoOverlays, SearchOptions, WorldPosition};
//!
//! let origin = WorldPosition::new(6425, 6425);
//! let goal = Goal::at(WorldPosition::new(6430, 6425));
//! let outcome = search(origin, &[goal], &mut NoOverlays, SearchOptions::default());
//! ```

pub mod algorithms;
pub mod datatypes;
pub mod utils;

pub use algorithms::pathfinder::{
    search, Cost, Goal, NoOverlays, PathFinder, PosIndex, ResolverError, RoomResolution,
    RoomResolver, SearchError, SearchOptions, SearchOutcome, SearchResult, MAX_ROOMS, OBSTACLE,
};
pub use datatypes::{
    load_terrain, CostMatrix, Direction, RoomLocation, RoomTerrain, WorldPosition, ROOM_AREA,
    ROOM_SIZE, TERRAIN_PLAIN, TERRAIN_SWAMP, TERRAIN_WALL,
};

/// ABI compatibility version reported to the binding layer.
pub const BINDING_VERSION: u32 = 11;
