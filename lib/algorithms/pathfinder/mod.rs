mod engine;
mod goal;
mod pool;
mod room;
mod types;


pub use engine::PathFinder;
pub use goal::{Goal, SearchOptions};
pub use pool::search;
pub use room::{NoOverlays, ResolverError, RoomResolution, RoomResolver};
pub use types::{
    Cost, PosIndex, RoomIndex, SearchError, SearchOutcome, SearchResult, MAX_ROOMS, OBSTACLE,
};
