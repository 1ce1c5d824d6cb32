use serde::{Deserialize, Serialize};

use crate::datatypes::{HeapFull, RoomLocation, WorldPosition};

/// Cost of a path or a single move. The maximum value is the obstacle
/// sentinel; real costs stay well below it (the longest possible path is
/// bounded by the Chebyshev diameter of the whole map).
pub type Cost = u32;

/// Flat tile index: `room_index * 2500 + x % 50 * 50 + y % 50`.
pub type PosIndex = u32;

/// 1-based index into the per-search room table; 0 means "unavailable".
/// 32 bits measured faster than u8 for the table lookups.
pub type RoomIndex = u32;

/// Hard cap on rooms a single search may touch.
pub const MAX_ROOMS: usize = 64;

/// Impassable-tile sentinel. Never summed into a path cost.
pub const OBSTACLE: Cost = Cost::MAX;

/// A finished (or best-effort) search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Tiles from the destination back toward the origin: the destination
    /// first, the origin excluded. Consecutive tiles are exactly one
    /// Chebyshev step apart.
    pub path: Vec<WorldPosition>,
    /// Node expansions consumed.
    pub ops: u32,
    /// g-cost of the path's terminal tile.
    pub cost: Cost,
    /// True when the budget ran out before a goal came in range; the path
    /// then leads to the closest tile seen.
    pub incomplete: bool,
}

/// How a search ended when no fatal error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A path was produced, possibly a best-effort partial one.
    Path(SearchResult),
    /// The origin already satisfies the goal predicate.
    NoPathNeeded,
    /// The origin's room could not be registered (blocked by the resolver,
    /// or `max_rooms` is zero).
    OriginUnreachable,
    /// The resolver's cancellation flag was observed between iterations.
    Cancelled,
}

/// Fatal search failures. The instance remains reusable after any of them.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A reachable room has no terrain in the process-wide registry.
    #[error("terrain data is not loaded for room {room}")]
    MissingTerrain {
        /// The room whose terrain lookup came back empty.
        room: RoomLocation,
    },
    /// The room resolver reported an error; the search cannot continue.
    #[error("room resolver failed for room {room}")]
    Resolver {
        room: RoomLocation,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The open-set heap overflowed. Cannot happen under the 64-room cap
    /// with sane inputs; indicates corrupted cost data.
    #[error(transparent)]
    HeapCapacity(#[from] HeapFull),
    /// The goal list was empty. Seek mode has no finite heuristic without
    /// at least one goal.
    #[error("at least one goal is required")]
    EmptyGoals,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SearchError::MissingTerrain {
            room: RoomLocation::new(129, 126),
        };
        assert_eq!(err.to_string(), "terrain data is not loaded for room E1N1");
        assert_eq!(
            SearchError::EmptyGoals.to_string(),
            "at least one goal is required"
        );
    }

    #[test]
    fn test_obstacle_is_max() {
        assert_eq!(OBSTACLE, u32::MAX);
    }
}
