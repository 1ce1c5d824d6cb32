use serde::{Deserialize, Serialize};

use super::types::Cost;
use crate::datatypes::WorldPosition;

/// A pathfinding goal: a position plus an acceptance range. In seek mode a
/// search succeeds on any tile within `range` of `pos`; in flee mode it
/// succeeds on any tile outside every goal's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub pos: WorldPosition,
    pub range: Cost,
}

impl Goal {
    pub fn new(pos: WorldPosition, range: Cost) -> Self {
        Self { pos, range }
    }

    /// Goal that must be reached exactly.
    pub fn at(pos: WorldPosition) -> Self {
        Self { pos, range: 0 }
    }
}

/// Tuning knobs for a single search call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Cost of entering a plain tile. Must be at least 1.
    pub plain_cost: Cost,
    /// Cost of entering a swamp tile. Must be at least 1.
    pub swamp_cost: Cost,
    /// Rooms this search may register, clamped to [`MAX_ROOMS`](super::MAX_ROOMS).
    pub max_rooms: u8,
    /// Node-expansion budget; the seed expansion is free.
    pub max_ops: u32,
    /// The search gives up once the cheapest frontier estimate exceeds this.
    pub max_cost: Cost,
    /// Invert the heuristic: maximize distance from the goals instead of
    /// minimizing it.
    pub flee: bool,
    /// Multiplier applied to the heuristic; values above 1 trade optimality
    /// for speed.
    pub heuristic_weight: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            plain_cost: 1,
            swamp_cost: 5,
            max_rooms: 16,
            max_ops: 2000,
            max_cost: Cost::MAX,
            flee: false,
            heuristic_weight: 1.0,
        }
    }
}

impl SearchOptions {
    pub fn costs(mut self, plain: Cost, swamp: Cost) -> Self {
        self.plain_cost = plain;
        self.swamp_cost = swamp;
        self
    }

    pub fn max_rooms(mut self, max_rooms: u8) -> Self {
        self.max_rooms = max_rooms;
        self
    }

    pub fn max_ops(mut self, max_ops: u32) -> Self {
        self.max_ops = max_ops;
        self
    }

    pub fn max_cost(mut self, max_cost: Cost) -> Self {
        self.max_cost = max_cost;
        self
    }

    pub fn flee(mut self, flee: bool) -> Self {
        self.flee = flee;
        self
    }

    pub fn heuristic_weight(mut self, weight: f64) -> Self {
        self.heuristic_weight = weight;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let options = SearchOptions::default()
            .costs(2, 10)
            .max_rooms(4)
            .max_ops(500)
            .flee(true)
            .heuristic_weight(1.2);
        assert_eq!(options.plain_cost, 2);
        assert_eq!(options.swamp_cost, 10);
        assert_eq!(options.max_rooms, 4);
        assert_eq!(options.max_ops, 500);
        assert!(options.flee);
        assert!((options.heuristic_weight - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_goal_helpers() {
        let pos = WorldPosition::new(100, 200);
        assert_eq!(Goal::at(pos), Goal::new(pos, 0));
        assert_eq!(Goal::new(pos, 3).range, 3);
    }
}
