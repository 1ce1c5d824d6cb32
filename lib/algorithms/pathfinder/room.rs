use std::sync::Arc;

use crate::datatypes::{CostMatrix, RoomLocation, RoomTerrain};

/// Error type resolvers may raise; it surfaces as
/// [`SearchError::Resolver`](super::SearchError::Resolver).
pub type ResolverError = Box<dyn std::error::Error + Send + Sync>;

/// What a resolver knows about one room.
#[derive(Debug)]
pub enum RoomResolution {
    /// Use this cost overlay on top of the room's terrain. The buffer is
    /// moved into the search and held until the next call clears it.
    Overlay(CostMatrix),
    /// Refuse the room entirely; the search routes around it.
    Blocked,
    /// No overlay; terrain costs apply as-is.
    TerrainOnly,
}

/// Caller-supplied collaborator consulted the first time a search touches
/// each room. Also polled for cooperative cancellation between iterations.
pub trait RoomResolver {
    fn resolve_room(&mut self, room: RoomLocation) -> Result<RoomResolution, ResolverError>;

    /// Checked once per node expansion; returning true aborts the search
    /// with [`SearchOutcome::Cancelled`](super::SearchOutcome::Cancelled).
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Resolver for searches that only care about static terrain.
pub struct NoOverlays;

impl RoomResolver for NoOverlays {
    fn resolve_room(&mut self, _room: RoomLocation) -> Result<RoomResolution, ResolverError> {
        Ok(RoomResolution::TerrainOnly)
    }
}

impl<F> RoomResolver for F
where
    F: FnMut(RoomLocation) -> Result<RoomResolution, ResolverError>,
{
    fn resolve_room(&mut self, room: RoomLocation) -> Result<RoomResolution, ResolverError> {
        self(room)
    }
}

/// Per-search context for one registered room: the terrain handle, the
/// resolver's overlay if it provided one, and the room's map location.
/// Stable for the remainder of the search once registered.
pub(crate) struct RoomInfo {
    pub(crate) terrain: Arc<RoomTerrain>,
    pub(crate) cost_matrix: Option<CostMatrix>,
    pub(crate) pos: RoomLocation,
}

impl RoomInfo {
    pub(crate) fn new(
        terrain: Arc<RoomTerrain>,
        cost_matrix: Option<CostMatrix>,
        pos: RoomLocation,
    ) -> Self {
        Self {
            terrain,
            cost_matrix,
            pos,
        }
    }
}
