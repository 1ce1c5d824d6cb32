mod cost_matrix;
mod heap;
mod open_closed;
mod position;
mod terrain;

pub use cost_matrix::{CostMatrix, ROOM_AREA};
pub use heap::{HeapFull, IndexedHeap};
pub use open_closed::OpenClosed;
pub use position::{Direction, RoomLocation, WorldPosition, ROOM_SIZE};
pub use terrain::{
    load_terrain, RoomTerrain, TERRAIN_BYTES, TERRAIN_PLAIN, TERRAIN_SWAMP, TERRAIN_WALL,
};

pub(crate) use terrain::terrain_for;
