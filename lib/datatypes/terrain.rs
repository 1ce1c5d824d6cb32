use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;

use super::position::RoomLocation;

/// Terrain codes, 2 bits per tile.
pub const TERRAIN_PLAIN: u8 = 0;
pub const TERRAIN_WALL: u8 = 1;
pub const TERRAIN_SWAMP: u8 = 2;

/// Number of bytes in a packed room terrain grid: 2500 tiles, 2 bits each.
pub const TERRAIN_BYTES: usize = 625;

/// Static terrain of one room: a 50x50 grid of 2-bit codes, packed x-major
/// (`index = x * 50 + y`, low bits first within each byte). Immutable once
/// registered; the rest of the crate only ever reads it through an `Arc`.
#[derive(Clone)]
pub struct RoomTerrain {
    bits: [u8; TERRAIN_BYTES],
}

impl RoomTerrain {
    /// All-plain terrain.
    pub fn new() -> Self {
        Self {
            bits: [0; TERRAIN_BYTES],
        }
    }

    pub fn from_bits(bits: [u8; TERRAIN_BYTES]) -> Self {
        Self { bits }
    }

    /// 2-bit code for the tile at in-room `(x, y)`.
    #[inline]
    pub fn get(&self, x: u8, y: u8) -> u8 {
        let index = x as usize * 50 + y as usize;
        (self.bits[index / 4] >> (index % 4 * 2)) & 0x03
    }

    pub fn set(&mut self, x: u8, y: u8, code: u8) {
        let index = x as usize * 50 + y as usize;
        let shift = index % 4 * 2;
        let byte = &mut self.bits[index / 4];
        *byte = (*byte & !(0x03 << shift)) | ((code & 0x03) << shift);
    }

    pub fn bits(&self) -> &[u8; TERRAIN_BYTES] {
        &self.bits
    }
}

impl Default for RoomTerrain {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RoomTerrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RoomTerrain({} bytes)", TERRAIN_BYTES)
    }
}

lazy_static! {
    // One owning slot per possible room location. Written by `load_terrain`,
    // read on room registration; the search hot path never takes this lock.
    static ref TERRAIN_TABLE: RwLock<Vec<Option<Arc<RoomTerrain>>>> =
        RwLock::new(vec![None; 1 << 16]);
}

/// Bulk-loads static terrain into the process-wide registry. Intended to run
/// once at startup, before any search; a repeated load overwrites the rooms
/// it names and leaves the rest in place.
pub fn load_terrain<I>(entries: I)
where
    I: IntoIterator<Item = (RoomLocation, RoomTerrain)>,
{
    let mut table = TERRAIN_TABLE.write().unwrap();
    for (room, terrain) in entries {
        table[room.id() as usize] = Some(Arc::new(terrain));
    }
}

/// Handle to a room's terrain, or `None` if it was never loaded.
pub(crate) fn terrain_for(room: RoomLocation) -> Option<Arc<RoomTerrain>> {
    TERRAIN_TABLE.read().unwrap()[room.id() as usize].clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_all_plain() {
        let terrain = RoomTerrain::new();
        for x in 0..50 {
            for y in 0..50 {
                assert_eq!(terrain.get(x, y), TERRAIN_PLAIN);
            }
        }
    }

    #[test]
    fn test_set_get_round_trip() {
        let mut terrain = RoomTerrain::new();
        terrain.set(0, 0, TERRAIN_WALL);
        terrain.set(0, 1, TERRAIN_SWAMP);
        terrain.set(49, 49, TERRAIN_WALL);
        terrain.set(25, 25, TERRAIN_SWAMP);

        assert_eq!(terrain.get(0, 0), TERRAIN_WALL);
        assert_eq!(terrain.get(0, 1), TERRAIN_SWAMP);
        assert_eq!(terrain.get(49, 49), TERRAIN_WALL);
        assert_eq!(terrain.get(25, 25), TERRAIN_SWAMP);
        // Neighbors sharing the same byte are untouched
        assert_eq!(terrain.get(0, 2), TERRAIN_PLAIN);
        assert_eq!(terrain.get(0, 3), TERRAIN_PLAIN);
    }

    #[test]
    fn test_set_overwrites() {
        let mut terrain = RoomTerrain::new();
        terrain.set(10, 10, TERRAIN_WALL);
        terrain.set(10, 10, TERRAIN_SWAMP);
        assert_eq!(terrain.get(10, 10), TERRAIN_SWAMP);
        terrain.set(10, 10, TERRAIN_PLAIN);
        assert_eq!(terrain.get(10, 10), TERRAIN_PLAIN);
    }

    #[test]
    fn test_packing_is_x_major() {
        // Tile (0, 4) has linear index 4, i.e. the low bits of byte 1.
        let mut bits = [0u8; TERRAIN_BYTES];
        bits[1] = TERRAIN_SWAMP;
        let terrain = RoomTerrain::from_bits(bits);
        assert_eq!(terrain.get(0, 4), TERRAIN_SWAMP);
        // Tile (1, 0) has linear index 50: byte 12, shift 4.
        let mut bits = [0u8; TERRAIN_BYTES];
        bits[12] = TERRAIN_WALL << 4;
        let terrain = RoomTerrain::from_bits(bits);
        assert_eq!(terrain.get(1, 0), TERRAIN_WALL);
    }

    #[test]
    fn test_registry_load_and_lookup() {
        let room = RoomLocation::new(200, 200);
        let missing = RoomLocation::new(201, 200);
        let mut terrain = RoomTerrain::new();
        terrain.set(5, 5, TERRAIN_WALL);
        load_terrain(vec![(room, terrain)]);

        let handle = terrain_for(room).expect("room should be registered");
        assert_eq!(handle.get(5, 5), TERRAIN_WALL);
        assert_eq!(handle.get(5, 6), TERRAIN_PLAIN);
        assert!(terrain_for(missing).is_none());
    }
}
