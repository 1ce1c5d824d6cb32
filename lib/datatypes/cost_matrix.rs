use std::convert::TryFrom;
use std::fmt;

/// Number of tiles in a room.
pub const ROOM_AREA: usize = 2500;

/// Per-room dynamic cost overlay: one byte per tile, x-major like the
/// terrain. `0` defers to the terrain cost, [`CostMatrix::BLOCKED`] marks an
/// obstacle, anything else is the absolute cost of entering the tile.
#[derive(Clone)]
pub struct CostMatrix {
    bits: [u8; ROOM_AREA],
}

impl CostMatrix {
    /// Byte value that marks a tile impassable.
    pub const BLOCKED: u8 = 0xff;

    pub fn new() -> Self {
        Self {
            bits: [0; ROOM_AREA],
        }
    }

    pub fn new_with_value(value: u8) -> Self {
        Self {
            bits: [value; ROOM_AREA],
        }
    }

    #[inline]
    pub fn get(&self, x: u8, y: u8) -> u8 {
        self.bits[x as usize * 50 + y as usize]
    }

    pub fn set(&mut self, x: u8, y: u8, value: u8) {
        self.bits[x as usize * 50 + y as usize] = value;
    }

    pub fn bits(&self) -> &[u8; ROOM_AREA] {
        &self.bits
    }
}

impl Default for CostMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CostMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overrides = self.bits.iter().filter(|&&b| b != 0).count();
        write!(f, "CostMatrix({} tiles overridden)", overrides)
    }
}

impl TryFrom<&[u8]> for CostMatrix {
    type Error = &'static str;

    fn try_from(buffer: &[u8]) -> Result<Self, Self::Error> {
        if buffer.len() != ROOM_AREA {
            return Err("cost matrix buffer must be exactly 2500 bytes");
        }
        let mut bits = [0; ROOM_AREA];
        bits.copy_from_slice(buffer);
        Ok(Self { bits })
    }
}
