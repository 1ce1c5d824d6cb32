use std::fmt;

use serde::{Deserialize, Serialize};

/// Size of a single room in tiles.
pub const ROOM_SIZE: u32 = 50;

/// The 8 compass directions, in the order the search iterates them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Top,
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::Bottom,
        Direction::BottomLeft,
        Direction::Left,
        Direction::TopLeft,
    ];
}

/// Coordinates of a room on the global world map.
/// The world is a 256x256 grid of rooms; "E1N1" sits at { xx: 129, yy: 126 }.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomLocation {
    pub xx: u8,
    pub yy: u8,
}

impl RoomLocation {
    pub fn new(xx: u8, yy: u8) -> Self {
        Self { xx, yy }
    }

    /// Packed 16-bit id, `xx` in the high byte. Used to key the terrain
    /// registry and the reverse room table.
    pub fn id(&self) -> u16 {
        ((self.xx as u16) << 8) | (self.yy as u16)
    }

    pub fn from_id(id: u16) -> Self {
        Self {
            xx: (id >> 8) as u8,
            yy: id as u8,
        }
    }
}

impl fmt::Display for RoomLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (ew, x) = if self.xx <= 127 {
            ('W', 127 - self.xx)
        } else {
            ('E', self.xx - 128)
        };
        let (ns, y) = if self.yy <= 127 {
            ('N', 127 - self.yy)
        } else {
            ('S', self.yy - 128)
        };
        write!(f, "{}{}{}{}", ew, x, ns, y)
    }
}

impl fmt::Debug for RoomLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoomLocation({}, {} [{}])", self.xx, self.yy, self)
    }
}

/// A tile position on the continuous global plane: room (xx/50, yy/50),
/// in-room offset (xx%50, yy%50).
///
/// The all-zero value doubles as the "null" sentinel, mirroring the wire
/// convention of the binding layer. Arithmetic past the world edge wraps in
/// two's complement; the wrapped position resolves to an unregistered room
/// and reads as an obstacle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPosition {
    pub xx: u32,
    pub yy: u32,
}

impl WorldPosition {
    #[inline]
    pub fn new(xx: u32, yy: u32) -> Self {
        Self { xx, yy }
    }

    /// Position of in-room tile `(x, y)` within `room`.
    pub fn from_room_local(room: RoomLocation, x: u8, y: u8) -> Self {
        Self {
            xx: room.xx as u32 * ROOM_SIZE + x as u32,
            yy: room.yy as u32 * ROOM_SIZE + y as u32,
        }
    }

    #[inline]
    pub fn null() -> Self {
        Self { xx: 0, yy: 0 }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.xx == 0 && self.yy == 0
    }

    #[inline]
    pub fn room_location(&self) -> RoomLocation {
        RoomLocation::new((self.xx / ROOM_SIZE) as u8, (self.yy / ROOM_SIZE) as u8)
    }

    /// Chebyshev distance: the move count for 8-way movement.
    #[inline]
    pub fn range_to(&self, other: WorldPosition) -> u32 {
        let dx = if other.xx > self.xx {
            other.xx - self.xx
        } else {
            self.xx - other.xx
        };
        let dy = if other.yy > self.yy {
            other.yy - self.yy
        } else {
            self.yy - other.yy
        };
        dx.max(dy)
    }

    /// Neighbor tile offset by `(dx, dy)`, wrapping at the world edge.
    #[inline]
    pub fn offset(&self, dx: i32, dy: i32) -> WorldPosition {
        WorldPosition::new(
            self.xx.wrapping_add(dx as u32),
            self.yy.wrapping_add(dy as u32),
        )
    }

    #[inline]
    pub fn position_in_direction(&self, dir: Direction) -> WorldPosition {
        match dir {
            Direction::Top => self.offset(0, -1),
            Direction::TopRight => self.offset(1, -1),
            Direction::Right => self.offset(1, 0),
            Direction::BottomRight => self.offset(1, 1),
            Direction::Bottom => self.offset(0, 1),
            Direction::BottomLeft => self.offset(-1, 1),
            Direction::Left => self.offset(-1, 0),
            Direction::TopLeft => self.offset(-1, -1),
        }
    }

    /// Linear direction to another tile, `None` for the same tile.
    pub fn direction_to(&self, pos: WorldPosition) -> Option<Direction> {
        let dx = pos.xx.wrapping_sub(self.xx) as i32;
        let dy = pos.yy.wrapping_sub(self.yy) as i32;
        if dx > 0 {
            if dy > 0 {
                Some(Direction::BottomRight)
            } else if dy < 0 {
                Some(Direction::TopRight)
            } else {
                Some(Direction::Right)
            }
        } else if dx < 0 {
            if dy > 0 {
                Some(Direction::BottomLeft)
            } else if dy < 0 {
                Some(Direction::TopLeft)
            } else {
                Some(Direction::Left)
            }
        } else if dy > 0 {
            Some(Direction::Bottom)
        } else if dy < 0 {
            Some(Direction::Top)
        } else {
            None
        }
    }
}

impl fmt::Display for WorldPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}, {}",
            self.room_location(),
            self.xx % ROOM_SIZE,
            self.yy % ROOM_SIZE
        )
    }
}

impl fmt::Debug for WorldPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorldPosition({}, {})", self.xx, self.yy)
    }
}
