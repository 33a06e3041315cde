/// Grid geometry: positions and the four cardinal directions.

use crate::error::GameError;

/// Integer grid coordinate. Signed so that a step off the edge
/// is representable and can be rejected instead of wrapping.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    /// One step in `dir`.
    pub fn step(self, dir: Direction) -> Pos {
        let (dx, dy) = dir.delta();
        Pos { x: self.x + dx, y: self.y + dy }
    }
}

/// Movement direction. Exactly one axis changes by exactly one cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector, y grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Inverse of `delta`. Diagonals and the zero vector are rejected.
    pub fn from_delta(dx: i32, dy: i32) -> Result<Direction, GameError> {
        Direction::ALL
            .into_iter()
            .find(|d| d.delta() == (dx, dy))
            .ok_or(GameError::InvalidDirection { dx, dy })
    }
}
