/// Cell states of the maze grid.
/// Properties are queried via methods so cell semantics stay in one place.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Wall,
    Pickup,
    Empty, // pickup already eaten
}

impl Cell {
    /// Can the player occupy this cell?
    pub fn is_passable(self) -> bool {
        !matches!(self, Cell::Wall)
    }

    pub fn is_pickup(self) -> bool {
        matches!(self, Cell::Pickup)
    }
}

