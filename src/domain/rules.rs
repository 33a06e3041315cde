/// Movement rules: pure classification of a target cell.
///
/// Encodes "what would happen" without performing the move.
///
/// ┌──────────────────────────┬──────────────┐
/// │ Target cell               │ Landing      │
/// ├──────────────────────────┼──────────────┤
/// │ outside the grid          │ Blocked      │
/// │ Wall                      │ Blocked      │
/// │ Pickup                    │ Pickup       │
/// │ Empty                     │ Open         │
/// └──────────────────────────┴──────────────┘

use super::entity::{Direction, Pos};
use super::maze::Maze;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Landing {
    Blocked,
    Open,
    Pickup,
}

/// Classify the cell one step from `from` in `dir`.
pub fn classify(maze: &Maze, from: Pos, dir: Direction) -> (Pos, Landing) {
    let target = from.step(dir);
    let landing = match maze.cell_at(target.x, target.y) {
        Err(_) => Landing::Blocked,
        Ok(cell) if !cell.is_passable() => Landing::Blocked,
        Ok(cell) if cell.is_pickup() => Landing::Pickup,
        Ok(_) => Landing::Open,
    };
    (target, landing)
}
