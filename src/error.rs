/// Error taxonomy for the game core.
///
/// None of these are fatal: callers either ignore them (bad input),
/// log and continue (store trouble), or fall back to defaults (bad maze file).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Coordinate outside the grid. Checked before every index.
    #[error("cell ({x}, {y}) is outside the maze")]
    OutOfBounds { x: i32, y: i32 },

    /// Diagonal or zero-step input.
    #[error("({dx}, {dy}) is not a cardinal direction")]
    InvalidDirection { dx: i32, dy: i32 },

    #[error("score store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("maze line {line}: {reason}")]
    MazeFormat { line: usize, reason: String },
}
