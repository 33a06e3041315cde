/// Maze loader.
///
/// ## Sources (priority order):
///   1. `[general] maze_file` from config.toml, if set
///   2. The built-in maze
///
/// A maze file that cannot be read or parsed is not fatal: the built-in
/// maze is used and the reason comes back as a warning for the log.
///
/// ## Tile legend:
///   '#' = Wall     '.' = Pickup     'P' = Player spawn
///   Lines starting with ';' are comments.

use std::path::Path;

use crate::config::GameConfig;
use crate::domain::maze::Maze;
use crate::error::GameError;

/// 20×11, spawn at (1,1).
pub const EMBEDDED_MAZE: &str = "\
; Classic
####################
#P....#......#.....#
#.###.#.####.#.###.#
#.#..............#.#
#.#.#####.######.#.#
#..................#
#.#.#####.######.#.#
#.#..............#.#
#.###.#.####.#.###.#
#.....#......#.....#
####################
";

/// The maze the game should play, plus a warning when the configured one
/// had to be skipped.
pub fn load_maze(config: &GameConfig) -> (Maze, Option<String>) {
    let Some(path) = config.maze_file.as_deref() else {
        return (embedded_maze(), None);
    };
    match load_from_file(path) {
        Ok(maze) => {
            tracing::info!(path = %path.display(), w = maze.width(), h = maze.height(), "maze loaded");
            (maze, None)
        }
        Err(reason) => (
            embedded_maze(),
            Some(format!("{}: {reason}; using the built-in maze", path.display())),
        ),
    }
}

fn load_from_file(path: &Path) -> Result<Maze, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    Maze::parse(&text).map_err(|e: GameError| e.to_string())
}

pub fn embedded_maze() -> Maze {
    match Maze::parse(EMBEDDED_MAZE) {
        Ok(m) => m,
        Err(e) => unreachable!("built-in maze is malformed: {e}"),
    }
}
