/// The maze grid.
///
/// Two layers, like a level and its playthrough:
///   - `base`:  the layout as parsed. Never mutated.
///   - `cells`: the effective grid. Pickups become `Empty` as they are eaten.
///
/// `reset()` turns every eaten pickup back into a `Pickup` by restoring
/// `cells` from `base`. Walls never change in either layer.
///
/// ## Layout format
///   '#' = Wall     '.' = Pickup     'P' = Spawn (empty; the player stands here)
///   Lines starting with ';' are comments. Empty lines are skipped.
///   All rows must be the same width. Exactly one 'P'.

use super::cell::Cell;
use super::entity::Pos;
use crate::error::GameError;

#[derive(Clone, Debug)]
pub struct Maze {
    base: Vec<Vec<Cell>>,
    cells: Vec<Vec<Cell>>,
    width: usize,
    height: usize,
    spawn: Pos,
}

// ── Construction ──

impl Maze {
    /// Parse a maze from its text layout.
    pub fn parse(text: &str) -> Result<Maze, GameError> {
        let mut cells: Vec<Vec<Cell>> = Vec::new();
        let mut spawn: Option<Pos> = None;
        let mut width: Option<usize> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim_end_matches('\r');
            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            let y = cells.len();
            let mut row = Vec::with_capacity(line.len());
            for (x, ch) in line.chars().enumerate() {
                let cell = match ch {
                    '#' => Cell::Wall,
                    '.' => Cell::Pickup,
                    'P' => {
                        if spawn.is_some() {
                            return Err(format_err(line_no, "second spawn point"));
                        }
                        spawn = Some(Pos::new(x as i32, y as i32));
                        Cell::Empty
                    }
                    other => {
                        return Err(format_err(line_no, &format!("unexpected character {other:?}")));
                    }
                };
                row.push(cell);
            }

            match width {
                None => width = Some(row.len()),
                Some(w) if w != row.len() => {
                    return Err(format_err(
                        line_no,
                        &format!("row is {} cells wide, expected {}", row.len(), w),
                    ));
                }
                Some(_) => {}
            }
            cells.push(row);
        }

        let height = cells.len();
        let width = width.unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(format_err(0, "maze is empty"));
        }
        let spawn = spawn.ok_or_else(|| format_err(0, "no spawn point 'P'"))?;

        Ok(Maze { base: cells.clone(), cells, width, height, spawn })
    }
}

fn format_err(line: usize, reason: &str) -> GameError {
    GameError::MazeFormat { line, reason: reason.to_string() }
}

// ── Queries ──

impl Maze {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Where every session begins. Always a non-wall cell.
    pub fn spawn(&self) -> Pos {
        self.spawn
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Cell at (x, y), or `OutOfBounds`.
    pub fn cell_at(&self, x: i32, y: i32) -> Result<Cell, GameError> {
        if self.contains(x, y) {
            Ok(self.cells[y as usize][x as usize])
        } else {
            Err(GameError::OutOfBounds { x, y })
        }
    }

    pub fn pickups_remaining(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_pickup()).count()
    }

    /// Row-major view for renderers.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.iter().map(|r| r.as_slice())
    }
}

// ── Mutation ──

impl Maze {
    /// Eat the pickup at (x, y). Returns false when there was nothing to eat
    /// (already `Empty`, a `Wall`, or off the grid).
    pub fn consume_pickup(&mut self, x: i32, y: i32) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        let cell = &mut self.cells[y as usize][x as usize];
        if *cell == Cell::Pickup {
            *cell = Cell::Empty;
            true
        } else {
            false
        }
    }

    /// Restore every eaten pickup.
    pub fn reset(&mut self) {
        self.cells = self.base.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Maze {
        Maze::parse(
            "#####\n\
             #P..#\n\
             #.#.#\n\
             #####\n",
        )
        .unwrap()
    }

    // ── parse ──

    #[test]
    fn parse_reads_dimensions_and_spawn() {
        let m = small();
        assert_eq!(m.width(), 5);
        assert_eq!(m.height(), 4);
        assert_eq!(m.spawn(), Pos::new(1, 1));
    }

    #[test]
    fn spawn_cell_starts_empty() {
        let m = small();
        assert_eq!(m.cell_at(1, 1), Ok(Cell::Empty));
        assert_eq!(m.pickups_remaining(), 4);
    }

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let m = Maze::parse("; test maze\n\n###\n#P#\n###\n\n").unwrap();
        assert_eq!(m.height(), 3);
    }

    #[test]
    fn parse_rejects_ragged_rows() {
        let err = Maze::parse("###\n#P##\n###").unwrap_err();
        assert!(matches!(err, GameError::MazeFormat { line: 2, .. }), "{err:?}");
    }

    #[test]
    fn parse_rejects_unknown_characters() {
        let err = Maze::parse("###\n#Px\n###").unwrap_err();
        assert!(matches!(err, GameError::MazeFormat { line: 2, .. }));
    }

    #[test]
    fn parse_requires_exactly_one_spawn() {
        assert!(Maze::parse("###\n#.#\n###").is_err());
        assert!(Maze::parse("####\n#PP#\n####").is_err());
    }

    #[test]
    fn parse_rejects_empty_text() {
        assert!(Maze::parse("").is_err());
        assert!(Maze::parse("; only a comment\n").is_err());
    }

    // ── cell_at ──

    #[test]
    fn cell_at_out_of_bounds_fails() {
        let m = small();
        assert_eq!(m.cell_at(-1, 0), Err(GameError::OutOfBounds { x: -1, y: 0 }));
        assert_eq!(m.cell_at(5, 0), Err(GameError::OutOfBounds { x: 5, y: 0 }));
        assert_eq!(m.cell_at(0, 4), Err(GameError::OutOfBounds { x: 0, y: 4 }));
    }

    #[test]
    fn cell_at_reads_walls() {
        let m = small();
        assert_eq!(m.cell_at(0, 0), Ok(Cell::Wall));
        assert_eq!(m.cell_at(2, 2), Ok(Cell::Wall));
    }

    // ── consume_pickup ──

    #[test]
    fn consume_pickup_once() {
        let mut m = small();
        assert!(m.consume_pickup(2, 1));
        assert_eq!(m.cell_at(2, 1), Ok(Cell::Empty));
        assert!(!m.consume_pickup(2, 1));
    }

    #[test]
    fn consume_wall_is_noop() {
        let mut m = small();
        assert!(!m.consume_pickup(0, 0));
        assert_eq!(m.cell_at(0, 0), Ok(Cell::Wall));
    }

    #[test]
    fn consume_off_grid_is_noop() {
        let mut m = small();
        assert!(!m.consume_pickup(-3, 9));
    }

    // ── reset ──

    #[test]
    fn reset_restores_pickups_and_keeps_walls() {
        let mut m = small();
        let before: Vec<Vec<Cell>> = m.rows().map(|r| r.to_vec()).collect();
        let total = m.pickups_remaining();
        m.consume_pickup(2, 1);
        m.consume_pickup(3, 1);
        m.consume_pickup(1, 2);
        assert_eq!(m.pickups_remaining(), total - 3);

        m.reset();
        assert_eq!(m.cell_at(1, 1), Ok(Cell::Empty));
        let after: Vec<Vec<Cell>> = m.rows().map(|r| r.to_vec()).collect();
        assert_eq!(before, after);
        assert_eq!(m.pickups_remaining(), total);
    }
}
