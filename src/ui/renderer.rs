/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into the `front` buffer
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Composition is plain functions over a `FrameBuffer`, so screens can be
/// checked in tests without a terminal.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::cell::Cell as MazeCell;
use crate::sim::lifecycle::Phase;
use crate::sim::state::GameState;

/// Everything a frame needs, borrowed from the controller.
pub struct View<'a> {
    pub phase: Phase,
    pub state: &'a GameState,
    pub leaderboard: &'a [u32],
    pub leaderboard_stale: bool,
    /// One-line message under the maze. Empty = none.
    pub banner: &'a str,
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every cell, never the terminal default,
    /// so row gaps on VTE terminals match the cell color.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Differs from any real cell; filling `back` with it forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char takes one column; clipped at the edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Layout ──

/// Each maze cell is two terminal columns wide so the grid looks square.
const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COL: usize = 1;
const PANEL_GAP: usize = 4;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const BANNER_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const WALL_FG: Color = Color::Rgb { r: 70, g: 90, b: 230 };
const WALL_BG: Color = Color::Rgb { r: 30, g: 40, b: 140 };
const PICKUP_FG: Color = Color::Rgb { r: 255, g: 255, b: 255 };
const PLAYER_FG: Color = Color::Rgb { r: 255, g: 220, b: 40 };
const TITLE_FG: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const HI: Color = Color::Rgb { r: 80, g: 255, b: 80 };

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, view: &View) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let resized = tw as usize != self.term_w || th as usize != self.term_h;
        if resized {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
        }

        // Full repaint on resize or screen change
        if resized || self.last_phase != Some(view.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(view.phase);
        }

        compose(&mut self.front, view);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors, not ResetColor: the terminal default may differ from BASE_BG.
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

// ── Compose: build front buffer content ──

fn compose(buf: &mut FrameBuffer, view: &View) {
    buf.clear();
    match view.phase {
        Phase::Idle => compose_idle(buf, view),
        Phase::Running | Phase::GameOver => compose_game(buf, view),
    }
}

fn compose_game(buf: &mut FrameBuffer, view: &View) {
    let s = view.state;
    let maze = &s.maze;

    // ── HUD row ──
    let hud = format!(
        " MAZE CHASE   Score: {:<6} Lives: {:<3} Dots left: {}",
        s.score,
        s.lives,
        maze.pickups_remaining(),
    );
    buf.fill_row(HUD_ROW, HUD_BG);
    buf.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

    // ── Maze ──
    for (gy, row) in maze.rows().enumerate() {
        for (gx, cell) in row.iter().enumerate() {
            let col = MAP_COL + gx * CELL_W;
            let (c0, c1, fg, bg) = if s.player.x == gx as i32 && s.player.y == gy as i32 {
                ('(', ')', PLAYER_FG, Color::Reset)
            } else {
                match cell {
                    MazeCell::Wall => ('█', '█', WALL_FG, WALL_BG),
                    MazeCell::Pickup => ('·', ' ', PICKUP_FG, Color::Reset),
                    MazeCell::Empty => (' ', ' ', Color::White, Color::Reset),
                }
            };
            buf.set(col, MAP_ROW + gy, Cell::new(c0, fg, bg));
            buf.set(col + 1, MAP_ROW + gy, Cell::new(c1, fg, bg));
        }
    }

    // ── Side panel ──
    let panel_col = MAP_COL + maze.width() * CELL_W + PANEL_GAP;
    compose_leaderboard(buf, panel_col, MAP_ROW, view);

    // ── Banner + help ──
    let banner_row = MAP_ROW + maze.height() + 1;
    compose_banner(buf, banner_row, view.banner);
    buf.put_str(
        MAP_COL,
        banner_row + 2,
        "←↑↓→ Move   R Restart   Esc/Q Quit",
        Color::DarkGrey,
        Color::Reset,
    );
}

fn compose_idle(buf: &mut FrameBuffer, view: &View) {
    let title = [
        "╔══════════════════════════════╗",
        "║       M A Z E   C H A S E    ║",
        "╚══════════════════════════════╝",
    ];
    for (i, line) in title.iter().enumerate() {
        buf.put_str(4, 1 + i, line, TITLE_FG, Color::Reset);
    }

    buf.put_str(6, 5, "ENTER / SPACE   Start", HI, Color::Reset);
    buf.put_str(6, 6, "  ESC / Q       Quit", Color::White, Color::Reset);

    let after = compose_leaderboard(buf, 6, 8, view);
    compose_banner(buf, after + 1, view.banner);
}

/// Leaderboard in the order the store gave it. Returns the first free row.
fn compose_leaderboard(buf: &mut FrameBuffer, col: usize, row: usize, view: &View) -> usize {
    let header = if view.leaderboard_stale { "HIGH SCORES (offline)" } else { "HIGH SCORES" };
    buf.put_str(col, row, header, TITLE_FG, Color::Reset);

    if view.leaderboard.is_empty() {
        buf.put_str(col, row + 1, "  none yet", Color::DarkGrey, Color::Reset);
        return row + 2;
    }
    for (i, score) in view.leaderboard.iter().enumerate() {
        let line = format!("{:>2}. {}", i + 1, score);
        buf.put_str(col, row + 1 + i, &line, Color::White, Color::Reset);
    }
    row + 1 + view.leaderboard.len()
}

fn compose_banner(buf: &mut FrameBuffer, row: usize, text: &str) {
    if text.is_empty() {
        return;
    }
    buf.fill_row(row, BANNER_BG);
    buf.put_str(0, row, &format!(" ◈ {text} "), Color::Black, BANNER_BG);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::domain::entity::Pos;
    use crate::domain::maze::Maze;

    fn state() -> GameState {
        GameState::new(Maze::parse("#####\n#P..#\n#####").unwrap(), RulesConfig::default())
    }

    fn render(phase: Phase, s: &GameState, board: &[u32], banner: &str) -> FrameBuffer {
        let mut buf = FrameBuffer::new(60, 16);
        let view = View { phase, state: s, leaderboard: board, leaderboard_stale: false, banner };
        compose(&mut buf, &view);
        buf
    }

    #[test]
    fn hud_shows_counters() {
        let mut s = state();
        s.score = 30;
        s.lives = 2;
        let buf = render(Phase::Running, &s, &[], "");
        let hud = buf.row_text(HUD_ROW);
        assert!(hud.contains("Score: 30"), "{hud}");
        assert!(hud.contains("Lives: 2"), "{hud}");
        assert!(hud.contains("Dots left: 2"), "{hud}");
    }

    #[test]
    fn maze_cells_are_two_columns_wide() {
        let buf = render(Phase::Running, &state(), &[], "");
        let top = buf.row_text(MAP_ROW);
        assert!(top[MAP_COL..].starts_with("██████████"), "{top}");

        let mid = buf.row_text(MAP_ROW + 1);
        // wall, player at (1,1), pickup, pickup, wall
        assert_eq!(&mid[MAP_COL..].chars().take(10).collect::<String>(), "██()· · ██");
    }

    #[test]
    fn player_moves_on_screen() {
        let mut s = state();
        s.player = Pos::new(2, 1);
        let buf = render(Phase::Running, &s, &[], "");
        let mid: String = buf.row_text(MAP_ROW + 1).chars().skip(MAP_COL).take(10).collect();
        assert_eq!(mid, "██  ()· ██");
    }

    #[test]
    fn leaderboard_keeps_store_order() {
        let buf = render(Phase::Idle, &state(), &[40, 300, 120], "");
        let rows: Vec<String> = (0..buf.height).map(|y| buf.row_text(y)).collect();
        let pos = |needle: &str| rows.iter().position(|r| r.contains(needle)).unwrap();
        assert!(pos(" 1. 40") < pos(" 2. 300"));
        assert!(pos(" 2. 300") < pos(" 3. 120"));
    }

    #[test]
    fn idle_screen_offers_start() {
        let buf = render(Phase::Idle, &state(), &[], "Game over! Your score: 20");
        let all: String = (0..buf.height).map(|y| buf.row_text(y)).collect::<Vec<_>>().join("\n");
        assert!(all.contains("Start"));
        assert!(all.contains("none yet"));
        assert!(all.contains("Game over! Your score: 20"));
    }

    #[test]
    fn stale_leaderboard_is_marked() {
        let s = state();
        let mut buf = FrameBuffer::new(60, 16);
        let view = View {
            phase: Phase::Idle,
            state: &s,
            leaderboard: &[10],
            leaderboard_stale: true,
            banner: "",
        };
        compose(&mut buf, &view);
        let all: String = (0..buf.height).map(|y| buf.row_text(y)).collect();
        assert!(all.contains("(offline)"));
    }

    #[test]
    fn text_is_clipped_at_the_edge() {
        let mut buf = FrameBuffer::new(4, 1);
        buf.put_str(2, 0, "abcdef", Color::White, Color::Reset);
        assert_eq!(buf.row_text(0), "  ab");
    }
}
