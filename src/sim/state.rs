/// GameState: everything one session owns.
///
/// A session starts with the player on the maze's spawn point, zero score
/// and the configured number of lives. `reset()` puts it back there and
/// restores the maze. `running` is left to the lifecycle controller.

use crate::config::RulesConfig;
use crate::domain::entity::Pos;
use crate::domain::maze::Maze;

pub struct GameState {
    pub maze: Maze,
    pub player: Pos,
    pub score: u32,
    pub lives: u32,
    pub running: bool,
    pub rules: RulesConfig,
}

impl GameState {
    /// Fresh session on `maze`. The maze is reset first, so a maze that was
    /// played on before comes back with every pickup.
    pub fn new(mut maze: Maze, rules: RulesConfig) -> Self {
        maze.reset();
        GameState {
            player: maze.spawn(),
            maze,
            score: 0,
            lives: rules.initial_lives,
            running: true,
            rules,
        }
    }

    /// Back to spawn with full lives, zero score, every pickup restored.
    pub fn reset(&mut self) {
        self.player = self.maze.spawn();
        self.score = 0;
        self.lives = self.rules.initial_lives;
        self.maze.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        let maze = Maze::parse("#####\n#P..#\n#####").unwrap();
        GameState::new(maze, RulesConfig::default())
    }

    #[test]
    fn new_session_starts_on_spawn() {
        let s = state();
        assert_eq!(s.player, Pos::new(1, 1));
        assert_eq!(s.score, 0);
        assert_eq!(s.lives, 5);
        assert!(s.running);
    }

    #[test]
    fn new_session_restores_a_played_maze() {
        let mut maze = Maze::parse("#####\n#P..#\n#####").unwrap();
        maze.consume_pickup(2, 1);
        let s = GameState::new(maze, RulesConfig::default());
        assert_eq!(s.maze.pickups_remaining(), 2);
    }

    #[test]
    fn reset_restores_counters_position_and_maze() {
        let mut s = state();
        s.player = Pos::new(3, 1);
        s.score = 20;
        s.lives = 2;
        s.maze.consume_pickup(2, 1);
        s.maze.consume_pickup(3, 1);

        s.reset();

        assert_eq!(s.player, Pos::new(1, 1));
        assert_eq!(s.score, 0);
        assert_eq!(s.lives, 5);
        assert_eq!(s.maze.pickups_remaining(), 2);
    }
}
