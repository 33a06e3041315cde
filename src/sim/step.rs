/// The move resolver: applies one directional input to a session.
///
/// Processing order:
///   1. Classify the target cell (domain::rules)
///   2. Blocked → lose a life, stay put
///   3. Accepted → move, then eat the pickup if there is one
///
/// Never touches display state. Callers learn what happened from the
/// returned `Resolution` and the events pushed onto `events`.

use crate::domain::entity::Direction;
use crate::domain::rules::{self, Landing};
use super::event::GameEvent;
use super::state::GameState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    Blocked,
    MovedEmpty,
    MovedScored,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Resolution {
    pub outcome: MoveOutcome,
    /// Lives ran out on this move; the session must end.
    pub session_over: bool,
}

pub fn resolve_move(state: &mut GameState, dir: Direction, events: &mut Vec<GameEvent>) -> Resolution {
    let (target, landing) = rules::classify(&state.maze, state.player, dir);

    let outcome = match landing {
        Landing::Blocked => {
            // Every bump costs a life, even against the same wall twice.
            state.lives = state.lives.saturating_sub(1);
            events.push(GameEvent::WallBumped { at: target });
            events.push(GameEvent::LivesChanged(state.lives));
            MoveOutcome::Blocked
        }
        Landing::Open => {
            state.player = target;
            MoveOutcome::MovedEmpty
        }
        Landing::Pickup => {
            state.player = target;
            if state.maze.consume_pickup(target.x, target.y) {
                state.score = state.score.saturating_add(state.rules.pickup_reward);
                events.push(GameEvent::PickupConsumed { at: target });
                events.push(GameEvent::ScoreChanged(state.score));
                MoveOutcome::MovedScored
            } else {
                MoveOutcome::MovedEmpty
            }
        }
    };

    Resolution {
        outcome,
        session_over: outcome == MoveOutcome::Blocked && state.lives == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::domain::cell::Cell;
    use crate::domain::entity::Pos;
    use crate::domain::maze::Maze;

    /// Spawn (1,1), wall at (0,1), pickup at (2,1).
    const CORRIDOR: &str = "\
#####
#P..#
#.#.#
#####";

    fn session() -> GameState {
        GameState::new(Maze::parse(CORRIDOR).unwrap(), RulesConfig::default())
    }

    fn mv(s: &mut GameState, dir: Direction) -> Resolution {
        let mut events = Vec::new();
        resolve_move(s, dir, &mut events)
    }

    #[test]
    fn blocked_by_wall_costs_one_life() {
        let mut s = session();
        let r = mv(&mut s, Direction::Left);
        assert_eq!(r.outcome, MoveOutcome::Blocked);
        assert!(!r.session_over);
        assert_eq!(s.lives, 4);
        assert_eq!(s.player, Pos::new(1, 1));
    }

    #[test]
    fn every_wall_direction_blocks() {
        let mut s = GameState::new(Maze::parse("###\n#P#\n###").unwrap(), RulesConfig::default());
        for (i, dir) in Direction::ALL.into_iter().enumerate() {
            let r = mv(&mut s, dir);
            assert_eq!(r.outcome, MoveOutcome::Blocked, "{dir:?}");
            assert!(!r.session_over);
            assert_eq!(s.player, Pos::new(1, 1));
            assert_eq!(s.lives, 4 - i as u32);
        }
        assert_eq!(s.score, 0);
    }

    #[test]
    fn bumping_the_same_wall_keeps_costing_lives() {
        let mut s = session();
        mv(&mut s, Direction::Up);
        mv(&mut s, Direction::Up);
        mv(&mut s, Direction::Up);
        assert_eq!(s.lives, 2);
    }

    #[test]
    fn off_grid_target_is_blocked() {
        // Open edge: spawn on the border with no wall beyond it
        let mut s = GameState::new(Maze::parse("P.").unwrap(), RulesConfig::default());
        let r = mv(&mut s, Direction::Left);
        assert_eq!(r.outcome, MoveOutcome::Blocked);
        assert_eq!(s.player, Pos::new(0, 0));
        assert_eq!(s.lives, 4);
    }

    #[test]
    fn pickup_scores_ten_and_empties_cell() {
        let mut s = session();
        let r = mv(&mut s, Direction::Right);
        assert_eq!(r.outcome, MoveOutcome::MovedScored);
        assert_eq!(s.player, Pos::new(2, 1));
        assert_eq!(s.score, 10);
        assert_eq!(s.maze.cell_at(2, 1), Ok(Cell::Empty));
    }

    #[test]
    fn left_then_right_returns_without_rescoring() {
        let mut s = session();
        assert_eq!(mv(&mut s, Direction::Right).outcome, MoveOutcome::MovedScored);
        assert_eq!(s.score, 10);

        assert_eq!(mv(&mut s, Direction::Left).outcome, MoveOutcome::MovedEmpty);
        let r = mv(&mut s, Direction::Right);
        assert_eq!(r.outcome, MoveOutcome::MovedEmpty);
        assert_eq!(s.player, Pos::new(2, 1));
        assert_eq!(s.score, 10);
    }

    #[test]
    fn stepping_onto_spawn_scores_nothing() {
        let mut s = session();
        s.player = Pos::new(1, 2);
        let r = mv(&mut s, Direction::Up);
        assert_eq!(r.outcome, MoveOutcome::MovedEmpty);
        assert_eq!(s.player, Pos::new(1, 1));
        assert_eq!(s.score, 0);
    }

    #[test]
    fn last_life_flags_session_over() {
        let mut s = session();
        s.lives = 1;
        let r = mv(&mut s, Direction::Left);
        assert_eq!(r.outcome, MoveOutcome::Blocked);
        assert!(r.session_over);
        assert_eq!(s.lives, 0);
    }

    #[test]
    fn lives_never_go_below_zero() {
        let mut s = session();
        s.lives = 0;
        mv(&mut s, Direction::Left);
        assert_eq!(s.lives, 0);
    }

    #[test]
    fn events_describe_the_move() {
        let mut s = session();
        let mut events = Vec::new();
        resolve_move(&mut s, Direction::Right, &mut events);
        resolve_move(&mut s, Direction::Up, &mut events);
        assert_eq!(
            events,
            vec![
                GameEvent::PickupConsumed { at: Pos::new(2, 1) },
                GameEvent::ScoreChanged(10),
                GameEvent::WallBumped { at: Pos::new(2, 0) },
                GameEvent::LivesChanged(4),
            ]
        );
    }

    #[test]
    fn custom_reward_applies() {
        let rules = RulesConfig { pickup_reward: 25, ..RulesConfig::default() };
        let mut s = GameState::new(Maze::parse(CORRIDOR).unwrap(), rules);
        mv(&mut s, Direction::Right);
        assert_eq!(s.score, 25);
    }
}
