/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use config::GameConfig;
use sim::event::GameEvent;
use sim::level::load_maze;
use sim::lifecycle::{Controller, FrameClock, FrameScheduler, Phase};
use sim::scores::{FileScoreStore, StoreLink};
use ui::gamepad::GamepadState;
use ui::input::{Command, InputState};
use ui::renderer::{Renderer, View};
use ui::sound::SoundEngine;

const LOOP_SLEEP: Duration = Duration::from_millis(5);
/// How long shutdown waits for the last score to be written.
const STORE_SHUTDOWN_WAIT: Duration = Duration::from_secs(2);

fn main() {
    let config = GameConfig::load();
    init_logging(&config);
    for warning in &config.warnings {
        tracing::warn!("{warning}");
    }

    let (maze, maze_warning) = load_maze(&config);
    if let Some(w) = maze_warning {
        tracing::warn!("{w}");
    }

    let store = FileScoreStore::new(config.scores.file.clone(), config.scores.leaderboard_size);
    tracing::info!(path = %config.scores.file.display(), "high scores");
    let clock = FrameClock::new(Duration::from_millis(config.speed.frame_ms));
    let mut game = Controller::new(maze, config.rules, clock, StoreLink::spawn(Box::new(store)));

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut game, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if !game.settle_store(STORE_SHUTDOWN_WAIT) {
        eprintln!("High score store did not respond; the last score may be lost.");
    }
    tracing::info!(frames = game.frames(), "shutting down");

    if let Err(e) = result {
        tracing::error!(error = %e, "game loop failed");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Maze Chase!");
    if let Some(best) = game.leaderboard().first() {
        println!("Top score: {best}");
    }
}

/// Log to a file: the terminal belongs to the game. `RUST_LOG` overrides
/// the default `info` level.
fn init_logging(config: &GameConfig) {
    let file = match OpenOptions::new().create(true).append(true).open(&config.log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Logging disabled, cannot open {}: {e}", config.log_file.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn game_loop<S: FrameScheduler>(
    game: &mut Controller<S>,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&config.gamepad);
    tracing::info!(connected = gp.connected, "gamepad");

    let mut banner = String::new();
    let mut dirty = true;

    loop {
        kb.drain_events()?;
        gp.update();

        let commands: Vec<Command> = kb.commands().iter().chain(gp.commands()).copied().collect();
        for cmd in commands {
            match cmd {
                Command::Quit => return Ok(()),
                Command::Start => {
                    game.start();
                }
                Command::Restart => {
                    if game.restart() {
                        banner = "Restarted".to_string();
                    }
                }
                Command::Move(dir) => {
                    game.input(dir);
                }
            }
        }

        game.pump_store();
        if game.poll_frame() || kb.resized() {
            dirty = true;
        }

        let events = game.drain_events();
        if !events.is_empty() {
            present_events(&events, sound, &mut banner);
            dirty = true;
        }

        if dirty {
            renderer.render(&View {
                phase: game.phase(),
                state: game.state(),
                leaderboard: game.leaderboard(),
                leaderboard_stale: game.leaderboard_stale(),
                banner: &banner,
            })?;
            dirty = false;
        }

        std::thread::sleep(LOOP_SLEEP);
    }
}

/// Sound and the banner line. The game-over alert lives here.
/// "Last life!" only follows a bump; resets also report lives.
fn present_events(events: &[GameEvent], sound: Option<&SoundEngine>, banner: &mut String) {
    let mut bumped = false;
    for event in events {
        match event {
            GameEvent::PhaseChanged(Phase::Running) => {
                banner.clear();
                if let Some(sfx) = sound { sfx.play_start(); }
            }
            GameEvent::PickupConsumed { .. } => {
                if let Some(sfx) = sound { sfx.play_pickup(); }
            }
            GameEvent::WallBumped { .. } => {
                bumped = true;
                if let Some(sfx) = sound { sfx.play_bump(); }
            }
            GameEvent::LivesChanged(lives) => {
                if *lives == 1 && bumped {
                    *banner = "Last life!".to_string();
                }
                bumped = false;
            }
            GameEvent::GameOver { score } => {
                *banner = format!("Game Over! Your score: {score}");
                if let Some(sfx) = sound { sfx.play_game_over(); }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Pos;

    fn banner_after(events: &[GameEvent], before: &str) -> String {
        let mut banner = before.to_string();
        present_events(events, None, &mut banner);
        banner
    }

    #[test]
    fn bump_down_to_one_life_warns() {
        let events = [GameEvent::WallBumped { at: Pos::new(0, 1) }, GameEvent::LivesChanged(1)];
        assert_eq!(banner_after(&events, ""), "Last life!");
    }

    #[test]
    fn single_life_start_does_not_warn() {
        let events = [
            GameEvent::PhaseChanged(Phase::Running),
            GameEvent::ScoreChanged(0),
            GameEvent::LivesChanged(1),
        ];
        assert_eq!(banner_after(&events, "Game Over! Your score: 30"), "");
    }

    #[test]
    fn reset_after_game_over_keeps_the_score_banner() {
        let events = [
            GameEvent::WallBumped { at: Pos::new(0, 1) },
            GameEvent::LivesChanged(0),
            GameEvent::GameOver { score: 20 },
            GameEvent::ScoreChanged(0),
            GameEvent::LivesChanged(1),
            GameEvent::PhaseChanged(Phase::Idle),
        ];
        assert_eq!(banner_after(&events, ""), "Game Over! Your score: 20");
    }

    #[test]
    fn restart_with_one_life_keeps_restarted_banner() {
        let events = [GameEvent::ScoreChanged(0), GameEvent::LivesChanged(1)];
        assert_eq!(banner_after(&events, "Restarted"), "Restarted");
    }
}
