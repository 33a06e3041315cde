/// Gamepad input via gilrs.
///
/// Produces the same `Command`s as the keyboard. Button roles come from
/// the `[gamepad]` section of config.toml. Defaults:
///   D-pad / Left Stick    →  Move (one cell per push)
///   Start / A             →  Start
///   Y                     →  Restart
///   Select                →  Quit
///
/// The stick only counts when it points along one axis. A diagonal push
/// is not a direction and is dropped.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use super::input::Command;
use crate::config::GamepadConfig;
use crate::domain::entity::Direction;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Physical face/shoulder buttons that can be bound to an action.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

struct ActionMap {
    start: Vec<Btn>,
    restart: Vec<Btn>,
    quit: Vec<Btn>,
}

impl ActionMap {
    /// Unknown names are logged and skipped. An action whose list ends up
    /// empty has no button.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse(action: &str, names: &[String]) -> Vec<Btn> {
            names
                .iter()
                .filter_map(|n| {
                    let btn = Btn::from_name(n);
                    if btn.is_none() {
                        tracing::warn!(action, name = %n, "unknown gamepad button name");
                    }
                    btn
                })
                .collect()
        }
        ActionMap {
            start: parse("start", &cfg.start),
            restart: parse("restart", &cfg.restart),
            quit: parse("quit", &cfg.quit),
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    stick_x: f32,
    stick_y: f32,
    /// Last quantized stick vector, to fire once per push.
    stick_dir: (i32, i32),

    action_map: ActionMap,
    commands: Vec<Command>,

    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                tracing::info!(error = %e, "gamepad support unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            stick_x: 0.0,
            stick_y: 0.0,
            stick_dir: (0, 0),
            action_map: ActionMap::from_config(cfg),
            commands: Vec::with_capacity(4),
            connected,
        }
    }

    /// Collect this iteration's commands. Read them with `commands()`.
    pub fn update(&mut self) {
        self.commands.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    match btn {
                        Button::DPadUp => self.press_dpad(Direction::Up),
                        Button::DPadDown => self.press_dpad(Direction::Down),
                        Button::DPadLeft => self.press_dpad(Direction::Left),
                        Button::DPadRight => self.press_dpad(Direction::Right),
                        other => {
                            if let Some(b) = Btn::from_gilrs(other) {
                                self.press_button(b);
                            }
                        }
                    }
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.move_stick(value, self.stick_y),
                        Axis::LeftStickY => self.move_stick(self.stick_x, value),
                        _ => {}
                    }
                }
                EventType::Connected => {
                    self.connected = true;
                    tracing::info!("gamepad connected");
                }
                EventType::Disconnected => {
                    self.connected = false;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                    self.stick_dir = (0, 0);
                    tracing::info!("gamepad disconnected");
                }
                _ => {}
            }
        }
    }

    // ── Translation ──

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn press_dpad(&mut self, dir: Direction) {
        self.commands.push(Command::Move(dir));
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn press_button(&mut self, btn: Btn) {
        let map = &self.action_map;
        if map.quit.contains(&btn) {
            self.commands.push(Command::Quit);
        } else if map.restart.contains(&btn) {
            self.commands.push(Command::Restart);
        } else if map.start.contains(&btn) {
            self.commands.push(Command::Start);
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn move_stick(&mut self, x: f32, y: f32) {
        self.stick_x = x;
        self.stick_y = y;
        let dir = stick_delta(x, y);
        if dir == self.stick_dir {
            return;
        }
        self.stick_dir = dir;
        if dir == (0, 0) {
            return;
        }
        match Direction::from_delta(dir.0, dir.1) {
            Ok(d) => self.commands.push(Command::Move(d)),
            Err(e) => tracing::trace!(error = %e, "stick input dropped"),
        }
    }
}

/// Quantize stick axes to a grid vector. gilrs reports +y as up,
/// the maze grows downward.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
fn stick_delta(x: f32, y: f32) -> (i32, i32) {
    let q = |v: f32| {
        if v > STICK_DEADZONE {
            1
        } else if v < -STICK_DEADZONE {
            -1
        } else {
            0
        }
    };
    (q(x), -q(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> GamepadConfig {
        GamepadConfig {
            start: vec!["Start".into(), "A".into()],
            restart: vec!["Y".into()],
            quit: vec!["Select".into()],
        }
    }

    fn pad() -> GamepadState {
        GamepadState::new(&cfg())
    }

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("start"), Some(Btn::Start));
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn configured_buttons_map_to_commands() {
        let mut p = pad();
        p.press_button(Btn::A);
        p.press_button(Btn::Y);
        p.press_button(Btn::Select);
        p.press_button(Btn::B); // unbound
        assert_eq!(p.commands(), &[Command::Start, Command::Restart, Command::Quit]);
    }

    #[test]
    fn unknown_names_are_skipped() {
        let mut c = cfg();
        c.restart = vec!["Turbo".into(), "X".into()];
        let mut p = GamepadState::new(&c);
        p.press_button(Btn::X);
        assert_eq!(p.commands(), &[Command::Restart]);
    }

    #[test]
    fn stick_quantizes_with_deadzone() {
        assert_eq!(stick_delta(0.1, -0.2), (0, 0));
        assert_eq!(stick_delta(0.9, 0.0), (1, 0));
        assert_eq!(stick_delta(0.0, 0.9), (0, -1)); // up
        assert_eq!(stick_delta(-0.5, -0.5), (-1, 1));
    }

    #[test]
    fn stick_fires_once_per_push() {
        let mut p = pad();
        p.move_stick(0.8, 0.0);
        p.move_stick(0.95, 0.0);
        assert_eq!(p.commands(), &[Command::Move(Direction::Right)]);

        p.move_stick(0.0, 0.0);
        p.move_stick(0.0, -0.8);
        assert_eq!(
            p.commands(),
            &[Command::Move(Direction::Right), Command::Move(Direction::Down)]
        );
    }

    #[test]
    fn diagonal_stick_is_dropped() {
        let mut p = pad();
        p.move_stick(0.7, 0.7);
        assert!(p.commands().is_empty());
    }

    #[test]
    fn dpad_moves() {
        let mut p = pad();
        p.press_dpad(Direction::Left);
        assert_eq!(p.commands(), &[Command::Move(Direction::Left)]);
    }
}
