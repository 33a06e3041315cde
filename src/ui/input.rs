/// Keyboard input.
///
/// Every key press (and terminal auto-repeat) becomes at most one
/// `Command`. Releases are ignored: movement is one cell per press,
/// so there is no held-key state to track.
///
/// Key map:
///   Arrows            →  Move
///   Enter / Space     →  Start
///   R                 →  Restart
///   Esc / Q / Ctrl-C  →  Quit

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::Direction;

/// What the player asked for, independent of the device.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(Direction),
    Start,
    Restart,
    Quit,
}

pub struct InputState {
    commands: Vec<Command>,
    resized: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState { commands: Vec::with_capacity(8), resized: false }
    }

    /// Read every pending terminal event without blocking.
    /// Call once per loop iteration, then take the result with `commands()`.
    pub fn drain_events(&mut self) -> std::io::Result<()> {
        self.commands.clear();
        self.resized = false;
        while poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(cmd) = command_for(&key) {
                        self.commands.push(cmd);
                    }
                }
                Event::Resize(..) => self.resized = true,
                _ => {}
            }
        }
        Ok(())
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The terminal changed size during the last drain.
    pub fn resized(&self) -> bool {
        self.resized
    }
}

/// Translate one key event.
pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Command::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Up => Some(Command::Move(Direction::Up)),
        KeyCode::Down => Some(Command::Move(Direction::Down)),
        KeyCode::Left => Some(Command::Move(Direction::Left)),
        KeyCode::Right => Some(Command::Move(Direction::Right)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Start),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Restart),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> KeyEvent {
        KeyEvent { code, modifiers, kind, state: KeyEventState::NONE }
    }

    fn press(code: KeyCode) -> KeyEvent {
        key(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    #[test]
    fn arrows_move() {
        assert_eq!(command_for(&press(KeyCode::Up)), Some(Command::Move(Direction::Up)));
        assert_eq!(command_for(&press(KeyCode::Down)), Some(Command::Move(Direction::Down)));
        assert_eq!(command_for(&press(KeyCode::Left)), Some(Command::Move(Direction::Left)));
        assert_eq!(command_for(&press(KeyCode::Right)), Some(Command::Move(Direction::Right)));
    }

    #[test]
    fn auto_repeat_moves_again() {
        let k = key(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Repeat);
        assert_eq!(command_for(&k), Some(Command::Move(Direction::Left)));
    }

    #[test]
    fn release_is_ignored() {
        let k = key(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(command_for(&k), None);
    }

    #[test]
    fn meta_keys() {
        assert_eq!(command_for(&press(KeyCode::Enter)), Some(Command::Start));
        assert_eq!(command_for(&press(KeyCode::Char(' '))), Some(Command::Start));
        assert_eq!(command_for(&press(KeyCode::Char('r'))), Some(Command::Restart));
        assert_eq!(command_for(&press(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(command_for(&press(KeyCode::Char('q'))), Some(Command::Quit));
    }

    #[test]
    fn ctrl_c_quits_but_plain_c_does_nothing() {
        let ctrl_c = key(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press);
        assert_eq!(command_for(&ctrl_c), Some(Command::Quit));
        assert_eq!(command_for(&press(KeyCode::Char('c'))), None);
    }

    #[test]
    fn letters_are_not_directions() {
        for c in ['w', 'a', 's', 'd'] {
            assert_eq!(command_for(&press(KeyCode::Char(c))), None);
        }
    }
}
