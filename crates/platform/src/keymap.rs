//! Physical key → scene input. Physical codes make bindings layout- and
//! case-independent.

use scene::{Command, Key};
use winit::keyboard::KeyCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Tracked while held (press sets, release clears).
    Hold(Key),
    /// Fired once per press; auto-repeat is ignored.
    Command(Command),
    Exit,
}

pub fn key_action(code: KeyCode) -> Option<KeyAction> {
    use KeyAction::{Command as Cmd, Hold};

    let action = match code {
        KeyCode::KeyW => Hold(Key::W),
        KeyCode::KeyA => Hold(Key::A),
        KeyCode::KeyS => Hold(Key::S),
        KeyCode::KeyD => Hold(Key::D),
        KeyCode::KeyQ => Hold(Key::Q),
        KeyCode::KeyE => Hold(Key::E),
        KeyCode::ArrowUp => Hold(Key::Up),
        KeyCode::ArrowDown => Hold(Key::Down),
        KeyCode::ArrowLeft => Hold(Key::Left),
        KeyCode::ArrowRight => Hold(Key::Right),

        KeyCode::Digit1 | KeyCode::Numpad1 => Cmd(Command::FreeCamera),
        KeyCode::Digit2 | KeyCode::Numpad2 => Cmd(Command::CockpitCamera),
        KeyCode::Digit3 | KeyCode::Numpad3 => Cmd(Command::ChaseCamera),
        KeyCode::KeyL => Cmd(Command::ToggleLeftDoor),
        KeyCode::KeyR => Cmd(Command::ToggleRightDoor),
        KeyCode::KeyO => Cmd(Command::ToggleGarageDoor),
        KeyCode::KeyF => Cmd(Command::ToggleDayNight),
        KeyCode::KeyG => Cmd(Command::ToggleGarageLight),
        KeyCode::KeyH => Cmd(Command::ToggleHelp),

        KeyCode::Escape => KeyAction::Exit,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_and_driving_keys_are_held() {
        assert_eq!(key_action(KeyCode::KeyW), Some(KeyAction::Hold(Key::W)));
        assert_eq!(key_action(KeyCode::KeyE), Some(KeyAction::Hold(Key::E)));
        assert_eq!(
            key_action(KeyCode::ArrowLeft),
            Some(KeyAction::Hold(Key::Left))
        );
    }

    #[test]
    fn toggles_and_modes_are_commands() {
        assert_eq!(
            key_action(KeyCode::Digit2),
            Some(KeyAction::Command(Command::CockpitCamera))
        );
        assert_eq!(
            key_action(KeyCode::Numpad3),
            Some(KeyAction::Command(Command::ChaseCamera))
        );
        assert_eq!(
            key_action(KeyCode::KeyO),
            Some(KeyAction::Command(Command::ToggleGarageDoor))
        );
        assert_eq!(
            key_action(KeyCode::KeyH),
            Some(KeyAction::Command(Command::ToggleHelp))
        );
    }

    #[test]
    fn escape_exits_and_unbound_keys_are_ignored() {
        assert_eq!(key_action(KeyCode::Escape), Some(KeyAction::Exit));
        assert_eq!(key_action(KeyCode::KeyZ), None);
        assert_eq!(key_action(KeyCode::Space), None);
    }
}
