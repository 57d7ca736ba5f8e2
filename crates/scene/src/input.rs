//! Held keys and discrete commands, independent of the windowing backend.

use crate::vehicle::VehicleInput;

/// Keys whose held state matters between frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    /// Camera movement keys (as opposed to driving keys).
    pub fn is_camera_key(self) -> bool {
        matches!(self, Key::W | Key::A | Key::S | Key::D | Key::Q | Key::E)
    }
}

/// One-shot actions triggered on key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    FreeCamera,
    CockpitCamera,
    ChaseCamera,
    ToggleLeftDoor,
    ToggleRightDoor,
    ToggleGarageDoor,
    ToggleDayNight,
    ToggleGarageLight,
    ToggleHelp,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    pub w: bool,
    pub a: bool,
    pub s: bool,
    pub d: bool,
    pub q: bool,
    pub e: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl KeyState {
    pub fn set(&mut self, key: Key, pressed: bool) {
        let slot = match key {
            Key::W => &mut self.w,
            Key::A => &mut self.a,
            Key::S => &mut self.s,
            Key::D => &mut self.d,
            Key::Q => &mut self.q,
            Key::E => &mut self.e,
            Key::Up => &mut self.up,
            Key::Down => &mut self.down,
            Key::Left => &mut self.left,
            Key::Right => &mut self.right,
        };
        *slot = pressed;
    }

    pub fn vehicle_input(&self) -> VehicleInput {
        VehicleInput {
            forward: self.up,
            back: self.down,
            left: self.left,
            right: self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_drive_the_vehicle() {
        let mut keys = KeyState::default();
        keys.set(Key::Up, true);
        keys.set(Key::Left, true);
        keys.set(Key::W, true);
        let input = keys.vehicle_input();
        assert!(input.forward && input.left);
        assert!(!input.back && !input.right);
        assert!(keys.w);
        keys.set(Key::W, false);
        assert!(!keys.w);
    }

    #[test]
    fn camera_keys() {
        assert!(Key::Q.is_camera_key());
        assert!(!Key::Up.is_camera_key());
    }
}
