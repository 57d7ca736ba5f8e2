//! Tilting garage door.

use corelib::transform::{Transform, pivot_rotation};
use glam::{Mat4, Vec3};

/// Fraction of the full travel per second.
pub const DOOR_SPEED: f32 = 1.5;
pub const MAX_TILT_DEG: f32 = 100.0;
/// Mesh animated about the hinge; everything else in the model is static.
pub const DOOR_MESH: &str = "door";

const HINGE: Vec3 = Vec3::new(-5.1, 3.0, -0.1);
const HINGE_AXIS: Vec3 = Vec3::new(0.0, 0.0, -1.0);

const POSITION: Vec3 = Vec3::new(0.3, 2.8, -30.0);
const YAW_DEG: f32 = 90.0;
const SCALE: f32 = 2.0;

/// Placement of the garage model in the world.
pub fn placement() -> Transform {
    Transform::from_placement(POSITION, YAW_DEG, SCALE)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GarageDoor {
    /// 0 = closed, 1 = open.
    pub open: f32,
    pub target: f32,
}

impl GarageDoor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.target = 1.0;
    }

    pub fn close(&mut self) {
        self.target = 0.0;
    }

    pub fn toggle(&mut self) {
        if self.target > 0.5 {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn update(&mut self, dt: f32) {
        let step = DOOR_SPEED * dt;
        if self.open < self.target {
            self.open = (self.open + step).min(self.target);
        } else if self.open > self.target {
            self.open = (self.open - step).max(self.target);
        }
    }

    pub fn tilt_deg(&self) -> f32 {
        self.open * MAX_TILT_DEG
    }

    /// Local transform of the door mesh within the garage model.
    pub fn door_matrix(&self) -> Mat4 {
        pivot_rotation(HINGE, HINGE_AXIS, self.tilt_deg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_and_stops_at_target() {
        let mut door = GarageDoor::new();
        door.toggle();
        assert_eq!(door.target, 1.0);
        for _ in 0..10 {
            door.update(0.1);
            assert!((0.0..=1.0).contains(&door.open));
        }
        assert_eq!(door.open, 1.0);
        assert_eq!(door.tilt_deg(), MAX_TILT_DEG);
    }

    #[test]
    fn toggle_reverses_mid_travel() {
        let mut door = GarageDoor::new();
        door.open();
        door.update(0.2);
        assert!((door.open - 0.3).abs() < 1e-6);
        door.toggle();
        assert_eq!(door.target, 0.0);
        door.update(0.1);
        assert!((door.open - 0.15).abs() < 1e-6);
        door.update(1.0);
        assert_eq!(door.open, 0.0);
    }

    #[test]
    fn closed_door_is_untransformed() {
        let door = GarageDoor::new();
        assert!(door.door_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
        let hinge = door.door_matrix().transform_point3(HINGE);
        assert!((hinge - HINGE).length() < 1e-6);
    }

    #[test]
    fn placement_matches_world_layout() {
        let origin = placement().matrix().transform_point3(Vec3::ZERO);
        assert!((origin - POSITION).length() < 1e-6);
    }
}
