//! Tractor kinematics (bicycle model), door animation and per-part transforms.

use corelib::transform::pivot_rotation;
use glam::{Mat4, Vec3};

/// Driving speed in units per second.
pub const BASE_SPEED: f32 = 4.0;
pub const MAX_STEER_DEG: f32 = 30.0;
/// Steering slew rate, also used for auto-centering.
pub const STEER_SPEED_DEG: f32 = 80.0;
/// Distance between axles.
pub const WHEEL_BASE: f32 = 6.5;

pub const BACK_SPIN_PER_UNIT: f32 = 40.0;
pub const FRONT_SPIN_PER_UNIT: f32 = 60.0;

pub const DOOR_SPEED_DEG: f32 = 120.0;
pub const DOOR_OPEN_DEG: f32 = 90.0;

pub const GLASS_ALPHA: f32 = 0.35;
/// Height of the model origin above the ground.
pub const RIDE_HEIGHT: f32 = 4.0;

const LEFT_DOOR_PIVOT: Vec3 = Vec3::new(2.2, -2.0, -2.0);
const RIGHT_DOOR_PIVOT: Vec3 = Vec3::new(2.2, -2.0, 2.0);
const LEFT_DOOR_SIGN: f32 = -1.0;
const RIGHT_DOOR_SIGN: f32 = 1.0;

const BACK_WHEELS_PIVOT: Vec3 = Vec3::new(3.55, 1.75, 0.0);
const FRONT_WHEELS_PIVOT: Vec3 = Vec3::new(-3.6, 2.35, 0.0);

const STEERING_WHEEL_PIVOT: Vec3 = Vec3::new(0.6, -1.25, 0.1);
const STEERING_AXIS: Vec3 = Vec3::new(-10.0, 7.0, -0.1);
const STEERING_WHEEL_FACTOR: f32 = 3.0;

const START_X: f32 = 0.0;
const START_Z: f32 = 100.0;
const START_HEADING_DEG: f32 = 90.0;

/// Held driving keys for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VehicleInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Door {
    pub angle: f32,
    pub target: f32,
}

impl Door {
    const CLOSED: Door = Door {
        angle: 0.0,
        target: 0.0,
    };

    /// Move toward the target without overshooting it.
    fn step(&mut self, dt: f32) {
        if self.angle == self.target {
            return;
        }
        let step = DOOR_SPEED_DEG * dt;
        self.angle = if self.angle < self.target {
            (self.angle + step).min(self.target)
        } else {
            (self.angle - step).max(self.target)
        };
    }

    fn rotate_target(&mut self, delta_deg: f32) {
        self.target = (self.target + delta_deg).clamp(0.0, DOOR_OPEN_DEG);
    }

    /// Open fully when (nearly) closed, otherwise close.
    fn toggle(&mut self) {
        if self.angle < 1.0 {
            self.rotate_target(DOOR_OPEN_DEG);
        } else {
            self.rotate_target(-DOOR_OPEN_DEG);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    pub x: f32,
    pub z: f32,
    pub heading_deg: f32,
    pub steer_deg: f32,
    pub left_door: Door,
    pub right_door: Door,
    pub back_wheel_spin: f32,
    pub front_wheel_spin: f32,
}

impl Default for Vehicle {
    fn default() -> Self {
        Self::new(START_X, START_Z, START_HEADING_DEG)
    }
}

impl Vehicle {
    pub fn new(x: f32, z: f32, heading_deg: f32) -> Self {
        Self {
            x,
            z,
            heading_deg,
            steer_deg: 0.0,
            left_door: Door::CLOSED,
            right_door: Door::CLOSED,
            back_wheel_spin: 0.0,
            front_wheel_spin: 0.0,
        }
    }

    pub fn update(&mut self, input: VehicleInput, dt: f32) {
        let mut v = 0.0;
        if input.forward {
            v += BASE_SPEED;
        }
        if input.back {
            v -= BASE_SPEED;
        }
        let dist = v * dt;

        self.steer(input, dt);

        if dist.abs() > 1e-5 && self.steer_deg.abs() > 1e-3 {
            self.heading_deg += heading_delta_deg(dist, self.steer_deg, WHEEL_BASE);
        }

        let heading = self.heading_deg.to_radians();
        self.x -= dist * heading.cos();
        self.z -= dist * heading.sin();

        self.back_wheel_spin += BACK_SPIN_PER_UNIT * dist;
        self.front_wheel_spin += FRONT_SPIN_PER_UNIT * dist;

        self.left_door.step(dt);
        self.right_door.step(dt);
    }

    fn steer(&mut self, input: VehicleInput, dt: f32) {
        let step = STEER_SPEED_DEG * dt;
        if input.left {
            self.steer_deg = (self.steer_deg - step).max(-MAX_STEER_DEG);
        }
        if input.right {
            self.steer_deg = (self.steer_deg + step).min(MAX_STEER_DEG);
        }
        if !input.left && !input.right {
            if self.steer_deg > 0.0 {
                self.steer_deg = (self.steer_deg - step).max(0.0);
            } else if self.steer_deg < 0.0 {
                self.steer_deg = (self.steer_deg + step).min(0.0);
            }
        }
    }

    pub fn toggle_left_door(&mut self) {
        self.left_door.toggle();
    }

    pub fn toggle_right_door(&mut self) {
        self.right_door.toggle();
    }

    /// Ground-plane position (x, z).
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.z)
    }

    /// Model → world. The model is authored upside down and facing the
    /// opposite way of the motion vector, hence the flip about X.
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.x, RIDE_HEIGHT, self.z))
            * Mat4::from_rotation_x(180f32.to_radians())
            * Mat4::from_rotation_y(self.heading_deg.to_radians())
    }

    /// Local transform of a part within the model.
    pub fn part_matrix(&self, part: PartKind) -> Mat4 {
        match part {
            PartKind::LeftDoor => {
                pivot_rotation(LEFT_DOOR_PIVOT, Vec3::Y, LEFT_DOOR_SIGN * self.left_door.angle)
            }
            PartKind::RightDoor => pivot_rotation(
                RIGHT_DOOR_PIVOT,
                Vec3::Y,
                RIGHT_DOOR_SIGN * self.right_door.angle,
            ),
            PartKind::SteeringWheel => pivot_rotation(
                STEERING_WHEEL_PIVOT,
                STEERING_AXIS,
                self.steer_deg * STEERING_WHEEL_FACTOR,
            ),
            PartKind::BackWheels => wheel_spin(BACK_WHEELS_PIVOT, self.back_wheel_spin),
            PartKind::FrontWheels => {
                pivot_rotation(FRONT_WHEELS_PIVOT, Vec3::Y, self.steer_deg)
                    * wheel_spin(FRONT_WHEELS_PIVOT, self.front_wheel_spin)
            }
            PartKind::Glass | PartKind::Body => Mat4::IDENTITY,
        }
    }
}

fn wheel_spin(pivot: Vec3, spin_deg: f32) -> Mat4 {
    pivot_rotation(pivot, Vec3::Z, -spin_deg)
}

/// Bicycle model: yaw change in degrees for travelling `dist` with the front
/// axle steered by `steer_deg`.
pub fn heading_delta_deg(dist: f32, steer_deg: f32, wheel_base: f32) -> f32 {
    let turn_radius = wheel_base / steer_deg.to_radians().tan();
    (dist / turn_radius).to_degrees()
}

/// Role of a tractor mesh, derived from its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartKind {
    LeftDoor,
    RightDoor,
    Glass,
    SteeringWheel,
    BackWheels,
    FrontWheels,
    Body,
}

impl PartKind {
    pub fn classify(name: &str) -> Self {
        let n = name.to_lowercase();
        if n.contains("left_door") || (n.contains("door") && n.contains("left")) {
            PartKind::LeftDoor
        } else if n.contains("right_door") || (n.contains("door") && n.contains("right")) {
            PartKind::RightDoor
        } else if n.contains("glass") {
            PartKind::Glass
        } else if n.contains("steer") {
            PartKind::SteeringWheel
        } else if ["back_wheel", "rear_wheel", "backwheels", "rearwheels"]
            .iter()
            .any(|k| n.contains(k))
        {
            PartKind::BackWheels
        } else if ["front_wheel", "frontwheels", "fwheels"]
            .iter()
            .any(|k| n.contains(k))
        {
            PartKind::FrontWheels
        } else {
            PartKind::Body
        }
    }

    /// Drawn in the blended second pass.
    pub fn is_translucent(self) -> bool {
        matches!(self, PartKind::LeftDoor | PartKind::RightDoor | PartKind::Glass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn held(forward: bool, back: bool, left: bool, right: bool) -> VehicleInput {
        VehicleInput {
            forward,
            back,
            left,
            right,
        }
    }

    #[test]
    fn steering_is_clamped() {
        let mut v = Vehicle::default();
        for _ in 0..200 {
            v.update(held(false, false, false, true), DT);
            assert!(v.steer_deg <= MAX_STEER_DEG);
        }
        assert_eq!(v.steer_deg, MAX_STEER_DEG);
        for _ in 0..400 {
            v.update(held(false, false, true, false), DT);
            assert!(v.steer_deg >= -MAX_STEER_DEG);
        }
        assert_eq!(v.steer_deg, -MAX_STEER_DEG);
    }

    #[test]
    fn steering_recenters_without_overshoot() {
        let mut v = Vehicle::default();
        v.steer_deg = 30.0;
        let mut previous = v.steer_deg;
        for _ in 0..100 {
            v.update(VehicleInput::default(), 0.05);
            assert!(v.steer_deg >= 0.0);
            assert!(v.steer_deg <= previous);
            previous = v.steer_deg;
        }
        assert_eq!(v.steer_deg, 0.0);

        v.steer_deg = -1.0;
        v.update(VehicleInput::default(), 0.1);
        assert_eq!(v.steer_deg, 0.0);
    }

    #[test]
    fn opposite_pedals_cancel() {
        let mut v = Vehicle::default();
        v.update(held(true, true, false, false), 0.1);
        assert_eq!(v.position(), (START_X, START_Z));
        assert_eq!(v.back_wheel_spin, 0.0);
    }

    #[test]
    fn straight_motion_goes_against_heading() {
        let mut v = Vehicle::new(0.0, 0.0, 0.0);
        v.update(held(true, false, false, false), 0.25);
        assert!((v.x + 1.0).abs() < 1e-6);
        assert!(v.z.abs() < 1e-6);
        assert_eq!(v.heading_deg, 0.0);
        assert!((v.back_wheel_spin - 40.0).abs() < 1e-4);
        assert!((v.front_wheel_spin - 60.0).abs() < 1e-4);
    }

    #[test]
    fn bicycle_model_turn_radius() {
        let expected = (1.0 / (6.5 / 30f32.to_radians().tan())).to_degrees();
        let delta = heading_delta_deg(1.0, 30.0, WHEEL_BASE);
        assert!(delta != 0.0);
        assert!((delta - expected).abs() < 1e-4);

        // Same through the full update: steering held at the clamp, d = 4 * 0.25.
        let mut v = Vehicle::new(0.0, 0.0, 0.0);
        v.steer_deg = 30.0;
        v.update(held(true, false, false, true), 0.25);
        assert!((v.heading_deg - expected).abs() < 1e-3);
    }

    #[test]
    fn no_heading_change_when_stationary_or_straight() {
        let mut v = Vehicle::new(0.0, 0.0, 45.0);
        v.steer_deg = 20.0;
        v.update(held(false, false, false, true), 0.1);
        assert_eq!(v.heading_deg, 45.0);

        let mut v = Vehicle::new(0.0, 0.0, 45.0);
        v.update(held(true, false, false, false), 0.1);
        assert_eq!(v.heading_deg, 45.0);
    }

    #[test]
    fn door_reaches_target_exactly_and_stays() {
        let mut v = Vehicle::default();
        v.toggle_left_door();
        assert_eq!(v.left_door.target, DOOR_OPEN_DEG);
        for _ in 0..10 {
            v.update(VehicleInput::default(), 0.1);
            assert!(v.left_door.angle <= DOOR_OPEN_DEG);
        }
        assert_eq!(v.left_door.angle, DOOR_OPEN_DEG);
        v.update(VehicleInput::default(), 0.1);
        assert_eq!(v.left_door.angle, DOOR_OPEN_DEG);
        assert_eq!(v.right_door.angle, 0.0);

        v.toggle_left_door();
        assert_eq!(v.left_door.target, 0.0);
        for _ in 0..10 {
            v.update(VehicleInput::default(), 0.1);
        }
        assert_eq!(v.left_door.angle, 0.0);
    }

    #[test]
    fn door_targets_stay_in_range() {
        let mut v = Vehicle::default();
        v.right_door.rotate_target(500.0);
        assert_eq!(v.right_door.target, DOOR_OPEN_DEG);
        v.right_door.rotate_target(-1000.0);
        assert_eq!(v.right_door.target, 0.0);
    }

    #[test]
    fn parts_are_classified_by_name() {
        assert_eq!(PartKind::classify("Left_Door_Glass"), PartKind::LeftDoor);
        assert_eq!(PartKind::classify("door.right"), PartKind::RightDoor);
        assert_eq!(PartKind::classify("WindshieldGlass"), PartKind::Glass);
        assert_eq!(PartKind::classify("steering_wheel"), PartKind::SteeringWheel);
        assert_eq!(PartKind::classify("Rear_Wheels"), PartKind::BackWheels);
        assert_eq!(PartKind::classify("front_wheels_L"), PartKind::FrontWheels);
        assert_eq!(PartKind::classify("chassis"), PartKind::Body);
        assert!(PartKind::LeftDoor.is_translucent());
        assert!(!PartKind::FrontWheels.is_translucent());
    }

    #[test]
    fn closed_doors_and_straight_wheels_are_identity() {
        let v = Vehicle::default();
        for part in [PartKind::LeftDoor, PartKind::SteeringWheel, PartKind::FrontWheels] {
            let m = v.part_matrix(part);
            assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-5), "{part:?}");
        }
    }

    #[test]
    fn world_matrix_places_model_at_ride_height() {
        let v = Vehicle::new(3.0, -7.0, 30.0);
        let origin = v.world_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(3.0, RIDE_HEIGHT, -7.0)).length() < 1e-5);
    }
}
