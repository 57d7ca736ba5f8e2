//! Camera controller: free-fly, cockpit and chase modes with smoothed
//! mouse-look.

use corelib::camera::Camera;
use glam::{Vec2, Vec3};

use crate::input::KeyState;
use crate::vehicle::Vehicle;

pub const MOUSE_SENSITIVITY: f32 = 0.05;
pub const MOVE_SPEED: f32 = 10.0;
pub const VERTICAL_SPEED: f32 = 6.0;
/// Weight of the newest mouse sample in the exponential smoother.
pub const MOUSE_SMOOTHING: f32 = 0.25;

pub const FREE_PITCH_LIMIT_DEG: f32 = 89.0;
pub const COCKPIT_YAW_LIMIT_DEG: f32 = 80.0;
pub const COCKPIT_PITCH_LIMIT_DEG: f32 = 45.0;

pub const CHASE_DISTANCE: f32 = 12.0;
pub const CHASE_DISTANCE_MIN: f32 = 4.0;
pub const CHASE_DISTANCE_MAX: f32 = 25.0;
pub const CHASE_ZOOM_SPEED: f32 = 15.0;
pub const CHASE_ORBIT_SPEED_DEG: f32 = 60.0;

const FREE_START: Vec3 = Vec3::new(91.5, 8.68, 149.19);
const FREE_START_YAW_DEG: f32 = 220.0;
const FREE_START_PITCH_DEG: f32 = -10.0;

const COCKPIT_SEAT_FORWARD: f32 = 2.0;
const COCKPIT_EYE_HEIGHT: f32 = 6.0;
const CHASE_EYE_HEIGHT: f32 = 10.0;
const CHASE_TARGET_HEIGHT: f32 = 5.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraMode {
    #[default]
    Free,
    Cockpit,
    Chase,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreeCamera {
    pub position: Vec3,
    pub yaw_deg: f32,
    pub pitch_deg: f32,
}

impl Default for FreeCamera {
    fn default() -> Self {
        Self {
            position: FREE_START,
            yaw_deg: FREE_START_YAW_DEG,
            pitch_deg: FREE_START_PITCH_DEG,
        }
    }
}

impl FreeCamera {
    pub fn look_dir(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw_deg.to_radians(), self.pitch_deg.to_radians());
        Vec3::new(pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos())
    }

    fn update(&mut self, keys: &KeyState, dt: f32) {
        let yaw = self.yaw_deg.to_radians();
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        let right = Vec3::new(-yaw.cos(), 0.0, yaw.sin());
        let step = MOVE_SPEED * dt;

        if keys.w {
            self.position += forward * step;
        }
        if keys.s {
            self.position -= forward * step;
        }
        if keys.a {
            self.position -= right * step;
        }
        if keys.d {
            self.position += right * step;
        }
        if keys.q {
            self.position.y += VERTICAL_SPEED * dt;
        }
        if keys.e {
            self.position.y -= VERTICAL_SPEED * dt;
        }
    }

    fn look(&mut self, delta: Vec2) {
        self.yaw_deg = (self.yaw_deg - delta.x * MOUSE_SENSITIVITY).rem_euclid(360.0);
        self.pitch_deg = (self.pitch_deg - delta.y * MOUSE_SENSITIVITY)
            .clamp(-FREE_PITCH_LIMIT_DEG, FREE_PITCH_LIMIT_DEG);
    }
}

/// Head offsets relative to the driving direction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CockpitCamera {
    pub yaw_offset_deg: f32,
    pub pitch_deg: f32,
}

impl CockpitCamera {
    fn look(&mut self, delta: Vec2) {
        let sens = MOUSE_SENSITIVITY * 0.5;
        self.yaw_offset_deg = (self.yaw_offset_deg + delta.x * sens)
            .clamp(-COCKPIT_YAW_LIMIT_DEG, COCKPIT_YAW_LIMIT_DEG);
        self.pitch_deg = (self.pitch_deg - delta.y * sens)
            .clamp(-COCKPIT_PITCH_LIMIT_DEG, COCKPIT_PITCH_LIMIT_DEG);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChaseCamera {
    pub distance: f32,
    pub orbit_deg: f32,
}

impl Default for ChaseCamera {
    fn default() -> Self {
        Self {
            distance: CHASE_DISTANCE,
            orbit_deg: 0.0,
        }
    }
}

impl ChaseCamera {
    fn update(&mut self, keys: &KeyState, dt: f32) {
        if keys.w {
            self.distance -= CHASE_ZOOM_SPEED * dt;
        }
        if keys.s {
            self.distance += CHASE_ZOOM_SPEED * dt;
        }
        self.distance = self.distance.clamp(CHASE_DISTANCE_MIN, CHASE_DISTANCE_MAX);
        if keys.a {
            self.orbit_deg += CHASE_ORBIT_SPEED_DEG * dt;
        }
        if keys.d {
            self.orbit_deg -= CHASE_ORBIT_SPEED_DEG * dt;
        }
    }
}

/// Exponential moving average of raw mouse deltas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MouseSmoother {
    pub smoothed: Vec2,
}

impl MouseSmoother {
    pub fn push(&mut self, raw: Vec2) -> Vec2 {
        self.smoothed = self.smoothed * (1.0 - MOUSE_SMOOTHING) + raw * MOUSE_SMOOTHING;
        self.smoothed
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraController {
    pub mode: CameraMode,
    pub free: FreeCamera,
    pub cockpit: CockpitCamera,
    pub chase: ChaseCamera,
    smoother: MouseSmoother,
    center: Vec2,
    /// The next motion event is our own pointer warp.
    ignore_next_motion: bool,
}

impl CameraController {
    pub fn new(width: u32, height: u32) -> Self {
        let mut controller = Self::default();
        controller.set_viewport(width, height);
        controller
    }

    /// Recenter the pointer anchor (integer half extents).
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.center = Vec2::new((width / 2) as f32, (height / 2) as f32);
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn set_mode(&mut self, mode: CameraMode) {
        if mode == CameraMode::Cockpit {
            self.cockpit = CockpitCamera::default();
        }
        self.mode = mode;
    }

    /// Per-tick keyboard movement.
    pub fn update(&mut self, keys: &KeyState, dt: f32) {
        match self.mode {
            CameraMode::Free => self.free.update(keys, dt),
            CameraMode::Chase => self.chase.update(keys, dt),
            CameraMode::Cockpit => {}
        }
    }

    /// Feed an absolute pointer position. Returns where the pointer should be
    /// warped to, if anywhere.
    pub fn on_mouse_motion(&mut self, x: f32, y: f32) -> Option<Vec2> {
        if self.ignore_next_motion {
            self.ignore_next_motion = false;
            return None;
        }
        if self.mode == CameraMode::Chase {
            return None;
        }

        let delta = self.smoother.push(Vec2::new(x, y) - self.center);
        match self.mode {
            CameraMode::Free => self.free.look(delta),
            CameraMode::Cockpit => self.cockpit.look(delta),
            CameraMode::Chase => {}
        }

        self.ignore_next_motion = true;
        Some(self.center)
    }

    /// The requested warp did not happen: no echo is coming, and the pointer
    /// stays where it is, so deltas are measured from there.
    pub fn warp_failed(&mut self, x: f32, y: f32) {
        self.ignore_next_motion = false;
        self.center = Vec2::new(x, y);
    }

    /// Eye and look-at target for the current mode.
    pub fn eye_target(&self, vehicle: &Vehicle) -> (Vec3, Vec3) {
        match self.mode {
            CameraMode::Free => {
                let eye = self.free.position;
                (eye, eye + self.free.look_dir())
            }
            CameraMode::Cockpit => {
                let heading = vehicle.heading_deg.to_radians();
                let seat = Vec3::new(
                    vehicle.x + heading.cos() * COCKPIT_SEAT_FORWARD,
                    COCKPIT_EYE_HEIGHT,
                    vehicle.z + heading.sin() * COCKPIT_SEAT_FORWARD,
                );
                let yaw =
                    (vehicle.heading_deg + 180.0 + self.cockpit.yaw_offset_deg).to_radians();
                let pitch = self.cockpit.pitch_deg.to_radians();
                let look = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
                (seat, seat + look)
            }
            CameraMode::Chase => {
                let back = (vehicle.heading_deg + 180.0).to_radians();
                let offset = -Vec2::new(back.cos(), back.sin()) * self.chase.distance;
                let orbit = Vec2::from_angle(self.chase.orbit_deg.to_radians());
                let offset = orbit.rotate(offset);
                let eye = Vec3::new(vehicle.x + offset.x, CHASE_EYE_HEIGHT, vehicle.z + offset.y);
                let target = Vec3::new(vehicle.x, CHASE_TARGET_HEIGHT, vehicle.z);
                (eye, target)
            }
        }
    }

    pub fn camera(&self, vehicle: &Vehicle, aspect: f32) -> Camera {
        let (eye, target) = self.eye_target(vehicle);
        Camera::look_at(eye, target, aspect)
    }
}
