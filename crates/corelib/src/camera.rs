use crate::{Mat4, Vec3};

/// Viewer projection: 60° vertical FOV, near 0.1, far 500.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_deg: 60.0,
            near: 0.1,
            far: 500.0,
        }
    }
}

impl Projection {
    /// Right-handed perspective with wgpu's [0,1] depth range.
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_deg.to_radians(),
            aspect.max(1e-6),
            self.near,
            self.far,
        )
    }
}

/// Eye/target pair with +Y up, plus the projection it is seen through.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub aspect: f32,
    pub projection: Projection,
}

impl Camera {
    pub fn look_at(eye: Vec3, target: Vec3, aspect: f32) -> Self {
        Self {
            eye,
            target,
            aspect,
            projection: Projection::default(),
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn proj_view(&self) -> Mat4 {
        self.projection.matrix(self.aspect) * self.view()
    }
}

/// Aspect ratio for a viewport; a zero height is treated as one pixel.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}
