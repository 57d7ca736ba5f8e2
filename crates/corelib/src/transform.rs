use crate::{Mat4, Vec3};

/// Placement of a scene object: position, yaw about +Y and uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub yaw_deg: f32,
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        yaw_deg: 0.0,
        scale: 1.0,
    };

    pub fn from_placement(translation: Vec3, yaw_deg: f32, scale: f32) -> Self {
        Self {
            translation,
            yaw_deg,
            scale,
        }
    }

    /// translate · rotY · scale
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_rotation_y(self.yaw_deg.to_radians())
            * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Rotation of `degrees` about `axis` through `pivot`:
/// translate to the pivot, rotate, translate back.
///
/// `axis` does not need to be normalized; a zero axis yields identity.
pub fn pivot_rotation(pivot: Vec3, axis: Vec3, degrees: f32) -> Mat4 {
    let Some(axis) = axis.try_normalize() else {
        return Mat4::IDENTITY;
    };
    Mat4::from_translation(pivot)
        * Mat4::from_axis_angle(axis, degrees.to_radians())
        * Mat4::from_translation(-pivot)
}
