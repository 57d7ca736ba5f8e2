//! Renderer-agnostic math for the farm viewer: placement transforms, the
//! look-at camera, the prop placement world and shared errors.

pub use glam::{Mat4, Vec2, Vec3, Vec4};

pub mod camera;
pub mod ecs;
pub mod error;
pub mod transform;

pub use error::{CoreError, CoreResult};
