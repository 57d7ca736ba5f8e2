//! Uniform blocks shared with `shaders/scene.wgsl`.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use scene::frame::{DrawCall, Frame};

/// Dynamic-offset stride for per-draw uniforms (the minimum offset alignment
/// every backend accepts).
pub const DRAW_UNIFORM_STRIDE: usize = 256;

/// Light model ambient added to every lit draw.
const GLOBAL_AMBIENT: f32 = 0.2;

/// Per-frame scene UBO (16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub sun_dir: [f32; 4],
    pub sun_diffuse: [f32; 4],
    pub sun_specular: [f32; 4],
    pub sun_ambient: [f32; 4],
    pub spot_pos: [f32; 4],
    pub spot_dir: [f32; 4],
    pub spot_color: [f32; 4],
    pub spot_atten: [f32; 4],
    pub fog_color: [f32; 4],
    pub params: [f32; 4],
}

fn v4(v: Vec3, w: f32) -> [f32; 4] {
    v.extend(w).to_array()
}

impl SceneUniform {
    pub fn from_frame(frame: &Frame<'_>) -> Self {
        let lights = &frame.lights;
        let sun = &lights.sun;
        let spot = &lights.spot;
        let [c, l, q] = spot.attenuation;
        Self {
            view_proj: frame.view_proj().to_cols_array_2d(),
            camera_pos: v4(frame.camera.eye, 1.0),
            sun_dir: v4(sun.direction, 0.0),
            sun_diffuse: v4(sun.diffuse, 1.0),
            sun_specular: v4(sun.specular, 1.0),
            sun_ambient: v4(sun.ambient, 1.0),
            spot_pos: v4(spot.position, 1.0),
            spot_dir: v4(spot.direction, spot.cutoff_deg.to_radians().cos()),
            spot_color: v4(spot.color, spot.exponent),
            spot_atten: [c, l, q, 0.0],
            fog_color: lights.fog_color.to_array(),
            params: [
                lights.fog_density,
                lights.specular_strength,
                lights.shininess,
                GLOBAL_AMBIENT,
            ],
        }
    }
}

/// Per-draw UBO, written at `DRAW_UNIFORM_STRIDE` offsets.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DrawUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub flags: [f32; 4],
}

impl DrawUniform {
    pub fn from_draw(draw: &DrawCall<'_>) -> Self {
        Self {
            model: draw.model.to_cols_array_2d(),
            normal_matrix: normal_matrix(draw.model).to_cols_array_2d(),
            color: draw.color.to_array(),
            flags: [if draw.lit { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// Inverse-transpose; singular matrices (zero scale) fall back to the model.
pub fn normal_matrix(model: Mat4) -> Mat4 {
    if model.determinant().abs() > f32::EPSILON {
        model.inverse().transpose()
    } else {
        model
    }
}

/// All draw uniforms of a frame, padded to the dynamic-offset stride.
pub fn pack_draw_uniforms(draws: &[DrawCall<'_>]) -> Vec<u8> {
    let mut bytes = vec![0u8; draws.len() * DRAW_UNIFORM_STRIDE];
    for (chunk, draw) in bytes.chunks_exact_mut(DRAW_UNIFORM_STRIDE).zip(draws) {
        let uniform = DrawUniform::from_draw(draw);
        let src = bytemuck::bytes_of(&uniform);
        chunk[..src.len()].copy_from_slice(src);
    }
    bytes
}

pub fn clear_color(rgba: [f32; 4]) -> wgpu::Color {
    let [r, g, b, a] = rgba.map(f64::from);
    wgpu::Color { r, g, b, a }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset::{DrawList, MeshDraw};
    use scene::frame::DrawTag;

    #[test]
    fn uniform_sizes_fit_the_shader_layout() {
        assert_eq!(std::mem::size_of::<SceneUniform>(), 240);
        assert_eq!(std::mem::size_of::<DrawUniform>(), 160);
        assert!(std::mem::size_of::<DrawUniform>() <= DRAW_UNIFORM_STRIDE);
    }

    #[test]
    fn draw_uniforms_are_strided() {
        let draws = vec![
            DrawCall::new(
                DrawTag::Ground,
                MeshDraw::Immediate(DrawList::default()),
                Mat4::IDENTITY,
            ),
            DrawCall::new(
                DrawTag::Indicator,
                MeshDraw::Immediate(DrawList::default()),
                Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            )
            .unlit(),
        ];
        let bytes = pack_draw_uniforms(&draws);
        assert_eq!(bytes.len(), 2 * DRAW_UNIFORM_STRIDE);

        let second: DrawUniform = bytemuck::pod_read_unaligned(
            &bytes[DRAW_UNIFORM_STRIDE..DRAW_UNIFORM_STRIDE + std::mem::size_of::<DrawUniform>()],
        );
        assert_eq!(second.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(second.flags[0], 0.0);
        let first: DrawUniform =
            bytemuck::pod_read_unaligned(&bytes[..std::mem::size_of::<DrawUniform>()]);
        assert_eq!(first.flags[0], 1.0);
    }

    #[test]
    fn normal_matrix_handles_scale() {
        let m = Mat4::from_scale(Vec3::new(2.0, 2.0, 2.0));
        let n = normal_matrix(m);
        assert!((n.x_axis.x - 0.5).abs() < 1e-6);
        assert_eq!(normal_matrix(Mat4::ZERO), Mat4::ZERO);
    }
}
