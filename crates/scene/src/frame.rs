//! Backend-neutral description of one rendered frame.

use asset::MeshDraw;
use corelib::camera::Camera;
use glam::{Mat4, Vec4};

use crate::lighting::LightParams;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    #[default]
    Opaque,
    /// src-alpha / one-minus-src-alpha.
    Alpha,
}

/// Fixed-function state a draw needs; the renderer keeps one pipeline per
/// distinct value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderState {
    pub blend: BlendMode,
    pub depth_write: bool,
}

impl RenderState {
    pub const OPAQUE: Self = Self {
        blend: BlendMode::Opaque,
        depth_write: true,
    };

    pub const TRANSLUCENT: Self = Self {
        blend: BlendMode::Alpha,
        depth_write: false,
    };
}

impl Default for RenderState {
    fn default() -> Self {
        Self::OPAQUE
    }
}

/// What a draw belongs to; used for ordering checks and debug logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawTag {
    Indicator,
    Ground,
    Prop,
    Garage,
    Vehicle,
    VehicleGlass,
}

#[derive(Debug)]
pub struct DrawCall<'a> {
    pub tag: DrawTag,
    pub geometry: MeshDraw<'a>,
    pub model: Mat4,
    /// Multiplied with the texture sample.
    pub color: Vec4,
    /// Unlit draws output `color * texture` directly (still fogged).
    pub lit: bool,
    pub state: RenderState,
}

impl<'a> DrawCall<'a> {
    pub fn new(tag: DrawTag, geometry: MeshDraw<'a>, model: Mat4) -> Self {
        Self {
            tag,
            geometry,
            model,
            color: Vec4::ONE,
            lit: true,
            state: RenderState::OPAQUE,
        }
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn unlit(mut self) -> Self {
        self.lit = false;
        self
    }

    pub fn with_state(mut self, state: RenderState) -> Self {
        self.state = state;
        self
    }
}

#[derive(Debug)]
pub struct Frame<'a> {
    pub clear_color: [f32; 4],
    pub camera: Camera,
    pub lights: LightParams,
    /// Executed in order.
    pub draws: Vec<DrawCall<'a>>,
    pub help_visible: bool,
}

impl Frame<'_> {
    pub fn view_proj(&self) -> Mat4 {
        self.camera.proj_view()
    }
}
