//! Scene logic: animators, cameras, lighting and per-frame composition.
//! Everything here is renderer-agnostic; a frame is described as an ordered
//! list of draw calls that the GPU backend executes.

pub mod assets;
pub mod camera;
pub mod composer;
pub mod frame;
pub mod garage;
pub mod ground;
pub mod input;
pub mod lighting;
pub mod shapes;
pub mod vehicle;

pub use assets::{FarmAssets, load_farm};
pub use composer::{HELP_COLLAPSED, HELP_LINES, MAX_DT, Scene};
pub use frame::{BlendMode, DrawCall, DrawTag, Frame, RenderState};
pub use input::{Command, Key, KeyState};
