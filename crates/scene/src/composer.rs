//! Scene state and per-frame composition.

use asset::{MaterialLibrary, Mesh, ObjModel};
use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::assets::FarmAssets;
use crate::camera::{CameraController, CameraMode};
use crate::frame::{DrawCall, DrawTag, Frame, RenderState};
use crate::garage::{self, DOOR_MESH, GarageDoor};
use crate::ground::Ground;
use crate::input::{Command, Key, KeyState};
use crate::lighting::{LAMP_POSITION, Lighting, SUN_DIRECTION};
use crate::shapes;
use crate::vehicle::{GLASS_ALPHA, PartKind, Vehicle};

/// Longest simulated step; slower frames are slowed down instead.
pub const MAX_DT: f32 = 0.1;

pub const HELP_LINES: &[&str] = &[
    "COMMANDS",
    "[ H ] Hide help",
    "",
    "GENERAL:",
    "[ F ] Day / Night",
    "[ Mouse ] Look around",
    "[ A, W, S, D ] Move free camera",
    "[ Q, E ] Free camera up / down",
    "[ 1 ] Free camera",
    "[ 2 ] First person",
    "[ 3 ] Third person",
    "",
    "TRACTOR:",
    "[ Arrows ] Drive",
    "[ L / R ] Tractor doors",
    "",
    "INTERACTION:",
    "[ O ] Garage gate",
    "[ G ] Garage light",
];

pub const HELP_COLLAPSED: &str = "[ H ] Commands";

const SUN_DISTANCE: f32 = 140.0;
const SUN_COLOR: Vec4 = Vec4::new(1.0, 0.9, 0.2, 1.0);
const MOON_COLOR: Vec4 = Vec4::new(0.8, 0.8, 0.9, 1.0);
const BULB_ON: Vec4 = Vec4::new(1.0, 1.0, 0.7, 1.0);
const BULB_OFF: Vec4 = Vec4::new(0.2, 0.2, 0.2, 1.0);
const LAMP_METAL: Vec4 = Vec4::new(0.1, 0.1, 0.1, 1.0);
const SHADE_LENGTH: f32 = 1.2;
const ROD_LENGTH: f32 = 5.3;

/// Sun/moon spheres and the garage lamp fixture.
#[derive(Debug)]
struct Indicators {
    sun: Mesh,
    moon: Mesh,
    bulb: Mesh,
    shade: Mesh,
    shade_cap: Mesh,
    rod: Mesh,
    rod_cap: Mesh,
    untextured: MaterialLibrary,
}

impl Indicators {
    fn new() -> Self {
        Self {
            sun: shapes::sphere(8.0, 24, 24),
            moon: shapes::sphere(6.0, 24, 24),
            bulb: shapes::sphere(0.3, 16, 16),
            shade: shapes::cylinder(1.0, 0.2, SHADE_LENGTH, 24),
            shade_cap: shapes::disk(0.0, 0.2, 24),
            rod: shapes::cylinder(0.1, 0.1, ROD_LENGTH, 12),
            rod_cap: shapes::disk(0.0, 0.6, 24),
            untextured: MaterialLibrary::new(),
        }
    }

    fn push_draws<'a>(&'a self, lighting: &Lighting, draws: &mut Vec<DrawCall<'a>>) {
        let lib = Some(&self.untextured);
        let draw = |mesh: &'a Mesh, model: Mat4| {
            DrawCall::new(DrawTag::Indicator, mesh.draw(lib), model)
        };

        let sky = Mat4::from_translation(SUN_DIRECTION * SUN_DISTANCE);
        draws.push(if lighting.day {
            draw(&self.sun, sky).with_color(SUN_COLOR).unlit()
        } else {
            draw(&self.moon, sky).with_color(MOON_COLOR).unlit()
        });

        let lamp = Mat4::from_translation(LAMP_POSITION);
        let bulb = if lighting.garage_light { BULB_ON } else { BULB_OFF };
        draws.push(draw(&self.bulb, lamp).with_color(bulb).unlit());

        let shade = lamp
            * Mat4::from_rotation_x(-90f32.to_radians())
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -0.5));
        let shade_cap = shade * Mat4::from_translation(Vec3::new(0.0, 0.0, SHADE_LENGTH));
        let rod = shade_cap
            * Mat4::from_rotation_x(90f32.to_radians())
            * Mat4::from_rotation_y(180f32.to_radians());
        let rod_cap = rod * Mat4::from_translation(Vec3::new(0.0, 0.0, ROD_LENGTH));

        for (mesh, model) in [
            (&self.shade, shade),
            (&self.shade_cap, shade_cap),
            (&self.rod, rod),
            (&self.rod_cap, rod_cap),
        ] {
            draws.push(draw(mesh, model).with_color(LAMP_METAL));
        }
    }
}

#[derive(Debug)]
pub struct Scene {
    pub vehicle: Vehicle,
    pub garage_door: GarageDoor,
    pub camera: CameraController,
    pub lighting: Lighting,
    pub keys: KeyState,
    pub help_visible: bool,
    assets: FarmAssets,
    ground: Ground,
    indicators: Indicators,
    aspect: f32,
}

impl Scene {
    pub fn new(assets: FarmAssets, width: u32, height: u32) -> Self {
        if let Err(err) = assets.placements.validate_models(assets.props.len()) {
            log::error!("Prop placements reference missing models: {err}");
        }
        let ground = Ground::new(assets.grass, assets.dirt);
        let mut scene = Self {
            vehicle: Vehicle::default(),
            garage_door: GarageDoor::new(),
            camera: CameraController::default(),
            lighting: Lighting::default(),
            keys: KeyState::default(),
            help_visible: false,
            assets,
            ground,
            indicators: Indicators::new(),
            aspect: 1.0,
        };
        scene.resize(width, height);
        scene
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let height = height.max(1);
        self.aspect = corelib::camera::aspect_ratio(width, height);
        self.camera.set_viewport(width, height);
    }

    /// Camera keys are not latched while in the cockpit.
    pub fn key_down(&mut self, key: Key) {
        if key.is_camera_key() && self.camera.mode == CameraMode::Cockpit {
            return;
        }
        self.keys.set(key, true);
    }

    pub fn key_up(&mut self, key: Key) {
        self.keys.set(key, false);
    }

    pub fn command(&mut self, command: Command) {
        match command {
            Command::FreeCamera => self.camera.set_mode(CameraMode::Free),
            Command::CockpitCamera => self.camera.set_mode(CameraMode::Cockpit),
            Command::ChaseCamera => self.camera.set_mode(CameraMode::Chase),
            Command::ToggleLeftDoor => self.vehicle.toggle_left_door(),
            Command::ToggleRightDoor => self.vehicle.toggle_right_door(),
            Command::ToggleGarageDoor => self.garage_door.toggle(),
            Command::ToggleDayNight => self.lighting.toggle_day_night(),
            Command::ToggleGarageLight => self.lighting.toggle_garage_light(),
            Command::ToggleHelp => {
                self.help_visible = !self.help_visible;
                log::info!(
                    "Help {}",
                    if self.help_visible { "shown" } else { "hidden" }
                );
            }
        }
    }

    /// Returns the pointer warp target, if any.
    pub fn mouse_motion(&mut self, x: f32, y: f32) -> Option<Vec2> {
        self.camera.on_mouse_motion(x, y)
    }

    /// Report that the warp asked for by [`Scene::mouse_motion`] failed while
    /// the pointer sits at `(x, y)`.
    pub fn pointer_warp_failed(&mut self, x: f32, y: f32) {
        self.camera.warp_failed(x, y);
    }

    /// Advance the simulation; `dt` is clamped to [`MAX_DT`].
    pub fn update(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_DT);
        self.camera.update(&self.keys, dt);
        self.vehicle.update(self.keys.vehicle_input(), dt);
        self.garage_door.update(dt);
    }

    /// Draw list in painter's order: indicators, ground, props, garage,
    /// opaque vehicle parts, then translucent vehicle parts.
    pub fn compose(&self) -> Frame<'_> {
        let mut draws = Vec::new();

        self.indicators.push_draws(&self.lighting, &mut draws);
        self.push_ground(&mut draws);
        self.push_props(&mut draws);
        self.push_garage(&mut draws);
        self.push_vehicle(&mut draws);

        Frame {
            clear_color: self.lighting.sky_color(),
            camera: self.camera.camera(&self.vehicle, self.aspect),
            lights: self.lighting.params(),
            draws,
            help_visible: self.help_visible,
        }
    }

    fn push_ground<'a>(&'a self, draws: &mut Vec<DrawCall<'a>>) {
        let lib = Some(&self.ground.materials);
        draws.push(DrawCall::new(
            DrawTag::Ground,
            self.ground.plane.draw(lib),
            Mat4::IDENTITY,
        ));
        if self.ground.path_visible() {
            draws.push(DrawCall::new(
                DrawTag::Ground,
                self.ground.path.draw(lib),
                Mat4::IDENTITY,
            ));
        }
    }

    fn push_props<'a>(&'a self, draws: &mut Vec<DrawCall<'a>>) {
        for (transform, renderable) in self.assets.placements.iter_renderables() {
            let Some(model) = self.assets.props.get(renderable.model.0 as usize) else {
                continue;
            };
            let placement = transform.matrix();
            push_model(draws, DrawTag::Prop, model, placement);
        }
    }

    fn push_garage<'a>(&'a self, draws: &mut Vec<DrawCall<'a>>) {
        let Some(model) = &self.assets.garage else {
            return;
        };
        let placement = garage::placement().matrix();
        let lib = Some(&model.materials);
        let Some(door) = model.mesh(DOOR_MESH) else {
            push_model(draws, DrawTag::Garage, model, placement);
            return;
        };
        for mesh in model.meshes().filter(|m| m.name() != DOOR_MESH) {
            draws.push(DrawCall::new(DrawTag::Garage, mesh.draw(lib), placement));
        }
        // The moving door goes last, after the static shell.
        draws.push(DrawCall::new(
            DrawTag::Garage,
            door.draw(lib),
            placement * self.garage_door.door_matrix(),
        ));
    }

    fn push_vehicle<'a>(&'a self, draws: &mut Vec<DrawCall<'a>>) {
        let Some(model) = &self.assets.vehicle else {
            return;
        };
        let world = self.vehicle.world_matrix();
        let lib = Some(&model.materials);
        let parts: Vec<(&Mesh, PartKind)> = model
            .meshes()
            .map(|mesh| (mesh, PartKind::classify(mesh.name())))
            .collect();

        for &(mesh, part) in parts.iter().filter(|(_, p)| !p.is_translucent()) {
            let model_matrix = world * self.vehicle.part_matrix(part);
            draws.push(DrawCall::new(DrawTag::Vehicle, mesh.draw(lib), model_matrix));
        }

        let glass = Vec4::new(1.0, 1.0, 1.0, GLASS_ALPHA);
        for &(mesh, part) in parts.iter().filter(|(_, p)| p.is_translucent()) {
            let model_matrix = world * self.vehicle.part_matrix(part);
            draws.push(
                DrawCall::new(DrawTag::VehicleGlass, mesh.draw(lib), model_matrix)
                    .with_color(glass)
                    .with_state(RenderState::TRANSLUCENT),
            );
        }
    }
}

fn push_model<'a>(draws: &mut Vec<DrawCall<'a>>, tag: DrawTag, model: &'a ObjModel, at: Mat4) {
    let lib = Some(&model.materials);
    for mesh in model.meshes() {
        draws.push(DrawCall::new(tag, mesh.draw(lib), at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset::NoTextures;
    use asset::obj::load_obj_from_str;
    use asset::{MeshDraw, TextureHandle};
    use corelib::ecs::{ModelId, Renderable};
    use corelib::transform::Transform;
    use std::path::Path;

    const VEHICLE: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
o body
f 1 2 3
o Left_Door
f 1 2 3
o windshield_glass
f 1 2 3
o front_wheels
f 1 2 3
";

    const GARAGE: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
o walls
f 1 2 3
o door
f 1 2 3
";

    fn model(src: &str) -> ObjModel {
        load_obj_from_str(src, Path::new(""), &mut NoTextures).expect("parse obj")
    }

    fn farm() -> FarmAssets {
        let mut assets = FarmAssets {
            vehicle: Some(model(VEHICLE)),
            garage: Some(model(GARAGE)),
            props: vec![model("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")],
            dirt: Some(TextureHandle(4)),
            ..FarmAssets::default()
        };
        for x in [0.0, 10.0] {
            assets.placements.spawn(
                Transform::from_placement(Vec3::new(x, 0.0, 0.0), 0.0, 1.0),
                Some(Renderable { model: ModelId(0) }),
            );
        }
        assets
    }

    fn tags(frame: &Frame<'_>) -> Vec<DrawTag> {
        frame.draws.iter().map(|d| d.tag).collect()
    }

    #[test]
    fn frame_is_composed_in_painter_order() {
        let scene = Scene::new(farm(), 800, 600);
        let frame = scene.compose();
        let tags = tags(&frame);

        let rank = |t: &DrawTag| match t {
            DrawTag::Indicator => 0,
            DrawTag::Ground => 1,
            DrawTag::Prop => 2,
            DrawTag::Garage => 3,
            DrawTag::Vehicle => 4,
            DrawTag::VehicleGlass => 5,
        };
        assert!(tags.windows(2).all(|w| rank(&w[0]) <= rank(&w[1])));

        let count = |tag| tags.iter().filter(|&&t| t == tag).count();
        assert_eq!(count(DrawTag::Indicator), 6);
        assert_eq!(count(DrawTag::Ground), 2);
        assert_eq!(count(DrawTag::Prop), 2);
        assert_eq!(count(DrawTag::Garage), 2);
        assert_eq!(count(DrawTag::Vehicle), 2);
        assert_eq!(count(DrawTag::VehicleGlass), 2);
        assert_eq!(frame.clear_color, crate::lighting::SKY_DAY);
        assert!(!frame.help_visible);
    }

    #[test]
    fn translucent_parts_blend_without_depth_writes() {
        let scene = Scene::new(farm(), 800, 600);
        let frame = scene.compose();
        for draw in &frame.draws {
            if draw.tag == DrawTag::VehicleGlass {
                assert_eq!(draw.state, RenderState::TRANSLUCENT);
                assert_eq!(draw.color.w, GLASS_ALPHA);
            } else {
                assert_eq!(draw.state, RenderState::OPAQUE);
                assert_eq!(draw.color.w, 1.0);
            }
        }
    }

    #[test]
    fn model_draws_are_cached_across_frames() {
        let scene = Scene::new(farm(), 800, 600);
        let first: Vec<_> = scene
            .compose()
            .draws
            .iter()
            .map(|d| match d.geometry {
                MeshDraw::Cached { id, .. } => id,
                MeshDraw::Immediate(_) => panic!("scene draws are compiled"),
            })
            .collect();
        let second: Vec<_> = scene
            .compose()
            .draws
            .iter()
            .filter_map(|d| match d.geometry {
                MeshDraw::Cached { id, .. } => Some(id),
                MeshDraw::Immediate(_) => None,
            })
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_assets_leave_ground_and_indicators() {
        let scene = Scene::new(FarmAssets::default(), 800, 600);
        let frame = scene.compose();
        assert!(
            frame
                .draws
                .iter()
                .all(|d| matches!(d.tag, DrawTag::Indicator | DrawTag::Ground))
        );
        // Path hidden without its texture.
        assert_eq!(tags(&frame).iter().filter(|&&t| t == DrawTag::Ground).count(), 1);
    }

    #[test]
    fn garage_door_is_drawn_after_the_shell() {
        let mut assets = farm();
        assets.garage = Some(model(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\no door\nf 1 2 3\no walls\nf 1 2 3\no roof\nf 1 2 3\n",
        ));
        let mut scene = Scene::new(assets, 800, 600);
        scene.command(Command::ToggleGarageDoor);
        scene.update(0.2);
        let frame = scene.compose();
        let garage: Vec<_> = frame
            .draws
            .iter()
            .filter(|d| d.tag == DrawTag::Garage)
            .collect();
        assert_eq!(garage.len(), 3);

        let placement = garage::placement().matrix();
        let door = placement * scene.garage_door.door_matrix();
        assert!(!door.abs_diff_eq(placement, 1e-4));
        assert!(garage[0].model.abs_diff_eq(placement, 1e-6));
        assert!(garage[1].model.abs_diff_eq(placement, 1e-6));
        assert!(garage[2].model.abs_diff_eq(door, 1e-6));
    }

    #[test]
    fn garage_without_door_mesh_is_static() {
        let mut assets = farm();
        assets.garage = Some(model("v 0 0 0\nv 1 0 0\nv 0 1 0\no shed\nf 1 2 3\n"));
        let mut scene = Scene::new(assets, 800, 600);
        scene.command(Command::ToggleGarageDoor);
        scene.update(0.1);
        let frame = scene.compose();
        let garage: Vec<_> = frame
            .draws
            .iter()
            .filter(|d| d.tag == DrawTag::Garage)
            .collect();
        assert_eq!(garage.len(), 1);
        assert!(garage[0].model.abs_diff_eq(garage::placement().matrix(), 1e-6));
    }

    #[test]
    fn update_clamps_long_frames() {
        let mut scene = Scene::new(FarmAssets::default(), 800, 600);
        scene.key_down(Key::Up);
        let (x0, _) = scene.vehicle.position();
        scene.update(5.0);
        let (x1, _) = scene.vehicle.position();
        // Heading 90: motion is along -z only.
        assert!((x1 - x0).abs() < 1e-4);
        let (_, z1) = scene.vehicle.position();
        assert!((z1 - (100.0 - 4.0 * MAX_DT)).abs() < 1e-4);
    }

    #[test]
    fn cockpit_does_not_latch_camera_keys() {
        let mut scene = Scene::new(FarmAssets::default(), 800, 600);
        scene.command(Command::CockpitCamera);
        scene.key_down(Key::W);
        scene.key_down(Key::Left);
        assert!(!scene.keys.w);
        assert!(scene.keys.left);
        scene.command(Command::FreeCamera);
        scene.key_down(Key::W);
        assert!(scene.keys.w);
        scene.key_up(Key::W);
        assert!(!scene.keys.w);
    }

    #[test]
    fn toggles_reach_the_frame() {
        let mut scene = Scene::new(FarmAssets::default(), 800, 600);
        scene.command(Command::ToggleDayNight);
        scene.command(Command::ToggleGarageLight);
        scene.command(Command::ToggleHelp);
        let frame = scene.compose();
        assert_eq!(frame.clear_color, crate::lighting::SKY_NIGHT);
        assert!(frame.help_visible);
        assert_eq!(frame.draws[0].color, MOON_COLOR);
        assert_eq!(frame.draws[1].color, BULB_OFF);
        assert!(!frame.draws[1].lit);
    }

    #[test]
    fn zero_height_resize_is_safe() {
        let mut scene = Scene::new(FarmAssets::default(), 800, 600);
        scene.resize(640, 0);
        assert!(scene.aspect.is_finite());
        assert_eq!(scene.camera.center(), Vec2::new(320.0, 0.0));
    }
}
