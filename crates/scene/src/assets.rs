//! Farm asset manifest and loading.

use std::path::Path;

use asset::{LoadOutcome, ObjModel, TextureHandle, TextureLoader, load_obj};
use corelib::ecs::{ModelId, Renderable, World};
use corelib::transform::Transform;
use glam::Vec3;

pub const VEHICLE_MODEL: &str = "models/Lambo/Lambo.obj";
pub const GARAGE_MODEL: &str = "models/farm/garage.obj";
pub const GRASS_TEXTURE: &str = "textures/grass4.jpg";
pub const DIRT_TEXTURE: &str = "textures/dirt.jpg";

/// Static prop placement: position, yaw in degrees, uniform scale.
type Placement = (Vec3, f32, f32);

const PROPS: &[(&str, &[Placement])] = &[
    (
        "models/farm/House.obj",
        &[(Vec3::new(-50.0, -17.0, -15.0), 90.0, 2.0)],
    ),
    (
        "models/farm/cow.obj",
        &[
            (Vec3::new(25.0, 0.0, 5.0), 90.0, 0.3),
            (Vec3::new(30.0, 0.0, 0.0), 120.0, 0.3),
        ],
    ),
    (
        "models/farm/tree.obj",
        &[
            (Vec3::new(-40.0, 6.2, -30.0), 20.0, 2.0),
            (Vec3::new(-30.0, 6.2, -35.0), -10.0, 2.2),
            (Vec3::new(40.0, 6.2, -30.0), -30.0, 2.0),
        ],
    ),
];

/// Everything loaded from disk. Any part may be absent.
#[derive(Debug, Default)]
pub struct FarmAssets {
    pub vehicle: Option<ObjModel>,
    pub garage: Option<ObjModel>,
    /// Indexed by the [`ModelId`]s in `placements`.
    pub props: Vec<ObjModel>,
    pub placements: World,
    pub grass: Option<TextureHandle>,
    pub dirt: Option<TextureHandle>,
}

fn load_model(root: &Path, relative: &str, loader: &mut dyn TextureLoader) -> Option<ObjModel> {
    match load_obj(root.join(relative), loader) {
        LoadOutcome::Loaded(model) => Some(model),
        LoadOutcome::Missing(reason) => {
            log::warn!("Skipping {relative}: {reason}");
            None
        }
    }
}

/// Load the farm from `root`. Missing files are logged and skipped.
pub fn load_farm(root: &Path, loader: &mut dyn TextureLoader) -> FarmAssets {
    log::info!("Loading farm assets from {}", root.display());
    let mut assets = FarmAssets {
        vehicle: load_model(root, VEHICLE_MODEL, loader),
        garage: load_model(root, GARAGE_MODEL, loader),
        ..FarmAssets::default()
    };

    if let Some(vehicle) = &assets.vehicle {
        for name in vehicle.mesh_names() {
            log::info!("Vehicle part: {name}");
        }
    }

    for &(path, placements) in PROPS {
        let Some(model) = load_model(root, path, loader) else {
            continue;
        };
        let id = ModelId(assets.props.len() as u32);
        assets.props.push(model);
        for &(position, yaw_deg, scale) in placements {
            assets.placements.spawn(
                Transform::from_placement(position, yaw_deg, scale),
                Some(Renderable { model: id }),
            );
        }
    }

    assets.grass = loader.load_texture(&root.join(GRASS_TEXTURE));
    assets.dirt = loader.load_texture(&root.join(DIRT_TEXTURE));
    if assets.grass.is_none() {
        log::warn!("Ground texture {GRASS_TEXTURE} unavailable");
    }
    if assets.dirt.is_none() {
        log::warn!("Path texture {DIRT_TEXTURE} unavailable, path hidden");
    }

    assets
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset::NoTextures;
    use std::fs;

    const TRIANGLE: &str = "o body\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    #[test]
    fn empty_directory_loads_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let assets = load_farm(dir.path(), &mut NoTextures);
        assert!(assets.vehicle.is_none());
        assert!(assets.garage.is_none());
        assert!(assets.props.is_empty());
        assert!(assets.placements.is_empty());
        assert_eq!(assets.grass, None);
    }

    #[test]
    fn present_props_get_all_their_placements() {
        let dir = tempfile::tempdir().expect("tempdir");
        let farm = dir.path().join("models/farm");
        fs::create_dir_all(&farm).expect("mkdir");
        fs::write(farm.join("tree.obj"), TRIANGLE).expect("write tree");
        fs::write(farm.join("garage.obj"), TRIANGLE).expect("write garage");

        let textures = dir.path().join("textures");
        fs::create_dir_all(&textures).expect("mkdir");
        let grass = textures.join("grass4.jpg");
        let mut loader = |p: &Path| (p == grass).then_some(TextureHandle(9));

        let assets = load_farm(dir.path(), &mut loader);
        assert!(assets.garage.is_some());
        assert_eq!(assets.props.len(), 1);
        assert_eq!(assets.placements.len(), 3);
        assert!(assets.placements.validate_models(assets.props.len()).is_ok());
        assert_eq!(assets.grass, Some(TextureHandle(9)));
        assert_eq!(assets.dirt, None);
    }
}
