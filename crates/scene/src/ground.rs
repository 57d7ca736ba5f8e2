//! Tiled grass plane and the dirt path leading to the garage.

use asset::{Material, MaterialLibrary, Mesh, TextureHandle};

use crate::shapes;

pub const GROUND_HALF_EXTENT: f32 = 400.0;
/// Texture repeats across the whole plane.
pub const GROUND_TILING: f32 = 48.0;

pub const PATH_WIDTH: f32 = 8.0;
const PATH_HEIGHT: f32 = 0.01;
const PATH_NEAR_Z: f32 = 120.0;
const PATH_FAR_Z: f32 = -40.01;
const PATH_TILING: f32 = 20.0;

const GRASS: &str = "grass";
const DIRT: &str = "dirt";

#[derive(Debug)]
pub struct Ground {
    pub plane: Mesh,
    pub path: Mesh,
    pub materials: MaterialLibrary,
    path_visible: bool,
}

impl Ground {
    /// The path is only drawn when its texture is available.
    pub fn new(grass: Option<TextureHandle>, dirt: Option<TextureHandle>) -> Self {
        let s = GROUND_HALF_EXTENT;
        let t = GROUND_TILING;
        let plane = shapes::quad(
            "ground",
            GRASS,
            [[-s, 0.0, -s], [s, 0.0, -s], [s, 0.0, s], [-s, 0.0, s]],
            [[0.0, 0.0], [t, 0.0], [t, t], [0.0, t]],
        );

        let (l, r) = (-PATH_WIDTH / 2.0, PATH_WIDTH / 2.0);
        let y = PATH_HEIGHT;
        let path = shapes::quad(
            "path",
            DIRT,
            [
                [l, y, PATH_NEAR_Z],
                [r, y, PATH_NEAR_Z],
                [r, y, PATH_FAR_Z],
                [l, y, PATH_FAR_Z],
            ],
            [[0.0, 0.0], [1.0, 0.0], [1.0, PATH_TILING], [0.0, PATH_TILING]],
        );

        let mut materials = MaterialLibrary::new();
        for (name, texture) in [(GRASS, grass), (DIRT, dirt)] {
            let mut material = Material::new(name);
            material.texture = texture;
            materials.insert(material);
        }

        log::debug!("Ground textures: grass {grass:?}, dirt {dirt:?}");
        Self {
            plane,
            path,
            materials,
            path_visible: dirt.is_some(),
        }
    }

    pub fn path_visible(&self) -> bool {
        self.path_visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_binds_grass_and_tiles_it() {
        let ground = Ground::new(Some(TextureHandle(1)), None);
        let draw = ground.plane.draw(Some(&ground.materials));
        let batch = &draw.list().batches[0];
        assert_eq!(batch.texture, Some(TextureHandle(1)));
        let max_u = batch.vertices.iter().map(|v| v.uv[0]).fold(0.0, f32::max);
        assert_eq!(max_u, GROUND_TILING);
        assert!(!ground.path_visible());
    }

    #[test]
    fn path_needs_its_texture() {
        let ground = Ground::new(None, Some(TextureHandle(2)));
        assert!(ground.path_visible());
        let draw = ground.path.draw(Some(&ground.materials));
        let batch = &draw.list().batches[0];
        assert_eq!(batch.texture, Some(TextureHandle(2)));
        assert!(batch.vertices.iter().all(|v| v.position[1] == PATH_HEIGHT));
        assert!(batch.vertices.iter().all(|v| v.position[0].abs() <= PATH_WIDTH / 2.0));
    }
}
