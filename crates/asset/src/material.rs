//! Materials and the texture-loading seam.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Opaque handle to a GPU-resident texture, issued by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Turns a texture file into a GPU handle. Failure is `None`: the material
/// is then drawn untextured.
pub trait TextureLoader {
    fn load_texture(&mut self, path: &Path) -> Option<TextureHandle>;
}

impl<F> TextureLoader for F
where
    F: FnMut(&Path) -> Option<TextureHandle>,
{
    fn load_texture(&mut self, path: &Path) -> Option<TextureHandle> {
        self(path)
    }
}

/// Loader that never produces textures (headless use).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTextures;

impl TextureLoader for NoTextures {
    fn load_texture(&mut self, _path: &Path) -> Option<TextureHandle> {
        None
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    /// Diffuse map (`map_Kd`), already resolved against the MTL directory.
    pub texture_path: Option<PathBuf>,
    pub texture: Option<TextureHandle>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture_path: None,
            texture: None,
        }
    }
}

/// Name → material table of one loaded object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: HashMap<String, Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, replacing an earlier material with the same name.
    pub fn insert(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Texture bound for `name`, if the material exists and its map loaded.
    pub fn texture_for(&self, name: Option<&str>) -> Option<TextureHandle> {
        name.and_then(|n| self.get(n)).and_then(|m| m.texture)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Ask `loader` for a handle for every material with a texture path.
    pub fn load_textures(&mut self, loader: &mut dyn TextureLoader) {
        for material in self.materials.values_mut() {
            if let Some(path) = &material.texture_path {
                material.texture = loader.load_texture(path);
                if material.texture.is_none() {
                    log::warn!(
                        "Material '{}' has no texture ({} failed to load)",
                        material.name,
                        path.display()
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_textures_only_touches_mapped_materials() {
        let mut lib = MaterialLibrary::new();
        let mut painted = Material::new("paint");
        painted.texture_path = Some(PathBuf::from("paint.png"));
        lib.insert(painted);
        lib.insert(Material::new("bare"));
        let mut broken = Material::new("broken");
        broken.texture_path = Some(PathBuf::from("missing.png"));
        lib.insert(broken);

        let mut calls = 0;
        let mut loader = |p: &Path| {
            calls += 1;
            (p == Path::new("paint.png")).then_some(TextureHandle(7))
        };
        lib.load_textures(&mut loader);

        assert_eq!(calls, 2);
        assert_eq!(lib.texture_for(Some("paint")), Some(TextureHandle(7)));
        assert_eq!(lib.texture_for(Some("bare")), None);
        assert_eq!(lib.texture_for(Some("broken")), None);
        assert_eq!(lib.texture_for(None), None);
    }
}
