//! MTL material library parser (`newmtl`, `map_Kd`).

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};

use crate::material::{Material, MaterialLibrary, TextureLoader};

/// Load a material library and its textures.
///
/// A missing or unreadable file yields an empty library and a warning; the
/// object then renders untextured.
pub fn load_mtl(path: impl AsRef<Path>, loader: &mut dyn TextureLoader) -> MaterialLibrary {
    let path = path.as_ref();
    let mut library = match parse_mtl_file(path) {
        Ok(library) => library,
        Err(err) => {
            log::warn!("MTL file not usable: {err:#}");
            return MaterialLibrary::new();
        }
    };
    library.load_textures(loader);
    log::info!(
        "Loaded material library {} ({} materials)",
        path.display(),
        library.len()
    );
    library
}

fn parse_mtl_file(path: &Path) -> Result<MaterialLibrary> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open MTL file: {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    parse_mtl(BufReader::new(file), base_dir)
}

/// Convenience helper to parse an MTL string literal.
pub fn parse_mtl_str(contents: &str, base_dir: &Path) -> Result<MaterialLibrary> {
    parse_mtl(io::Cursor::new(contents), base_dir)
}

/// Parse material definitions; texture paths are resolved against `base_dir`.
/// No textures are loaded here.
pub fn parse_mtl<R: BufRead>(reader: R, base_dir: &Path) -> Result<MaterialLibrary> {
    let mut library = MaterialLibrary::new();
    let mut current: Option<Material> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (tag, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((tag, rest)) => (tag, rest.trim()),
            None => (trimmed, ""),
        };

        match tag {
            "newmtl" => {
                let name = rest
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| anyhow!("newmtl without a name on line {}", line_no + 1));
                match name {
                    Ok(name) => {
                        if let Some(done) = current.replace(Material::new(name)) {
                            library.insert(done);
                        }
                    }
                    Err(err) => log::warn!("Skipping malformed MTL line: {err}"),
                }
            }
            "map_Kd" => {
                let Some(material) = current.as_mut() else {
                    continue;
                };
                if rest.is_empty() {
                    log::warn!("Skipping map_Kd without a path on line {}", line_no + 1);
                    continue;
                }
                material.texture_path = Some(resolve_texture_path(rest, base_dir));
            }
            _ => {
                // Colors, illumination models etc. are not used.
            }
        }
    }

    if let Some(done) = current {
        library.insert(done);
    }
    Ok(library)
}

/// Strip quotes, reduce absolute paths to their file name, and join with the
/// MTL directory.
fn resolve_texture_path(raw: &str, base_dir: &Path) -> PathBuf {
    let raw = raw.trim().trim_matches('"');
    let path = Path::new(raw);
    let relative = if is_absolute_anywhere(raw) {
        // Exporters leave Windows paths behind; only the file name is kept.
        let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
        PathBuf::from(name)
    } else {
        path.to_path_buf()
    };
    base_dir.join(relative)
}

fn is_absolute_anywhere(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    Path::new(raw).is_absolute()
        || raw.starts_with('/')
        || raw.starts_with('\\')
        || (bytes.len() > 2 && bytes[1] == b':' && (bytes[2] == b'\\' || bytes[2] == b'/'))
}
