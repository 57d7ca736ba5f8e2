//! Multipart OBJ parser: named meshes over shared pools, faces bucketed by
//! material, companion MTL loading.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, anyhow};

use crate::material::{MaterialLibrary, TextureLoader};
use crate::mesh::{FaceVertex, MaterialGroup, Mesh, Triangle, VertexPools};
use crate::mtl::load_mtl;

/// Mesh started by `o`/`g` without a name.
pub const UNNAMED_MESH: &str = "unnamed";
/// Mesh started implicitly by a face that precedes any `o`/`g`.
pub const DEFAULT_MESH: &str = "default";

/// Everything one OBJ file produced.
#[derive(Debug, Default)]
pub struct ObjModel {
    meshes: Vec<Mesh>,
    pub materials: MaterialLibrary,
}

impl ObjModel {
    pub fn new(meshes: Vec<Mesh>, materials: MaterialLibrary) -> Self {
        Self { meshes, materials }
    }

    pub fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|m| m.name() == name)
    }

    /// Meshes in the order their names first appeared in the file.
    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.iter()
    }

    pub fn mesh_names(&self) -> impl Iterator<Item = &str> {
        self.meshes.iter().map(Mesh::name)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}

/// Result of loading an asset. Absence is an expected outcome, not an error:
/// the scene simply goes on without the object.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(ObjModel),
    Missing(String),
}

impl LoadOutcome {
    pub fn loaded(self) -> Option<ObjModel> {
        match self {
            LoadOutcome::Loaded(model) => Some(model),
            LoadOutcome::Missing(_) => None,
        }
    }
}

/// Load an OBJ model (and its `mtllib`) from a file path.
pub fn load_obj(path: impl AsRef<Path>, loader: &mut dyn TextureLoader) -> LoadOutcome {
    let path = path.as_ref();
    let file = match File::open(path)
        .with_context(|| format!("Failed to open OBJ file: {}", path.display()))
    {
        Ok(file) => file,
        Err(err) => return LoadOutcome::Missing(format!("{err:#}")),
    };
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    match load_obj_from_reader(BufReader::new(file), base_dir, loader) {
        Ok(model) => {
            log::info!(
                "Loaded OBJ {} ({} meshes, {} triangles)",
                path.display(),
                model.len(),
                model.triangle_count()
            );
            LoadOutcome::Loaded(model)
        }
        Err(err) => LoadOutcome::Missing(format!("{err:#}")),
    }
}

/// Load an OBJ model from a [`BufRead`] implementation; `mtllib` paths are
/// resolved against `base_dir`.
pub fn load_obj_from_reader<R: BufRead>(
    reader: R,
    base_dir: &Path,
    loader: &mut dyn TextureLoader,
) -> Result<ObjModel> {
    parse_obj(reader, base_dir, loader)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(
    contents: &str,
    base_dir: &Path,
    loader: &mut dyn TextureLoader,
) -> Result<ObjModel> {
    parse_obj(io::Cursor::new(contents), base_dir, loader)
}

/// Mesh under construction: groups in first-use order of their material.
struct MeshBuilder {
    name: String,
    groups: Vec<MaterialGroup>,
}

impl MeshBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            groups: Vec::new(),
        }
    }

    fn add_triangle(&mut self, tri: Triangle, material: Option<&str>) {
        let group = match self
            .groups
            .iter()
            .position(|g| g.material.as_deref() == material)
        {
            Some(i) => &mut self.groups[i],
            None => {
                self.groups.push(MaterialGroup {
                    material: material.map(str::to_owned),
                    triangles: Vec::new(),
                });
                let last = self.groups.len() - 1;
                &mut self.groups[last]
            }
        };
        group.triangles.push(tri);
    }
}

/// Parser state machine.
struct ObjParser<'a> {
    base_dir: PathBuf,
    loader: &'a mut dyn TextureLoader,
    pools: VertexPools,
    meshes: Vec<MeshBuilder>,
    /// Index into `meshes` of the mesh receiving faces.
    current: Option<usize>,
    material: Option<String>,
    materials: MaterialLibrary,
}

impl<'a> ObjParser<'a> {
    fn new(base_dir: &Path, loader: &'a mut dyn TextureLoader) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            loader,
            pools: VertexPools::default(),
            meshes: Vec::new(),
            current: None,
            material: None,
            materials: MaterialLibrary::new(),
        }
    }

    /// `o`/`g`: a name seen before replaces that mesh.
    fn start_mesh(&mut self, name: &str) -> usize {
        let builder = MeshBuilder::new(name.to_owned());
        let index = match self.meshes.iter().position(|m| m.name == name) {
            Some(i) => {
                self.meshes[i] = builder;
                i
            }
            None => {
                self.meshes.push(builder);
                self.meshes.len() - 1
            }
        };
        self.current = Some(index);
        index
    }

    fn current_mesh(&mut self) -> &mut MeshBuilder {
        let index = match self.current {
            Some(i) => i,
            // Faces before any `o`/`g` go to an implicit mesh.
            None => self.start_mesh(DEFAULT_MESH),
        };
        &mut self.meshes[index]
    }

    fn parse_line(&mut self, line_no: usize, trimmed: &str) -> Result<()> {
        let mut parts = trimmed.split_whitespace();
        let tag = parts
            .next()
            .ok_or_else(|| anyhow!("Malformed OBJ line {}: '{}'", line_no + 1, trimmed))?;

        match tag {
            "mtllib" => {
                let file = parts
                    .next()
                    .ok_or_else(|| anyhow!("mtllib without a file on line {}", line_no + 1))?;
                let mtl_path = self.base_dir.join(file);
                log::info!("Loading material library: {}", mtl_path.display());
                self.materials = load_mtl(&mtl_path, &mut *self.loader);
            }
            "o" | "g" => {
                let name = parts.next().unwrap_or(UNNAMED_MESH);
                self.start_mesh(name);
            }
            "usemtl" => {
                let name = parts
                    .next()
                    .ok_or_else(|| anyhow!("usemtl without a name on line {}", line_no + 1))?;
                self.material = Some(name.to_owned());
            }
            "v" => {
                let x = parse_f32(parts.next(), line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), line_no, "z coordinate")?;
                self.pools.positions.push([x, y, z]);
            }
            "vt" => {
                let u = parse_f32(parts.next(), line_no, "u coordinate")?;
                // v is optional (1D texcoords)
                let v = match parts.next() {
                    Some(token) => parse_f32(Some(token), line_no, "v coordinate")?,
                    None => 0.0,
                };
                self.pools.texcoords.push([u, v]);
            }
            "vn" => {
                let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                self.pools.normals.push([nx, ny, nz]);
            }
            "f" => {
                let face = parts
                    .map(|part| parse_face_vertex(part, &self.pools, line_no))
                    .collect::<Result<Vec<_>>>()?;
                let material = self.material.clone();
                let mesh = self.current_mesh();
                for tri in triangulate(&face) {
                    mesh.add_triangle(tri, material.as_deref());
                }
            }
            _ => {
                // Ignore other directives (s/l/Kd overrides/etc.)
            }
        }
        Ok(())
    }

    /// Attach the shared pools to every mesh.
    fn finish(self) -> ObjModel {
        let pools = Arc::new(self.pools);
        let meshes = self
            .meshes
            .into_iter()
            .map(|b| Mesh::new(b.name, b.groups, Arc::clone(&pools)))
            .collect();
        ObjModel::new(meshes, self.materials)
    }
}

fn parse_obj<R: BufRead>(
    reader: R,
    base_dir: &Path,
    loader: &mut dyn TextureLoader,
) -> Result<ObjModel> {
    let mut parser = ObjParser::new(base_dir, loader);

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Err(err) = parser.parse_line(line_no, trimmed) {
            log::warn!("Skipping OBJ line {}: {err:#}", line_no + 1);
        }
    }

    Ok(parser.finish())
}

/// Split a polygon into triangles: triangles as-is, quads as (0,1,2),(0,2,3),
/// larger polygons as a fan around the first vertex. Fewer than three
/// vertices produce nothing.
pub fn triangulate(face: &[FaceVertex]) -> Vec<Triangle> {
    match face.len() {
        0..=2 => Vec::new(),
        3 => vec![[face[0], face[1], face[2]]],
        4 => vec![[face[0], face[1], face[2]], [face[0], face[2], face[3]]],
        n => (1..n - 1)
            .map(|i| [face[0], face[i], face[i + 1]])
            .collect(),
    }
}

fn parse_f32(value: Option<&str>, line_no: usize, what: &str) -> Result<f32> {
    let token = value.ok_or_else(|| anyhow!("Missing {} on line {}", what, line_no + 1))?;
    token
        .parse::<f32>()
        .with_context(|| format!("Failed to parse {} on line {}", what, line_no + 1))
}

fn parse_face_vertex(token: &str, pools: &VertexPools, line_no: usize) -> Result<FaceVertex> {
    let mut split = token.split('/');
    let pos = split
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("Malformed face element '{}' on line {}", token, line_no + 1))?;
    let position = resolve_index(pos, pools.positions.len(), line_no)?;

    let texcoord = match split.next() {
        Some(value) if !value.is_empty() => {
            Some(resolve_index(value, pools.texcoords.len(), line_no)?)
        }
        _ => None,
    };

    let normal = match split.next() {
        Some(value) if !value.is_empty() => {
            Some(resolve_index(value, pools.normals.len(), line_no)?)
        }
        _ => None,
    };

    Ok(FaceVertex::new(position, texcoord, normal))
}

/// 1-based → 0-based; negative values count back from the current pool end.
/// Range checks happen when the draw list is compiled.
fn resolve_index(token: &str, len: usize, line_no: usize) -> Result<usize> {
    let raw = token
        .parse::<i64>()
        .with_context(|| format!("Invalid index '{}' on line {}", token, line_no + 1))?;
    if raw == 0 {
        anyhow::bail!("OBJ indices are 1-based; found 0 on line {}", line_no + 1);
    }

    let idx = if raw > 0 { raw - 1 } else { len as i64 + raw };
    usize::try_from(idx).map_err(|_| {
        anyhow!(
            "OBJ index {} resolved before the start of the pool on line {}",
            raw,
            line_no + 1
        )
    })
}
