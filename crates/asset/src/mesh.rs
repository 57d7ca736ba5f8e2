//! CPU-side mesh representation and the per-mesh draw-list cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::material::{MaterialLibrary, TextureHandle};

const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
const DEFAULT_UV: [f32; 2] = [0.0, 0.0];

/// Vertex with position/normal/uv. Values are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Positions, texcoords and normals shared by every mesh of one OBJ file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexPools {
    pub positions: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
}

/// One corner of a face: 0-based pool indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaceVertex {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

impl FaceVertex {
    pub fn new(position: usize, texcoord: Option<usize>, normal: Option<usize>) -> Self {
        Self {
            position,
            texcoord,
            normal,
        }
    }
}

pub type Triangle = [FaceVertex; 3];

/// Triangles sharing one material (`None` = issued before any `usemtl`).
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialGroup {
    pub material: Option<String>,
    pub triangles: Vec<Triangle>,
}

/// Triangles of one material, ready for upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawBatch {
    pub texture: Option<TextureHandle>,
    pub vertices: Vec<MeshVertex>,
}

impl DrawBatch {
    #[cfg(test)]
    fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Replayable draw data of a mesh: one batch per material group.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    pub batches: Vec<DrawBatch>,
}

impl DrawList {
    pub fn new(batches: Vec<DrawBatch>) -> Self {
        Self { batches }
    }

    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(|b| b.vertices.len()).sum()
    }
}

/// Process-unique mesh identity; keys the renderer's GPU-side cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u64);

impl MeshId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Result of [`Mesh::draw`].
#[derive(Debug)]
pub enum MeshDraw<'a> {
    /// Compiled on first draw and replayed since.
    Cached { id: MeshId, list: &'a DrawList },
    /// Position-only list built for a draw without materials.
    Immediate(DrawList),
}

impl MeshDraw<'_> {
    pub fn list(&self) -> &DrawList {
        match self {
            MeshDraw::Cached { list, .. } => list,
            MeshDraw::Immediate(list) => list,
        }
    }
}

/// Named group of faces over shared pools, bucketed by material.
#[derive(Debug)]
pub struct Mesh {
    id: MeshId,
    name: String,
    groups: Vec<MaterialGroup>,
    pools: Arc<VertexPools>,
    cache: OnceLock<DrawList>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, groups: Vec<MaterialGroup>, pools: Arc<VertexPools>) -> Self {
        Self {
            id: MeshId::next(),
            name: name.into(),
            groups,
            pools,
            cache: OnceLock::new(),
        }
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn groups(&self) -> &[MaterialGroup] {
        &self.groups
    }

    pub fn pools(&self) -> &Arc<VertexPools> {
        &self.pools
    }

    pub fn triangle_count(&self) -> usize {
        self.groups.iter().map(|g| g.triangles.len()).sum()
    }

    /// Iterate every triangle regardless of material.
    pub fn triangles(&self) -> impl Iterator<Item = &Triangle> {
        self.groups.iter().flat_map(|g| g.triangles.iter())
    }

    #[cfg(test)]
    fn is_compiled(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Draw data for this mesh.
    ///
    /// With a material table the list is compiled once and cached; later calls
    /// return the same list whatever table they pass. Each model owns a single
    /// table for its whole lifetime, so the first one is the only one.
    /// Without a table a position-only list is built on every call.
    pub fn draw(&self, materials: Option<&MaterialLibrary>) -> MeshDraw<'_> {
        match materials {
            Some(materials) => MeshDraw::Cached {
                id: self.id,
                list: self.cache.get_or_init(|| self.compile(materials)),
            },
            None => MeshDraw::Immediate(self.positions_only()),
        }
    }

    fn compile(&self, materials: &MaterialLibrary) -> DrawList {
        log::debug!("Compiling draw list for mesh '{}'", self.name);
        let batches = self
            .groups
            .iter()
            .map(|group| {
                let mut vertices = Vec::with_capacity(group.triangles.len() * 3);
                for tri in &group.triangles {
                    if let Some(resolved) = self.resolve(tri) {
                        vertices.extend_from_slice(&resolved);
                    }
                }
                DrawBatch {
                    texture: materials.texture_for(group.material.as_deref()),
                    vertices,
                }
            })
            .collect();
        DrawList::new(batches)
    }

    fn positions_only(&self) -> DrawList {
        let batches = self
            .groups
            .iter()
            .map(|group| {
                let vertices = group
                    .triangles
                    .iter()
                    .filter_map(|tri| {
                        let p = (*tri).map(|fv| self.pools.positions.get(fv.position).copied());
                        match p {
                            [Some(a), Some(b), Some(c)] => Some([a, b, c]),
                            _ => None,
                        }
                    })
                    .flatten()
                    .map(|p| MeshVertex::new(p, DEFAULT_NORMAL, DEFAULT_UV))
                    .collect();
                DrawBatch {
                    texture: None,
                    vertices,
                }
            })
            .collect();
        DrawList::new(batches)
    }

    /// Look a triangle up in the pools. Out-of-range texcoord/normal indices
    /// fall back to defaults; an out-of-range position drops the triangle.
    fn resolve(&self, tri: &Triangle) -> Option<[MeshVertex; 3]> {
        let pools = &self.pools;
        let mut out = [MeshVertex::default(); 3];
        for (slot, fv) in out.iter_mut().zip(tri) {
            let position = pools.positions.get(fv.position).copied()?;
            let normal = fv
                .normal
                .and_then(|i| pools.normals.get(i).copied())
                .unwrap_or(DEFAULT_NORMAL);
            let uv = fv
                .texcoord
                .and_then(|i| pools.texcoords.get(i).copied())
                .unwrap_or(DEFAULT_UV);
            *slot = MeshVertex::new(position, normal, uv);
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;

    fn quad_pools() -> Arc<VertexPools> {
        Arc::new(VertexPools {
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            texcoords: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
            normals: vec![[0.0, 1.0, 0.0]],
        })
    }

    fn fv(p: usize, t: Option<usize>, n: Option<usize>) -> FaceVertex {
        FaceVertex::new(p, t, n)
    }

    fn library(handle: u32) -> MaterialLibrary {
        let mut lib = MaterialLibrary::new();
        let mut m = Material::new("paint");
        m.texture = Some(TextureHandle(handle));
        lib.insert(m);
        lib
    }

    fn painted_mesh() -> Mesh {
        let groups = vec![
            MaterialGroup {
                material: Some("paint".into()),
                triangles: vec![[
                    fv(0, Some(0), Some(0)),
                    fv(1, Some(1), Some(0)),
                    fv(2, Some(2), Some(0)),
                ]],
            },
            MaterialGroup {
                material: None,
                triangles: vec![[fv(0, None, None), fv(2, None, None), fv(3, None, None)]],
            },
        ];
        Mesh::new("body", groups, quad_pools())
    }

    #[test]
    fn compile_resolves_pools_per_material() {
        let mesh = painted_mesh();
        let draw = mesh.draw(Some(&library(3)));
        let list = draw.list();
        assert_eq!(list.batches.len(), 2);
        assert_eq!(list.batches[0].texture, Some(TextureHandle(3)));
        assert_eq!(list.batches[0].vertices[2].uv, [1.0, 1.0]);
        assert_eq!(list.batches[0].vertices[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(list.batches[1].texture, None);
        assert_eq!(list.batches[1].vertices[2].position, [0.0, 1.0, 0.0]);
        assert_eq!(list.batches[1].vertices[2].normal, DEFAULT_NORMAL);
        assert_eq!(list.vertex_count(), 6);
    }

    #[test]
    fn cache_ignores_later_material_tables() {
        let mesh = painted_mesh();
        assert!(!mesh.is_compiled());

        let first = match mesh.draw(Some(&library(1))) {
            MeshDraw::Cached { list, .. } => list as *const DrawList,
            MeshDraw::Immediate(_) => panic!("expected cached draw"),
        };
        assert!(mesh.is_compiled());

        let second = mesh.draw(Some(&library(2)));
        let MeshDraw::Cached { id, list } = second else {
            panic!("expected cached draw");
        };
        assert_eq!(id, mesh.id());
        assert!(std::ptr::eq(first, list));
        assert_eq!(list.batches[0].texture, Some(TextureHandle(1)));
    }

    #[test]
    fn draw_without_materials_is_positions_only_and_uncached() {
        let mesh = painted_mesh();
        let draw = mesh.draw(None);
        assert!(matches!(draw, MeshDraw::Immediate(_)));
        assert!(!mesh.is_compiled());
        let list = draw.list();
        assert!(list.batches.iter().all(|b| b.texture.is_none()));
        assert!(list
            .batches
            .iter()
            .flat_map(|b| &b.vertices)
            .all(|v| v.normal == DEFAULT_NORMAL && v.uv == DEFAULT_UV));
        assert_eq!(list.vertex_count(), 6);
    }

    #[test]
    fn out_of_range_indices_are_absent() {
        let groups = vec![MaterialGroup {
            material: None,
            triangles: vec![
                [fv(0, Some(9), Some(9)), fv(1, None, None), fv(2, None, None)],
                [fv(0, None, None), fv(1, None, None), fv(42, None, None)],
            ],
        }];
        let mesh = Mesh::new("sparse", groups, quad_pools());
        let draw = mesh.draw(Some(&MaterialLibrary::new()));
        let batch = &draw.list().batches[0];
        assert_eq!(batch.triangle_count(), 1);
        assert_eq!(batch.vertices[0].uv, DEFAULT_UV);
        assert_eq!(batch.vertices[0].normal, DEFAULT_NORMAL);
    }

    #[test]
    fn mesh_ids_are_unique() {
        let a = Mesh::new("a", Vec::new(), quad_pools());
        let b = Mesh::new("b", Vec::new(), quad_pools());
        assert_ne!(a.id(), b.id());
    }
}
