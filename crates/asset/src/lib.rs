//! Asset loading/parsers (meshes, materials, textures).
//! Multipart OBJ + MTL loader producing per-material face lists over shared
//! vertex pools, and RGBA8 texture decoding for GPU upload.

pub mod material;
pub mod mesh;
pub mod mtl;
pub mod obj;
pub mod texture;

pub use material::{Material, MaterialLibrary, NoTextures, TextureHandle, TextureLoader};
pub use mesh::{
    DrawBatch, DrawList, FaceVertex, MaterialGroup, Mesh, MeshDraw, MeshId, MeshVertex, Triangle,
    VertexPools,
};
pub use obj::{LoadOutcome, ObjModel, load_obj};
