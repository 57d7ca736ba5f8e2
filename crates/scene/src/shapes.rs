//! Procedural meshes: sphere, truncated cone, disk and flat quads.
//! Cones and disks follow the usual quadric convention (axis along +Z, base
//! at z = 0).

use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use asset::{FaceVertex, MaterialGroup, Mesh, VertexPools};

/// Accumulates indexed vertices; every attribute shares the vertex index.
#[derive(Debug, Default)]
pub struct ShapeBuilder {
    pools: VertexPools,
    triangles: Vec<[FaceVertex; 3]>,
}

impl ShapeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> usize {
        let index = self.pools.positions.len();
        self.pools.positions.push(position);
        self.pools.normals.push(normal);
        self.pools.texcoords.push(uv);
        index
    }

    pub fn triangle(&mut self, a: usize, b: usize, c: usize) {
        let corner = |i| FaceVertex::new(i, Some(i), Some(i));
        self.triangles.push([corner(a), corner(b), corner(c)]);
    }

    pub fn build(self, name: &str, material: Option<&str>) -> Mesh {
        let group = MaterialGroup {
            material: material.map(str::to_owned),
            triangles: self.triangles,
        };
        Mesh::new(name, vec![group], Arc::new(self.pools))
    }
}

pub fn sphere(radius: f32, slices: u32, stacks: u32) -> Mesh {
    let mut b = ShapeBuilder::new();
    for stack in 0..=stacks {
        let phi = PI * stack as f32 / stacks as f32;
        for slice in 0..=slices {
            let theta = TAU * slice as f32 / slices as f32;
            let n = [phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos()];
            b.vertex(
                n.map(|c| c * radius),
                n,
                [slice as f32 / slices as f32, stack as f32 / stacks as f32],
            );
        }
    }
    let row = slices + 1;
    for stack in 0..stacks {
        for slice in 0..slices {
            let i0 = (stack * row + slice) as usize;
            let i1 = i0 + 1;
            let i2 = i0 + row as usize;
            let i3 = i2 + 1;
            b.triangle(i0, i2, i1);
            b.triangle(i1, i2, i3);
        }
    }
    b.build("sphere", None)
}

/// Open truncated cone from `base` radius at z = 0 to `top` radius at
/// z = `height`.
pub fn cylinder(base: f32, top: f32, height: f32, slices: u32) -> Mesh {
    let mut b = ShapeBuilder::new();
    let slope = (base - top) / height;
    for slice in 0..=slices {
        let theta = TAU * slice as f32 / slices as f32;
        let (s, c) = theta.sin_cos();
        let n = {
            let len = (1.0 + slope * slope).sqrt();
            [c / len, s / len, slope / len]
        };
        let u = slice as f32 / slices as f32;
        b.vertex([c * base, s * base, 0.0], n, [u, 0.0]);
        b.vertex([c * top, s * top, height], n, [u, 1.0]);
    }
    for slice in 0..slices as usize {
        let i = slice * 2;
        b.triangle(i, i + 2, i + 1);
        b.triangle(i + 1, i + 2, i + 3);
    }
    b.build("cylinder", None)
}

/// Flat annulus in the z = 0 plane facing +Z.
pub fn disk(inner: f32, outer: f32, slices: u32) -> Mesh {
    let mut b = ShapeBuilder::new();
    let n = [0.0, 0.0, 1.0];
    for slice in 0..=slices {
        let theta = TAU * slice as f32 / slices as f32;
        let (s, c) = theta.sin_cos();
        let uv = |r: f32| [0.5 + 0.5 * c * r / outer, 0.5 + 0.5 * s * r / outer];
        b.vertex([c * inner, s * inner, 0.0], n, uv(inner));
        b.vertex([c * outer, s * outer, 0.0], n, uv(outer));
    }
    for slice in 0..slices as usize {
        let i = slice * 2;
        b.triangle(i, i + 1, i + 3);
        b.triangle(i, i + 3, i + 2);
    }
    b.build("disk", None)
}

/// Upward-facing quad; corners in order, split along the 0-2 diagonal.
pub fn quad(name: &str, material: &str, corners: [[f32; 3]; 4], uvs: [[f32; 2]; 4]) -> Mesh {
    let mut b = ShapeBuilder::new();
    let up = [0.0, 1.0, 0.0];
    let idx: Vec<usize> = corners
        .iter()
        .zip(uvs)
        .map(|(&p, uv)| b.vertex(p, up, uv))
        .collect();
    b.triangle(idx[0], idx[1], idx[2]);
    b.triangle(idx[0], idx[2], idx[3]);
    b.build(name, Some(material))
}
