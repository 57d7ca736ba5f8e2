//! Vertex buffers for compiled draw lists, keyed by mesh identity.

use std::collections::HashMap;

use asset::{DrawBatch, DrawList, MeshId, TextureHandle};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Vertex: position + normal + uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };
}

pub fn batch_vertices(batch: &DrawBatch) -> Vec<Vertex> {
    batch
        .vertices
        .iter()
        .map(|v| Vertex {
            pos: v.position,
            normal: v.normal,
            uv: v.uv,
        })
        .collect()
}

pub struct GpuBatch {
    pub buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub texture: Option<TextureHandle>,
}

/// Upload every non-empty batch of a list.
pub fn upload_list(device: &wgpu::Device, list: &DrawList, label: &str) -> Vec<GpuBatch> {
    list.batches
        .iter()
        .filter(|b| !b.vertices.is_empty())
        .map(|batch| {
            let vertices = batch_vertices(batch);
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            GpuBatch {
                buffer,
                vertex_count: vertices.len() as u32,
                texture: batch.texture,
            }
        })
        .collect()
}

/// Mesh draw lists never change once compiled, so each is uploaded once.
#[derive(Default)]
pub struct MeshCache {
    meshes: HashMap<MeshId, Vec<GpuBatch>>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure(&mut self, device: &wgpu::Device, id: MeshId, list: &DrawList) {
        self.meshes.entry(id).or_insert_with(|| {
            log::debug!("Uploading mesh {} ({} vertices)", id.raw(), list.vertex_count());
            upload_list(device, list, "Mesh VB")
        });
    }

    pub fn get(&self, id: MeshId) -> &[GpuBatch] {
        self.meshes.get(&id).map_or(&[], Vec::as_slice)
    }
}
