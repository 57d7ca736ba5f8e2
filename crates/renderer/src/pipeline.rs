//! Scene pipelines, one per distinct [`RenderState`].

use scene::frame::{BlendMode, RenderState};

use crate::mesh_cache::Vertex;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const STATES: [RenderState; 4] = [
    RenderState {
        blend: BlendMode::Opaque,
        depth_write: true,
    },
    RenderState {
        blend: BlendMode::Opaque,
        depth_write: false,
    },
    RenderState {
        blend: BlendMode::Alpha,
        depth_write: true,
    },
    RenderState {
        blend: BlendMode::Alpha,
        depth_write: false,
    },
];

fn state_index(state: RenderState) -> usize {
    let blend = match state.blend {
        BlendMode::Opaque => 0,
        BlendMode::Alpha => 2,
    };
    blend + usize::from(!state.depth_write)
}

pub fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Opaque => wgpu::BlendState::REPLACE,
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
    }
}

pub fn depth_stencil(state: RenderState) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: state.depth_write,
        depth_compare: wgpu::CompareFunction::LessEqual,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

pub struct ScenePipelines {
    pipelines: [wgpu::RenderPipeline; 4],
}

impl ScenePipelines {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene WGSL"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene PipelineLayout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        let pipelines = STATES.map(|state| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("Scene Pipeline {state:?}")),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::LAYOUT],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(blend_state(state.blend)),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(depth_stencil(state)),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        });

        Self { pipelines }
    }

    pub fn get(&self, state: RenderState) -> &wgpu::RenderPipeline {
        &self.pipelines[state_index(state)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_state_has_its_own_slot() {
        let mut seen: Vec<usize> = STATES.iter().map(|&s| state_index(s)).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
        for (i, &state) in STATES.iter().enumerate() {
            assert_eq!(state_index(state), i);
        }
    }

    #[test]
    fn translucent_state_blends_without_depth_writes() {
        let state = RenderState::TRANSLUCENT;
        assert_eq!(blend_state(state.blend), wgpu::BlendState::ALPHA_BLENDING);
        assert!(!depth_stencil(state).depth_write_enabled);
        assert!(depth_stencil(RenderState::OPAQUE).depth_write_enabled);
    }
}
