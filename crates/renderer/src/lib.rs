//! Renderer: wgpu init, depth, texture/mesh caches and execution of scene
//! frames. wgpu = 27.x, winit = 0.30.x

use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{Context, Result};
use asset::MeshDraw;
use scene::frame::Frame;
use wgpu::{
    BindGroup, BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType,
    Buffer, BufferBindingType, BufferUsages, CommandEncoderDescriptor, Device, DeviceDescriptor,
    Extent3d, Features, Instance, InstanceDescriptor, Limits, LoadOp, Operations, PowerPreference,
    PresentMode, Queue, RenderPassColorAttachment, RenderPassDescriptor, ShaderStages, StoreOp,
    Surface, SurfaceConfiguration, SurfaceError, TextureDescriptor, TextureDimension,
    TextureUsages, TextureView, TextureViewDescriptor,
};
use winit::{dpi::PhysicalSize, window::Window};

pub mod mesh_cache;
pub mod overlay;
pub mod pipeline;
pub mod textures;
pub mod uniforms;

use mesh_cache::{GpuBatch, MeshCache, upload_list};
use overlay::{OverlayFrame, OverlayRenderer};
use pipeline::{DEPTH_FORMAT, ScenePipelines};
use textures::{TextureStore, TextureUploader};
use uniforms::{
    DRAW_UNIFORM_STRIDE, DrawUniform, SceneUniform, clear_color, pack_draw_uniforms,
};

/// Initial per-draw uniform capacity; grows by doubling.
const INITIAL_DRAW_CAPACITY: usize = 256;

/// Where a draw's vertex buffers live this frame.
enum BatchSource {
    Cached(asset::MeshId),
    Transient(usize),
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipelines
    pipelines: ScenePipelines,

    // Scene UBO
    scene_buf: Buffer,
    scene_bg: BindGroup,

    // Per-draw UBO (dynamic offsets)
    draw_bgl: BindGroupLayout,
    draw_buf: Buffer,
    draw_bg: BindGroup,
    draw_capacity: usize,

    // Resources
    textures: TextureStore,
    meshes: MeshCache,
    overlay: OverlayRenderer,

    // Depth
    depth_view: TextureView,

    // Size cache
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an Arc<Window>.
    pub async fn new(window: Arc<Window>, backends: wgpu::Backends) -> Result<Self> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter")?;
        log::info!("Using GPU adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Farm Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create GPU device")?;

        // Colors are authored for a non-sRGB target.
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("Surface reports no formats")?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, &surface_config);

        // ==== Scene BGL/BG ====
        let scene_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Scene BGL"),
            entries: &[uniform_entry::<SceneUniform>(false)],
        });
        let scene_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene UBO"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let scene_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene BG"),
            layout: &scene_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buf.as_entire_binding(),
            }],
        });

        // ==== Draw BGL/BG ====
        let draw_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Draw BGL"),
            entries: &[uniform_entry::<DrawUniform>(true)],
        });
        let (draw_buf, draw_bg) = create_draw_uniforms(&device, &draw_bgl, INITIAL_DRAW_CAPACITY);

        let textures = TextureStore::new(&device, &queue);
        let pipelines =
            ScenePipelines::new(&device, surface_format, &[&scene_bgl, &draw_bgl, textures.layout()]);
        let overlay = OverlayRenderer::new(&device, surface_format);

        log::info!(
            "Renderer initialized: {}x{}, format: {:?}",
            width,
            height,
            surface_format
        );

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipelines,
            scene_buf,
            scene_bg,
            draw_bgl,
            draw_buf,
            draw_bg,
            draw_capacity: INITIAL_DRAW_CAPACITY,
            textures,
            meshes: MeshCache::new(),
            overlay,
            depth_view,
            width,
            height,
        })
    }

    /// Texture loader uploading into this renderer's store.
    pub fn texture_loader(&mut self) -> TextureUploader<'_> {
        TextureUploader {
            store: &mut self.textures,
            device: &self.device,
            queue: &self.queue,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    /// Render one frame: upload uniforms and geometry, replay the draw list,
    /// then the overlay.
    pub fn render(
        &mut self,
        frame: &Frame<'_>,
        overlay: Option<&OverlayFrame>,
    ) -> Result<(), SurfaceError> {
        // --- uniforms
        let scene_uniform = SceneUniform::from_frame(frame);
        self.queue
            .write_buffer(&self.scene_buf, 0, bytemuck::bytes_of(&scene_uniform));

        if frame.draws.len() > self.draw_capacity {
            let capacity = frame.draws.len().next_power_of_two();
            log::debug!("Growing draw uniforms to {capacity}");
            let (buf, bg) = create_draw_uniforms(&self.device, &self.draw_bgl, capacity);
            self.draw_buf = buf;
            self.draw_bg = bg;
            self.draw_capacity = capacity;
        }
        let packed = pack_draw_uniforms(&frame.draws);
        if !packed.is_empty() {
            self.queue.write_buffer(&self.draw_buf, 0, &packed);
        }

        // --- geometry
        let mut transient: Vec<Vec<GpuBatch>> = Vec::new();
        let sources: Vec<BatchSource> = frame
            .draws
            .iter()
            .map(|draw| match &draw.geometry {
                MeshDraw::Cached { id, list } => {
                    self.meshes.ensure(&self.device, *id, list);
                    BatchSource::Cached(*id)
                }
                MeshDraw::Immediate(list) => {
                    transient.push(upload_list(&self.device, list, "Immediate VB"));
                    BatchSource::Transient(transient.len() - 1)
                }
            })
            .collect();

        // --- frame & pass
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("ScenePass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(clear_color(frame.clear_color)),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            rpass.set_bind_group(0, &self.scene_bg, &[]);
            for (i, (draw, source)) in frame.draws.iter().zip(&sources).enumerate() {
                let batches: &[GpuBatch] = match source {
                    BatchSource::Cached(id) => self.meshes.get(*id),
                    BatchSource::Transient(k) => &transient[*k],
                };
                if batches.is_empty() {
                    continue;
                }
                rpass.set_pipeline(self.pipelines.get(draw.state));
                let offset = (i * DRAW_UNIFORM_STRIDE) as u32;
                rpass.set_bind_group(1, &self.draw_bg, &[offset]);
                for batch in batches {
                    rpass.set_bind_group(2, self.textures.bind_group(batch.texture), &[]);
                    rpass.set_vertex_buffer(0, batch.buffer.slice(..));
                    rpass.draw(0..batch.vertex_count, 0..1);
                }
            }
        }

        if let Some(overlay) = overlay {
            self.overlay.paint(
                &self.device,
                &self.queue,
                &mut encoder,
                &view,
                [self.width, self.height],
                overlay,
            );
        }

        self.queue.submit(Some(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }
}

fn uniform_entry<T>(dynamic: bool) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding: 0,
        visibility: ShaderStages::VERTEX_FRAGMENT,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

/// Per-draw UBO holding `capacity` strided entries, bound one entry wide.
fn create_draw_uniforms(
    device: &Device,
    layout: &BindGroupLayout,
    capacity: usize,
) -> (Buffer, BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Draw UBO"),
        size: (capacity * DRAW_UNIFORM_STRIDE) as u64,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Draw BG"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}
