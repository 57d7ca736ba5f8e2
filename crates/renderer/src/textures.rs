//! GPU texture store: uploads decoded images, hands out `TextureHandle`s and
//! keeps one bind group per texture.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use asset::texture::TextureData;
use asset::{TextureHandle, TextureLoader};

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

pub struct TextureStore {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    textures: Vec<GpuTexture>,
    by_path: HashMap<PathBuf, TextureHandle>,
    /// 1x1 white, bound for untextured draws.
    fallback: GpuTexture,
}

impl TextureStore {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Repeat Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = TextureData::solid(1, [255, 255, 255, 255]);
        let fallback = create_gpu_texture(device, queue, &layout, &sampler, &white, "White");

        Self {
            layout,
            sampler,
            textures: Vec::new(),
            by_path: HashMap::new(),
            fallback,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &TextureData,
        label: &str,
    ) -> TextureHandle {
        let gpu = create_gpu_texture(device, queue, &self.layout, &self.sampler, data, label);
        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(gpu);
        handle
    }

    /// Decode and upload a file; repeated paths share one texture.
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Option<TextureHandle> {
        if let Some(&handle) = self.by_path.get(path) {
            return Some(handle);
        }
        match TextureData::load(path) {
            Ok(data) => {
                let label = path.file_name().and_then(|n| n.to_str()).unwrap_or("texture");
                let handle = self.upload(device, queue, &data, label);
                log::info!("Uploaded texture {} as {:?}", path.display(), handle);
                self.by_path.insert(path.to_path_buf(), handle);
                Some(handle)
            }
            Err(err) => {
                log::warn!("Texture unavailable: {err:#}");
                None
            }
        }
    }

    /// Bind group for a handle; unknown handles and `None` get the white texture.
    pub fn bind_group(&self, handle: Option<TextureHandle>) -> &wgpu::BindGroup {
        handle
            .and_then(|h| self.textures.get(h.0 as usize))
            .map_or(&self.fallback.bind_group, |t| &t.bind_group)
    }
}

fn create_gpu_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    data: &TextureData,
    label: &str,
) -> GpuTexture {
    use wgpu::util::DeviceExt;

    let (texels, mip_level_count) = data.mip_chain();
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: data.width,
                height: data.height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &texels,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    GpuTexture {
        _texture: texture,
        bind_group,
    }
}

/// [`TextureLoader`] that uploads straight into a [`TextureStore`].
pub struct TextureUploader<'a> {
    pub store: &'a mut TextureStore,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
}

impl TextureLoader for TextureUploader<'_> {
    fn load_texture(&mut self, path: &Path) -> Option<TextureHandle> {
        self.store.load(self.device, self.queue, path)
    }
}
