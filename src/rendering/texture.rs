use std::path::Path;

use anyhow::Context;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

pub struct DepthTexture {
    view: wgpu::TextureView,
    label: String,
}

impl DepthTexture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, size: PhysicalSize<u32>, label: impl Into<String>) -> Self {
        let label: String = label.into();
        let view = Self::create_view(device, size, &label);

        DepthTexture { view, label }
    }

    fn create_view(
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        label: &str,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        self.view = Self::create_view(device, size, &self.label);
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

/// How a texture's texels are interpreted, which decides its format and the
/// placeholder used when the file can't be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Color,
    Normal,
    /// Linear data such as roughness, metalness or alpha masks
    Data,
}

impl TextureKind {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            TextureKind::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureKind::Normal | TextureKind::Data => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    pub fn placeholder_texel(self) -> [u8; 4] {
        match self {
            TextureKind::Color => [255, 255, 255, 255],
            TextureKind::Normal => [127, 127, 255, 255],
            TextureKind::Data => [255, 255, 255, 255],
        }
    }
}

pub struct ImageTexture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl ImageTexture {
    fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        kind: TextureKind,
        (width, height): (u32, u32),
        pixels: &[u8],
    ) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                // TODO: Generate mipmaps, the 2K gold maps shimmer when far away
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: kind.format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::wgt::TextureDataOrder::default(),
            pixels,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            _texture: texture,
            view,
        }
    }

    pub fn placeholder(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        kind: TextureKind,
    ) -> Self {
        Self::from_rgba(device, queue, label, kind, (1, 1), &kind.placeholder_texel())
    }

    /// Loads an image file, falling back to a 1x1 placeholder if that fails.
    pub fn load_or_placeholder(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        kind: TextureKind,
    ) -> Self {
        let label = path.to_string_lossy();

        match load_rgba(path) {
            Ok(image) => {
                log::debug!("Loaded texture {} ({}x{})", label, image.width(), image.height());
                Self::from_rgba(device, queue, &label, kind, image.dimensions(), &image)
            }
            Err(error) => {
                log::warn!("{:#}, using a placeholder", error);
                Self::placeholder(device, queue, &label, kind)
            }
        }
    }
}

pub fn load_rgba(path: &Path) -> anyhow::Result<image::RgbaImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to load texture {}", path.display()))?;

    Ok(image.to_rgba8())
}

pub fn create_repeat_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        lod_min_clamp: 0.0,
        lod_max_clamp: 32.0,
        compare: None,
        anisotropy_clamp: 1,
        border_color: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_texture_is_an_error() {
        let error = load_rgba(Path::new("assets/does_not_exist.png")).unwrap_err();

        assert!(format!("{:#}", error).contains("does_not_exist.png"));
    }

    #[test]
    fn placeholders_are_neutral() {
        // A flat normal points straight out of the surface
        assert_eq!(TextureKind::Normal.placeholder_texel(), [127, 127, 255, 255]);
        assert_eq!(TextureKind::Color.format(), wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(TextureKind::Data.format(), wgpu::TextureFormat::Rgba8Unorm);
    }
}
