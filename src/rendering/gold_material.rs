use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::{
    config::{AssetPaths, GoldMaterialConfig},
    rendering::{
        texture::{create_repeat_sampler, ImageTexture, TextureKind},
        util::bind_group_builder::BindGroupBuilder,
    },
};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct GoldParams {
    pub roughness: f32,
    pub metalness: f32,
    _padding: [f32; 2],
}

impl From<&GoldMaterialConfig> for GoldParams {
    fn from(config: &GoldMaterialConfig) -> Self {
        Self {
            roughness: config.roughness,
            metalness: config.metalness,
            _padding: [0.0; 2],
        }
    }
}

/// Metallic gold paint shared by every mesh of the interaction target.
pub struct GoldMaterial {
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl GoldMaterial {
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        assets: &AssetPaths,
        config: &GoldMaterialConfig,
    ) -> Self {
        let load = |path: &std::path::Path, kind: TextureKind| {
            ImageTexture::load_or_placeholder(device, queue, &assets.resolve(path), kind)
        };

        let color = load(&assets.gold_color, TextureKind::Color);
        let normal = load(&assets.gold_normal, TextureKind::Normal);
        let roughness = load(&assets.gold_roughness, TextureKind::Data);
        let metalness = load(&assets.gold_metalness, TextureKind::Data);
        let sampler = create_repeat_sampler(device, "Gold sampler");

        let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Gold params buffer"),
            contents: bytemuck::bytes_of(&GoldParams::from(config)),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let (bind_group_layout, bind_group) =
            BindGroupBuilder::new("Gold material", wgpu::ShaderStages::FRAGMENT)
                .texture(0, &color.view)
                .texture(1, &normal.view)
                .texture(2, &roughness.view)
                .texture(3, &metalness.view)
                .sampler(4, &sampler)
                .uniform(5, params.as_entire_binding())
                .build(device);

        Self {
            bind_group_layout,
            bind_group,
        }
    }
}
