use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::{
    config::AssetPaths,
    particles::ParticleField,
    rendering::{
        texture::{create_repeat_sampler, ImageTexture, TextureKind},
        util::bind_group_builder::BindGroupBuilder,
    },
};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: Vec3,
    pub color: Vec3,
}

/// One vertex per particle, expanded to a quad in the vertex shader.
pub const PARTICLE_VBL: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: size_of::<ParticleVertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &[
        wgpu::VertexAttribute {
            offset: offset_of!(ParticleVertex, position) as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(ParticleVertex, color) as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
    ],
};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct PointsUniform {
    pub model: Mat4,
    pub size: f32,
    pub alpha_test: f32,
    _padding: [f32; 2],
}

impl PointsUniform {
    pub fn new(model: Mat4, field: &ParticleField) -> Self {
        Self {
            model,
            size: field.size,
            alpha_test: field.alpha_test,
            _padding: [0.0; 2],
        }
    }
}

pub fn particle_vertices(field: &ParticleField) -> Vec<ParticleVertex> {
    field
        .positions
        .iter()
        .zip(&field.colors)
        .map(|(&position, &color)| ParticleVertex { position, color })
        .collect()
}

pub fn points_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Points bind group layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// GPU copy of one particle field and its per-object uniform.
pub struct RenderParticleField {
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub count: u32,
}

impl RenderParticleField {
    pub fn new(
        device: &wgpu::Device,
        field: &ParticleField,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let vertices = particle_vertices(field);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle vertex buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Points uniform buffer"),
            contents: bytemuck::bytes_of(&PointsUniform::new(Mat4::IDENTITY, field)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Points bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            vertex_buffer,
            uniform_buffer,
            bind_group,
            count: vertices.len() as u32,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, uniform: PointsUniform) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.count == 0 {
            return;
        }

        render_pass.set_bind_group(2, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..6, 0..self.count);
    }
}

/// The sprite and alpha map every particle is drawn with.
pub struct ParticleSprite {
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl ParticleSprite {
    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, assets: &AssetPaths) -> Self {
        let sprite = ImageTexture::load_or_placeholder(
            device,
            queue,
            &assets.resolve(&assets.particle_sprite),
            TextureKind::Color,
        );
        let alpha = ImageTexture::load_or_placeholder(
            device,
            queue,
            &assets.resolve(&assets.particle_alpha),
            TextureKind::Data,
        );
        let sampler = create_repeat_sampler(device, "Particle sampler");

        let (bind_group_layout, bind_group) =
            BindGroupBuilder::new("Particle sprite", wgpu::ShaderStages::FRAGMENT)
                .texture(0, &sprite.view)
                .texture(1, &alpha.view)
                .sampler(2, &sampler)
                .build(device);

        Self {
            bind_group_layout,
            bind_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParticleConfig;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn one_vertex_per_particle() {
        let field = ParticleField::generate(&mut StdRng::seed_from_u64(3), &ParticleConfig::default());
        let vertices = particle_vertices(&field);

        assert_eq!(vertices.len(), field.len());
        assert_eq!(vertices[10].position, field.positions[10]);
        assert_eq!(vertices[10].color, field.colors[10]);
        assert_eq!(PARTICLE_VBL.array_stride, 24);
    }

    #[test]
    fn uniform_carries_material_settings() {
        let field = ParticleField::generate(&mut StdRng::seed_from_u64(3), &ParticleConfig::default());
        let uniform = PointsUniform::new(Mat4::IDENTITY, &field);

        assert_eq!(uniform.size, 0.08);
        assert_eq!(uniform.alpha_test, 0.01);
        assert_eq!(size_of::<PointsUniform>(), 80);
    }
}
