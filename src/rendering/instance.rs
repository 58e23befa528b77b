use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::BufferUsages;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Instance {
    pub model: Mat4,
    pub normal: Mat4,
}

impl Instance {
    /// `inverse_world` is `None` for collapsed transforms, which can't be lit
    /// meaningfully anyway.
    pub fn new(world: Mat4, inverse_world: Option<Mat4>) -> Self {
        Self {
            model: world,
            normal: inverse_world
                .map(|inverse| inverse.transpose())
                .unwrap_or(Mat4::IDENTITY),
        }
    }
}

const fn mat4_attributes<const N: usize>(
    first_location: u32,
    base_offset: u64,
) -> [wgpu::VertexAttribute; N] {
    let mut attributes = [wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x4,
        offset: 0,
        shader_location: 0,
    }; N];

    let mut i = 0;
    while i < N {
        attributes[i].offset = base_offset + (i * size_of::<[f32; 4]>()) as u64;
        attributes[i].shader_location = first_location + i as u32;
        i += 1;
    }

    attributes
}

// Both matrices are passed as four vec4 columns, at locations 4..=11
const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 8] = mat4_attributes(4, 0);

pub const INSTANCE_VBL: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: size_of::<Instance>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &INSTANCE_ATTRIBUTES,
};

pub struct Instances {
    instances: Vec<Instance>,
}

impl Instances {
    pub fn new() -> Self {
        Self {
            instances: Vec::new(),
        }
    }

    pub fn add(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn write_to_buffer(&self, queue: &wgpu::Queue, instance_buffer: &InstanceBuffer) {
        let count = self.len().min(InstanceBuffer::MAX_INSTANCES as usize);
        queue.write_buffer(
            instance_buffer.buffer(),
            0,
            bytemuck::cast_slice(&self.instances[..count]),
        );
    }

    pub fn should_render(&self) -> bool {
        !self.instances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }
}

pub struct InstanceBuffer(wgpu::Buffer);

impl InstanceBuffer {
    pub const MAX_INSTANCES: u64 = 128;

    pub fn new(device: &wgpu::Device, name: &str) -> Self {
        let label = format!("Instance buffer ({})", name);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&label),
            size: size_of::<Instance>() as u64 * Self::MAX_INSTANCES,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self(buffer)
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }

    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(1, self.buffer().slice(..));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4Swizzles};

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let world = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let instance = Instance::new(world, Some(world.inverse()));

        // A 45 degree normal on a surface stretched along X tilts towards Y
        let normal = (instance.normal * Vec3::new(1.0, 1.0, 0.0).extend(0.0)).xyz();
        assert!(normal.y > normal.x);
    }

    #[test]
    fn collapsed_transform_gets_identity_normals() {
        let instance = Instance::new(Mat4::from_scale(Vec3::ZERO), None);

        assert_eq!(instance.normal, Mat4::IDENTITY);
    }

    #[test]
    fn instance_attributes_cover_both_matrices() {
        let locations = INSTANCE_ATTRIBUTES
            .iter()
            .map(|attribute| attribute.shader_location)
            .collect::<Vec<_>>();

        assert_eq!(locations, (4..12).collect::<Vec<_>>());
        assert_eq!(INSTANCE_ATTRIBUTES[4].offset, 64);
        assert_eq!(INSTANCE_VBL.array_stride, 128);
    }
}
