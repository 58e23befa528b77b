use wgpu::util::DeviceExt;

use crate::rendering::{
    global_uniform::GlobalUniformState, lighting::LightingUniform, render_camera::CameraUniform,
    util::bind_group_builder::BindGroupBuilder,
};

/// Per-frame uniforms shared by every pass, bound as group 0.
pub struct RenderCommon {
    pub surface_format: wgpu::TextureFormat,
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
    pub frame_bind_group: wgpu::BindGroup,
    camera_buffer: wgpu::Buffer,
    global_buffer: wgpu::Buffer,
    // Lighting is static, the bind group is its only reader
    _lighting_buffer: wgpu::Buffer,
}

fn uniform_buffer<T: bytemuck::Pod>(device: &wgpu::Device, label: &str, value: &T) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(value),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

impl RenderCommon {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        camera: CameraUniform,
        globals: GlobalUniformState,
        lighting: LightingUniform,
    ) -> Self {
        let camera_buffer = uniform_buffer(device, "Camera uniform buffer", &camera);
        let global_buffer = uniform_buffer(device, "Global uniform buffer", &globals);
        let lighting_buffer = uniform_buffer(device, "Lighting uniform buffer", &lighting);

        let (frame_bind_group_layout, frame_bind_group) =
            BindGroupBuilder::new("Frame", wgpu::ShaderStages::VERTEX_FRAGMENT)
                .uniform(0, camera_buffer.as_entire_binding())
                .uniform(1, global_buffer.as_entire_binding())
                .uniform(2, lighting_buffer.as_entire_binding())
                .build(device);

        Self {
            surface_format,
            frame_bind_group_layout,
            frame_bind_group,
            camera_buffer,
            global_buffer,
            _lighting_buffer: lighting_buffer,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, camera: CameraUniform, globals: GlobalUniformState) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera));
        queue.write_buffer(&self.global_buffer, 0, bytemuck::bytes_of(&globals));
    }
}
