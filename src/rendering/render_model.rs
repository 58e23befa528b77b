use std::mem::offset_of;

use id_arena::{Arena, Id};
use wgpu::util::DeviceExt;

use crate::{
    model::{Model, ModelPrimitive, Vertex},
    rendering::instance::{Instance, InstanceBuffer, Instances},
    scene_graph::{Drawable, Scene},
};

pub type RenderModelId = Id<RenderModel>;

pub struct RenderPrimitive {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl RenderPrimitive {
    fn from_primitive(device: &wgpu::Device, model: &Model, primitive: &ModelPrimitive) -> Self {
        let vertex_buffer_name = format!(
            "Vertex buffer ({}, primitive {})",
            model.name, primitive.index
        );
        let index_buffer_name = format!(
            "Index buffer ({}, primitive {})",
            model.name, primitive.index
        );

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&vertex_buffer_name),
            contents: bytemuck::cast_slice(&primitive.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&index_buffer_name),
            contents: bytemuck::cast_slice(&primitive.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: primitive.indices.len() as u32,
        }
    }
}

pub struct RenderModel {
    pub primitives: Vec<RenderPrimitive>,
    pub instances: Instances,
    pub instance_buffer: InstanceBuffer,
}

impl RenderModel {
    pub fn from_model(device: &wgpu::Device, model: &Model) -> Self {
        let primitives = model
            .primitives
            .iter()
            .map(|primitive| RenderPrimitive::from_primitive(device, model, primitive))
            .collect();

        RenderModel {
            primitives,
            instances: Instances::new(),
            instance_buffer: InstanceBuffer::new(device, &model.name),
        }
    }
}

/// Rebuilds every render model's instance list from the scene's world matrices.
pub fn gather_instances(scene: &Scene, render_models: &mut Arena<RenderModel>) {
    for (_, render_model) in render_models.iter_mut() {
        render_model.instances.clear();
    }

    for (_, object) in scene.objects.iter() {
        let Drawable::Mesh(model_id) = object.drawable else {
            continue;
        };

        let Some(render_model) = scene
            .models
            .get(model_id)
            .and_then(|model| model.render_model)
            .and_then(|id| render_models.get_mut(id))
        else {
            continue;
        };

        render_model.instances.add(Instance::new(
            *object.transform.get_world_matrix(),
            object.transform.get_inverse_world_matrix(),
        ));
    }
}

pub fn render_model_instances(
    render_pass: &mut wgpu::RenderPass<'_>,
    queue: &wgpu::Queue,
    render_model: &RenderModel,
) {
    render_model
        .instances
        .write_to_buffer(queue, &render_model.instance_buffer);
    render_model.instance_buffer.bind(render_pass);

    let instance_count = render_model
        .instances
        .len()
        .min(InstanceBuffer::MAX_INSTANCES as usize) as u32;

    for primitive in &render_model.primitives {
        render_pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
        render_pass.set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..primitive.num_indices, 0, 0..instance_count);
    }
}

pub const MODEL_PRIMITIVE_STATE: wgpu::PrimitiveState = wgpu::PrimitiveState {
    topology: wgpu::PrimitiveTopology::TriangleList,
    strip_index_format: None,
    front_face: wgpu::FrontFace::Ccw,
    cull_mode: Some(wgpu::Face::Back),
    polygon_mode: wgpu::PolygonMode::Fill,
    unclipped_depth: false,
    conservative: false,
};

pub const RENDER_MODEL_VBL: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, position) as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, normal) as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, tex_coords) as wgpu::BufferAddress,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x2,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, tangent) as wgpu::BufferAddress,
            shader_location: 3,
            format: wgpu::VertexFormat::Float32x3,
        },
    ],
};
