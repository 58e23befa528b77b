use id_arena::Arena;
use wgpu::{
    DepthBiasState, Device, MultisampleState, PipelineCompilationOptions, RenderPassDescriptor,
    ShaderSource, StencilState,
};

use crate::rendering::{
    gold_material::GoldMaterial,
    instance::INSTANCE_VBL,
    render_common::RenderCommon,
    render_model::{render_model_instances, RenderModel, MODEL_PRIMITIVE_STATE, RENDER_MODEL_VBL},
    shader_loader::{PipelineCache, PipelineCacheBuilder, PipelineId, ShaderDefinition},
    texture::DepthTexture,
};

const GOLD_MESH_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Gold mesh",
    path: "gold_mesh.wgsl",
};

pub struct MeshPassTextureViews<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
}

/// Draws every uploaded model with the gold material. Clears depth.
pub struct MeshPass {
    pipeline_id: PipelineId,
    material: GoldMaterial,
}

impl MeshPass {
    pub fn create(
        device: &Device,
        common: &RenderCommon,
        cache_builder: &mut PipelineCacheBuilder,
        material: GoldMaterial,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Gold mesh pipeline layout"),
            bind_group_layouts: &[&common.frame_bind_group_layout, &material.bind_group_layout],
            push_constant_ranges: &[],
        });
        let format = common.surface_format;

        let pipeline_id = cache_builder.add_shader(
            GOLD_MESH_SHADER,
            Box::new(
                move |device: &Device, shader_def: &ShaderDefinition, source: &str| {
                    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: Some(shader_def.name),
                        source: ShaderSource::Wgsl(source.into()),
                    });

                    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some("Gold mesh pipeline"),
                        layout: Some(&pipeline_layout),
                        vertex: wgpu::VertexState {
                            module: &shader,
                            entry_point: Some("vs_main"),
                            buffers: &[RENDER_MODEL_VBL, INSTANCE_VBL],
                            compilation_options: PipelineCompilationOptions::default(),
                        },
                        fragment: Some(wgpu::FragmentState {
                            module: &shader,
                            entry_point: Some("fs_main"),
                            targets: &[Some(wgpu::ColorTargetState {
                                format,
                                blend: Some(wgpu::BlendState::REPLACE),
                                write_mask: wgpu::ColorWrites::ALL,
                            })],
                            compilation_options: PipelineCompilationOptions::default(),
                        }),
                        primitive: MODEL_PRIMITIVE_STATE,
                        depth_stencil: Some(wgpu::DepthStencilState {
                            format: DepthTexture::DEPTH_FORMAT,
                            depth_write_enabled: true,
                            depth_compare: wgpu::CompareFunction::Less,
                            stencil: StencilState::default(),
                            bias: DepthBiasState::default(),
                        }),
                        multisample: MultisampleState::default(),
                        multiview: None,
                        cache: None,
                    });

                    Ok(pipeline)
                },
            ),
        );

        Self {
            pipeline_id,
            material,
        }
    }

    pub fn render(
        &self,
        texture_views: &MeshPassTextureViews,
        encoder: &mut wgpu::CommandEncoder,
        pipeline_cache: &PipelineCache,
        common: &RenderCommon,
        queue: &wgpu::Queue,
        render_models: &Arena<RenderModel>,
    ) {
        let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Gold mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: texture_views.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let Some(pipeline) = pipeline_cache.get(self.pipeline_id) else {
            return;
        };

        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &common.frame_bind_group, &[]);
        render_pass.set_bind_group(1, &self.material.bind_group, &[]);

        for (_id, render_model) in render_models.iter() {
            if !render_model.instances.should_render() {
                continue;
            }

            render_model_instances(&mut render_pass, queue, render_model);
        }
    }
}
