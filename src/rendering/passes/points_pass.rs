use wgpu::{
    DepthBiasState, Device, MultisampleState, PipelineCompilationOptions, RenderPassDescriptor,
    ShaderSource, StencilState,
};

use crate::rendering::{
    passes::mesh_pass::MeshPassTextureViews,
    render_common::RenderCommon,
    render_particles::{points_bind_group_layout, ParticleSprite, RenderParticleField, PARTICLE_VBL},
    shader_loader::{PipelineCache, PipelineCacheBuilder, PipelineId, ShaderDefinition},
    texture::DepthTexture,
};

const PARTICLES_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Particles",
    path: "particles.wgsl",
};

/// Alpha-blended camera-facing sprites, depth tested against the meshes but
/// not writing depth.
pub struct PointsPass {
    pipeline_id: PipelineId,
    sprite: ParticleSprite,
    pub points_layout: wgpu::BindGroupLayout,
}

impl PointsPass {
    pub fn create(
        device: &Device,
        common: &RenderCommon,
        cache_builder: &mut PipelineCacheBuilder,
        sprite: ParticleSprite,
    ) -> Self {
        let points_layout = points_bind_group_layout(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particles pipeline layout"),
            bind_group_layouts: &[
                &common.frame_bind_group_layout,
                &sprite.bind_group_layout,
                &points_layout,
            ],
            push_constant_ranges: &[],
        });
        let format = common.surface_format;

        let pipeline_id = cache_builder.add_shader(
            PARTICLES_SHADER,
            Box::new(
                move |device: &Device, shader_def: &ShaderDefinition, source: &str| {
                    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: Some(shader_def.name),
                        source: ShaderSource::Wgsl(source.into()),
                    });

                    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some("Particles pipeline"),
                        layout: Some(&pipeline_layout),
                        vertex: wgpu::VertexState {
                            module: &shader,
                            entry_point: Some("vs_main"),
                            buffers: &[PARTICLE_VBL],
                            compilation_options: PipelineCompilationOptions::default(),
                        },
                        fragment: Some(wgpu::FragmentState {
                            module: &shader,
                            entry_point: Some("fs_main"),
                            targets: &[Some(wgpu::ColorTargetState {
                                format,
                                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                                write_mask: wgpu::ColorWrites::ALL,
                            })],
                            compilation_options: PipelineCompilationOptions::default(),
                        }),
                        primitive: wgpu::PrimitiveState::default(),
                        depth_stencil: Some(wgpu::DepthStencilState {
                            format: DepthTexture::DEPTH_FORMAT,
                            depth_write_enabled: false,
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
            sprite,
            points_layout,
        }
    }

    pub fn render<'f>(
        &self,
        texture_views: &MeshPassTextureViews,
        encoder: &mut wgpu::CommandEncoder,
        pipeline_cache: &PipelineCache,
        common: &RenderCommon,
        fields: impl IntoIterator<Item = &'f RenderParticleField>,
    ) {
        let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Particles pass"),
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
                    load: wgpu::LoadOp::Load,
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
        render_pass.set_bind_group(1, &self.sprite.bind_group, &[]);

        for field in fields {
            field.draw(&mut render_pass);
        }
    }
}
