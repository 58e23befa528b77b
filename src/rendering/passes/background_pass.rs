use wgpu::{Device, MultisampleState, PipelineCompilationOptions, RenderPassDescriptor, ShaderSource};

use crate::rendering::{
    render_common::RenderCommon,
    shader_loader::{PipelineCache, PipelineCacheBuilder, PipelineId, ShaderDefinition},
};

const BACKGROUND_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Background",
    path: "background.wgsl",
};

/// Clears the frame and darkens its edges with a fullscreen triangle.
pub struct BackgroundPass {
    pipeline_id: PipelineId,
    clear_color: wgpu::Color,
}

impl BackgroundPass {
    pub fn create(
        device: &Device,
        common: &RenderCommon,
        cache_builder: &mut PipelineCacheBuilder,
        clear_color: wgpu::Color,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Background pipeline layout"),
            bind_group_layouts: &[&common.frame_bind_group_layout],
            push_constant_ranges: &[],
        });
        let format = common.surface_format;

        let pipeline_id = cache_builder.add_shader(
            BACKGROUND_SHADER,
            Box::new(
                move |device: &Device, shader_def: &ShaderDefinition, source: &str| {
                    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: Some(shader_def.name),
                        source: ShaderSource::Wgsl(source.into()),
                    });

                    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some("Background pipeline"),
                        layout: Some(&pipeline_layout),
                        vertex: wgpu::VertexState {
                            module: &shader,
                            entry_point: Some("vs_main"),
                            buffers: &[],
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
                        depth_stencil: None,
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
            clear_color,
        }
    }

    pub fn render(
        &self,
        color: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
        pipeline_cache: &PipelineCache,
        common: &RenderCommon,
    ) {
        let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Background pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let Some(pipeline) = pipeline_cache.get(self.pipeline_id) else {
            return;
        };

        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &common.frame_bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
