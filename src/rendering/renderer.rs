use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use id_arena::Arena;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    demo::DemoState,
    rendering::{
        config::RenderConfig,
        global_uniform::GlobalUniformState,
        gold_material::GoldMaterial,
        imgui_renderer::ImguiRendererState,
        lighting::LightingUniform,
        passes::{
            background_pass::BackgroundPass,
            mesh_pass::{MeshPass, MeshPassTextureViews},
            points_pass::PointsPass,
        },
        render_camera::CameraUniform,
        render_common::RenderCommon,
        render_model::{gather_instances, RenderModel},
        render_particles::{ParticleSprite, PointsUniform, RenderParticleField},
        shader_loader::{PipelineCacheBuilder, ShaderLoader},
        texture::DepthTexture,
    },
    scene_graph::{Drawable, ParticleFieldId, Scene},
};

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,

    common: RenderCommon,
    depth_texture: DepthTexture,
    render_models: Arena<RenderModel>,
    particle_fields: HashMap<ParticleFieldId, RenderParticleField>,

    shader_loader: ShaderLoader,
    imgui_renderer: ImguiRendererState,

    background_pass: BackgroundPass,
    mesh_pass: MeshPass,
    points_pass: PointsPass,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        demo_state: &DemoState,
        imgui_context: &mut imgui::Context,
        config: &RenderConfig,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter")?;

        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("Surface has no supported formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let scene_config = &demo_state.config;
        let common = RenderCommon::new(
            &device,
            surface_format,
            CameraUniform::from_camera(&demo_state.camera, demo_state.aspect_ratio()),
            GlobalUniformState::new(size, 0.0),
            LightingUniform::from_config(&scene_config.lighting),
        );

        let depth_texture = DepthTexture::new(&device, size, "Depth texture");

        let gold = GoldMaterial::load(&device, &queue, &scene_config.assets, &scene_config.gold);
        let sprite = ParticleSprite::load(&device, &queue, &scene_config.assets);

        let mut cache_builder = PipelineCacheBuilder::new();
        let background_pass =
            BackgroundPass::create(&device, &common, &mut cache_builder, config.clear_color);
        let mesh_pass = MeshPass::create(&device, &common, &mut cache_builder, gold);
        let points_pass = PointsPass::create(&device, &common, &mut cache_builder, sprite);

        let shader_loader = ShaderLoader::new(&device, cache_builder, config.hot_reload_shaders)?;

        let imgui_renderer =
            ImguiRendererState::new(&device, &queue, surface_format, imgui_context);

        Ok(Self {
            window,
            size,
            surface,
            surface_config,
            device,
            queue,
            common,
            depth_texture,
            render_models: Arena::new(),
            particle_fields: HashMap::new(),
            shader_loader,
            imgui_renderer,
            background_pass,
            mesh_pass,
            points_pass,
        })
    }

    /// Uploads models and particle fields that were added to the scene since
    /// the last call, and refreshes particle uniforms of moved objects.
    pub fn sync_scene(&mut self, scene: &mut Scene) {
        for (_id, scene_model) in scene.models.iter_mut() {
            if scene_model.render_model.is_some() {
                continue;
            }

            let render_model = RenderModel::from_model(&self.device, &scene_model.model);
            scene_model.render_model = Some(self.render_models.alloc(render_model));
            log::info!(
                "Uploaded model {} with {} primitives",
                scene_model.name,
                scene_model.model.primitives.len()
            );
        }

        for (_, object) in scene.objects.iter() {
            let Drawable::Particles(field_id) = object.drawable else {
                continue;
            };
            let Some(field) = scene.particle_fields.get(field_id) else {
                continue;
            };

            let is_new = !self.particle_fields.contains_key(&field_id);
            let render_field = self.particle_fields.entry(field_id).or_insert_with(|| {
                RenderParticleField::new(&self.device, field, &self.points_pass.points_layout)
            });

            if is_new || object.transform.has_changed() {
                let model = *object.transform.get_world_matrix();
                render_field.update(&self.queue, PointsUniform::new(model, field));
            }
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_texture.resize(&self.device, new_size);
    }

    pub fn render(
        &mut self,
        demo_state: &DemoState,
        imgui_context: &mut imgui::Context,
    ) -> Result<(), wgpu::SurfaceError> {
        self.shader_loader.load_pending_shaders();

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(error) => {
                // The UI frame still has to be ended
                imgui_context.render();
                return Err(error);
            }
        };

        self.common.update(
            &self.queue,
            CameraUniform::from_camera(&demo_state.camera, demo_state.aspect_ratio()),
            GlobalUniformState::new(self.size, demo_state.frame.elapsed.as_secs_f32()),
        );

        let scene = &demo_state.scene;
        gather_instances(scene, &mut self.render_models);

        let visible_fields = scene.objects.iter().filter_map(|(_, object)| match object.drawable {
            Drawable::Particles(field_id) => self.particle_fields.get(&field_id),
            _ => None,
        });

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render encoder"),
            });

        let pipeline_cache = &self.shader_loader.cache;
        let views = MeshPassTextureViews {
            color: &view,
            depth: self.depth_texture.view(),
        };

        self.background_pass
            .render(&view, &mut encoder, pipeline_cache, &self.common);

        self.mesh_pass.render(
            &views,
            &mut encoder,
            pipeline_cache,
            &self.common,
            &self.queue,
            &self.render_models,
        );

        self.points_pass.render(
            &views,
            &mut encoder,
            pipeline_cache,
            &self.common,
            visible_fields,
        );

        self.imgui_renderer.render(
            &view,
            imgui_context,
            &self.device,
            &self.queue,
            &mut encoder,
        );

        self.queue.submit([encoder.finish()]);
        output.present();

        Ok(())
    }
}
