use anyhow::Context;
use glam::{Vec2, Vec3};

use crate::{
    asset_loader::{AssetLoader, LoadedGltf},
    camera::Camera,
    config::SceneConfig,
    interaction::{
        clock::{FrameClock, FrameTime},
        idle_motion::IdleMotion,
        raycaster::Raycaster,
        tween::TweenProperty,
        InteractionController,
    },
    orbit_controls::OrbitControls,
    particles::ParticleField,
    scene_graph::{Drawable, Object3D, Scene},
};

pub struct DemoState {
    pub config: SceneConfig,
    pub camera: Camera,
    pub orbit_controls: OrbitControls,
    pub clock: FrameClock,
    pub frame: FrameTime,
    pub scene: Scene,
    pub interaction: InteractionController,
    pub viewport: Vec2,
    target_loader: AssetLoader<LoadedGltf>,
}

impl DemoState {
    pub fn new(config: SceneConfig) -> anyhow::Result<Self> {
        let camera = Camera::from_config(&config.camera);
        let orbit_controls = OrbitControls::new(config.orbit.clone());
        let mut scene = Scene::new();
        let mut interaction = InteractionController::new(&config);

        let field = ParticleField::generate(&mut rand::thread_rng(), &config.particles);
        log::info!("Generated {} particles", field.len());
        let field_id = scene.add_particle_field(field);
        let particle_group = scene.add_object(Object3D::named("Lightnings"));
        let particles = scene.add_child(
            particle_group,
            Object3D::named("Lightning particles").with_drawable(Drawable::Particles(field_id)),
        );

        let appearance = &config.appearance;
        interaction.play_appearance(
            &mut scene,
            particles,
            TweenProperty::Scale,
            Vec3::splat(appearance.particle_scale),
            appearance.particle_scale_duration,
        );
        interaction.play_appearance(
            &mut scene,
            particle_group,
            TweenProperty::Rotation,
            Vec3::splat(appearance.particle_group_rotation),
            appearance.particle_group_rotation_duration,
        );
        interaction.set_idle_motion(IdleMotion::new(particle_group, config.idle.angular_speed));

        let model_path = config.assets.resolve(&config.assets.model);
        log::info!("Loading {}", model_path.display());
        let target_loader = AssetLoader::spawn("interaction target", move || {
            LoadedGltf::import(&model_path)
        })?;

        Ok(Self {
            config,
            camera,
            orbit_controls,
            clock: FrameClock::new(),
            frame: FrameTime::default(),
            scene,
            interaction,
            viewport: Vec2::ONE,
            target_loader,
        })
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.x / self.viewport.y.max(1.0)
    }

    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    pub fn on_pointer_move(&mut self, position: Vec2) {
        let raycaster = Raycaster::from_camera(&self.camera, self.aspect_ratio());
        self.interaction
            .on_pointer_move(&self.scene, &raycaster, position, self.viewport);
    }

    fn poll_loads(&mut self) {
        let Some(result) = self.target_loader.poll() else {
            return;
        };

        if let Err(error) = result.and_then(|loaded| self.spawn_target(loaded)) {
            // The scene keeps running without a hover target
            log::error!("{:#}", error);
        }
    }

    fn spawn_target(&mut self, loaded: LoadedGltf) -> anyhow::Result<()> {
        let gltf_scene = loaded
            .document
            .default_scene()
            .or_else(|| loaded.document.scenes().next())
            .context("No scenes in gltf")?;

        let root = self
            .scene
            .spawn_gltf_scene(&loaded.file_stem(), &loaded.buffers, &gltf_scene)?;

        let mesh_count = self.scene.meshes_under(root).count();
        log::info!(
            "Loaded {} with {} meshes",
            loaded.path.display(),
            mesh_count
        );

        self.interaction.on_target_loaded(&mut self.scene, root);
        Ok(())
    }

    /// Idle motion, tweens and camera. Runs once per frame before rendering.
    pub fn update(&mut self) {
        self.frame = self.clock.tick();
        self.poll_loads();
        self.interaction.update(&mut self.scene, self.frame);
        self.orbit_controls.update(&mut self.camera);
    }

    pub fn draw_ui(&self, ui: &imgui::Ui) {
        ui.window("Lightning field").build(|| {
            let delta = self.frame.delta.as_secs_f32();
            let fps = if delta > 0.0 { 1.0 / delta } else { 0.0 };

            ui.text(format!("Frame time: {:.2} ms ({:.0} fps)", delta * 1000.0, fps));
            let target = if self.interaction.target().is_some() {
                "loaded"
            } else if self.target_loader.is_pending() {
                "loading"
            } else {
                "unavailable"
            };
            ui.text(format!("Target: {}", target));
            ui.text(format!("Hover: {:?}", self.interaction.hover_state()));

            let tweens = self.interaction.tweens();
            if tweens.is_empty() {
                ui.text("Tweens: none");
            } else {
                ui.text(format!("Tweens: {}", tweens.len()));
                for tween in tweens.iter() {
                    ui.bullet_text(format!(
                        "{:?} {} -> {}",
                        tween.property,
                        tween.start(),
                        tween.end()
                    ));
                }
            }
            ui.separator();
            ui.text(format!(
                "Camera distance: {:.2}",
                self.camera.distance_to_target()
            ));
        });
    }
}
