use std::{
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, channel},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::Context;
use id_arena::{Arena, Id};
use naga::{
    back::wgsl::WriterFlags,
    valid::{Capabilities, ValidationFlags},
};
use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
};
use notify_debouncer_mini::{
    new_debouncer_opt, notify::*, DebounceEventResult, DebouncedEventKind, Debouncer,
};
use pollster::block_on;
use wgpu::{PollType, RenderPipeline};

const SHADER_FOLDER: &str = "assets/shaders";
const SHARED_SHADER_MODULES_FOLDER: &str = "assets/shaders/shared";

pub type PipelineFactory = Box<
    dyn Sync
        + Send
        + Fn(&wgpu::Device, &ShaderDefinition, &str) -> anyhow::Result<wgpu::RenderPipeline>,
>;

#[derive(Debug, Clone)]
pub struct ShaderDefinition {
    pub name: &'static str,
    pub path: &'static str,
}

pub struct ShaderEntry {
    pipeline_id: PipelineId,
    def: ShaderDefinition,
    factory: PipelineFactory,
}

pub type PipelineId = Id<PipelineCacheEntry>;

#[derive(Default)]
pub struct PipelineCacheEntry(Option<wgpu::RenderPipeline>);

pub struct PipelineCacheBuilder {
    shaders: Arena<ShaderEntry>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCacheBuilder {
    pub fn new() -> Self {
        Self {
            shaders: Arena::new(),
            pipelines: Arena::new(),
        }
    }

    pub fn add_shader(&mut self, def: ShaderDefinition, factory: PipelineFactory) -> PipelineId {
        let pipeline_id = self.pipelines.alloc(PipelineCacheEntry::default());
        self.shaders.alloc(ShaderEntry {
            pipeline_id,
            def,
            factory,
        });
        pipeline_id
    }

    fn build(self) -> PipelineCache {
        PipelineCache {
            shaders: Arc::new(self.shaders),
            pipelines: self.pipelines,
        }
    }
}

pub struct PipelineCache {
    shaders: Arc<Arena<ShaderEntry>>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCache {
    /// `None` only if the pipeline never compiled.
    pub fn get(&self, id: PipelineId) -> Option<&RenderPipeline> {
        self.pipelines.get(id).and_then(|entry| entry.0.as_ref())
    }

    fn set(&mut self, id: PipelineId, pipeline: RenderPipeline) {
        if let Some(entry) = self.pipelines.get_mut(id) {
            entry.0 = Some(pipeline);
        }
    }
}

type CompiledPipeline = (&'static str, PipelineId, wgpu::RenderPipeline);

/// Compiles every registered shader up front, and optionally recompiles
/// shaders on a watcher thread when their files change.
pub struct ShaderLoader {
    pub cache: PipelineCache,
    receiver: Option<mpsc::Receiver<CompiledPipeline>>,
    _debouncer: Option<Debouncer<RecommendedWatcher>>,
}

impl ShaderLoader {
    pub fn new(
        device: &wgpu::Device,
        cache_builder: PipelineCacheBuilder,
        hot_reload: bool,
    ) -> anyhow::Result<Self> {
        let mut cache = cache_builder.build();
        let composer = Arc::new(Mutex::new(
            create_composer().context("Failed to create shader composer")?,
        ));

        let shaders = cache.shaders.clone();
        for (_, shader) in shaders.iter() {
            let pipeline = compile_file(device, &shader.def, &shader.factory, &composer)
                .with_context(|| format!("Failed to compile shader: {}", shader.def.name))?;
            cache.set(shader.pipeline_id, pipeline);
        }

        let (receiver, debouncer) = if hot_reload {
            let (sender, receiver) = channel();
            let debouncer = watch_shaders(device.clone(), shaders, composer, sender)?;
            (Some(receiver), Some(debouncer))
        } else {
            (None, None)
        };

        Ok(Self {
            cache,
            receiver,
            _debouncer: debouncer,
        })
    }

    /// Swaps in pipelines the watcher has rebuilt since the last call.
    pub fn load_pending_shaders(&mut self) {
        let Some(receiver) = &self.receiver else {
            return;
        };

        while let Ok((name, pipeline_id, pipeline)) = receiver.try_recv() {
            log::info!("Shader reloaded: {}", name);
            self.cache.set(pipeline_id, pipeline);
        }
    }
}

fn watch_shaders(
    device: wgpu::Device,
    shaders: Arc<Arena<ShaderEntry>>,
    composer: Arc<Mutex<Composer>>,
    sender: mpsc::Sender<CompiledPipeline>,
) -> anyhow::Result<Debouncer<RecommendedWatcher>> {
    let mut debouncer = new_debouncer_opt(
        notify_debouncer_mini::Config::default().with_timeout(Duration::from_millis(100)),
        move |res: DebounceEventResult| match res {
            Ok(events) => {
                for event in events {
                    if event.kind != DebouncedEventKind::Any {
                        continue;
                    }

                    // Shared modules are only read at startup
                    let Some(entry) = shaders
                        .iter()
                        .map(|(_, entry)| entry)
                        .find(|entry| event.path.ends_with(entry.def.path))
                    else {
                        continue;
                    };

                    match compile_file(&device, &entry.def, &entry.factory, &composer) {
                        Ok(pipeline) => {
                            // The loader is gone if the renderer was dropped
                            let _ = sender.send((entry.def.name, entry.pipeline_id, pipeline));
                        }
                        Err(e) => log::error!("Failed to reload shader: {:#}", e),
                    }
                }
            }
            Err(e) => log::error!("Error debouncing shader changes: {}", e),
        },
    )
    .context("Failed to create shader watcher")?;

    let absolute_shader_folder = Path::new(SHADER_FOLDER)
        .canonicalize()
        .with_context(|| format!("Shader folder {} not found", SHADER_FOLDER))?;

    debouncer
        .watcher()
        .watch(&absolute_shader_folder, RecursiveMode::Recursive)
        .context("Failed to watch shader folder")?;

    log::info!("Watching {} for changes", absolute_shader_folder.display());

    Ok(debouncer)
}

fn compile_file(
    device: &wgpu::Device,
    shader_def: &ShaderDefinition,
    factory: &PipelineFactory,
    composer: &Mutex<Composer>,
) -> anyhow::Result<wgpu::RenderPipeline> {
    let path = Path::new(SHADER_FOLDER).join(shader_def.path);
    let shader_code = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read shader file {}", path.display()))?;

    let file_path = path.to_string_lossy().to_string();

    let module = {
        let mut composer = composer
            .lock()
            .map_err(|_| anyhow::anyhow!("Shader composer lock poisoned"))?;

        composer
            .make_naga_module(NagaModuleDescriptor {
                file_path: &file_path,
                source: &shader_code,
                ..Default::default()
            })
            .map_err(|e| anyhow::anyhow!("{}", e.emit_to_string(&composer)))
            .context("Failed to create Naga module from shader code")?
    };

    // We don't need to validate, because wgpu runs the validator internally.
    let info = naga::valid::Validator::new(ValidationFlags::empty(), Capabilities::all())
        .validate(&module)
        .context("Failed to validate Naga module")?;

    let shader_code = naga::back::wgsl::write_string(&module, &info, WriterFlags::empty())
        .context("Failed to convert Naga module to WGSL string")?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let pipeline = factory(device, shader_def, &shader_code);

    device
        .poll(PollType::Wait)
        .context("Failed to poll device after shader compilation")?;

    if let Some(error) = block_on(device.pop_error_scope()) {
        anyhow::bail!("Shader compilation failed for {}: {}", shader_def.name, error);
    }

    pipeline
}

fn shared_module_paths() -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(SHARED_SHADER_MODULES_FOLDER)
        .with_context(|| format!("Failed to read {}", SHARED_SHADER_MODULES_FOLDER))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "wgsl") {
            paths.push(path);
        }
    }

    paths.sort();
    Ok(paths)
}

fn create_composer() -> anyhow::Result<Composer> {
    let mut composer = Composer::default();

    for path in shared_module_paths()? {
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let file_path = path.to_string_lossy().to_string();

        let result = composer
            .add_composable_module(ComposableModuleDescriptor {
                source: &source,
                file_path: &file_path,
                language: ShaderLanguage::Wgsl,
                ..Default::default()
            })
            .map(|_| ());

        if let Err(e) = result {
            anyhow::bail!(
                "Failed to add shared shader module {}: {}",
                file_path,
                e.emit_to_string(&composer)
            );
        }
    }

    Ok(composer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_modules_compose() {
        let composer = create_composer().unwrap();

        assert!(composer.contains_module("lightning::frame"));
    }

    #[test]
    fn every_shader_composes() {
        let composer = Mutex::new(create_composer().unwrap());

        for path in ["background.wgsl", "gold_mesh.wgsl", "particles.wgsl"] {
            let path = Path::new(SHADER_FOLDER).join(path);
            let source = std::fs::read_to_string(&path).unwrap();
            let file_path = path.to_string_lossy().to_string();

            let mut composer = composer.lock().unwrap();
            let result = composer.make_naga_module(NagaModuleDescriptor {
                file_path: &file_path,
                source: &source,
                ..Default::default()
            });

            if let Err(e) = result {
                panic!("{}", e.emit_to_string(&composer));
            }
        }
    }
}
