use std::{
    path::{Path, PathBuf},
    sync::mpsc::{self, TryRecvError},
    thread,
};

use anyhow::Context;

pub struct LoadedGltf {
    pub path: PathBuf,
    pub document: gltf::Document,
    pub buffers: Vec<gltf::buffer::Data>,
}

impl LoadedGltf {
    pub fn import(path: &Path) -> anyhow::Result<Self> {
        let (document, buffers, _images) =
            gltf::import(path).with_context(|| format!("Failed to import {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            document,
            buffers,
        })
    }

    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Model".to_string())
    }
}

/// Runs one load on a worker thread. `poll` yields its result exactly once.
pub struct AssetLoader<T> {
    name: String,
    receiver: Option<mpsc::Receiver<anyhow::Result<T>>>,
}

impl<T: Send + 'static> AssetLoader<T> {
    pub fn spawn<F>(name: impl Into<String>, load: F) -> anyhow::Result<Self>
    where
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        let name = name.into();
        let (sender, receiver) = mpsc::channel();

        thread::Builder::new()
            .name(format!("loader: {}", name))
            .spawn(move || {
                // The receiver may be gone if the app closed first
                let _ = sender.send(load());
            })
            .context("Failed to spawn loader thread")?;

        Ok(Self {
            name,
            receiver: Some(receiver),
        })
    }

    /// Non-blocking. `None` while pending and after the result was taken.
    pub fn poll(&mut self) -> Option<anyhow::Result<T>> {
        let receiver = self.receiver.as_ref()?;

        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                Err(anyhow::anyhow!("Loader for {} exited without a result", self.name))
            }
        };

        self.receiver = None;
        Some(result)
    }

    pub fn is_pending(&self) -> bool {
        self.receiver.is_some()
    }
}
