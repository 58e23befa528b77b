use id_arena::Id;

use crate::{model::Model, particles::ParticleField, rendering::render_model::RenderModelId};

pub type SceneModelId = Id<SceneModel>;
pub type ParticleFieldId = Id<ParticleField>;

pub struct SceneModel {
    pub name: String,
    pub model: Model,
    // Filled in by the renderer once GPU buffers exist
    pub render_model: Option<RenderModelId>,
}

impl SceneModel {
    pub fn new(name: String, model: Model) -> Self {
        Self {
            name,
            model,
            render_model: None,
        }
    }
}
