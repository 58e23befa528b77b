use glam::Vec3;
use id_arena::Id;

use crate::scene_graph::scene_model::{ParticleFieldId, SceneModelId};
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

/// What, if anything, the renderer draws for an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Drawable {
    #[default]
    Empty,
    Mesh(SceneModelId),
    Particles(ParticleFieldId),
}

pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    pub drawable: Drawable,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
}

impl Object3D {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_drawable(mut self, drawable: Drawable) -> Self {
        self.drawable = drawable;
        self
    }

    pub fn model_id(&self) -> Option<SceneModelId> {
        match self.drawable {
            Drawable::Mesh(id) => Some(id),
            _ => None,
        }
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::from_translation(Vec3::ZERO),
            drawable: Drawable::Empty,
            parent_id: None,
            child_ids: Vec::new(),
        }
    }
}
