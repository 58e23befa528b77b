use anyhow::Context;
use glam::{EulerRot, Mat4, Quat, Vec3};
use id_arena::Arena;
use std::collections::HashMap;

use crate::model::{Buffers, Model};
use crate::particles::ParticleField;
use crate::scene_graph::object3d::{Drawable, Object3D, ObjectId};
use crate::scene_graph::scene_model::{ParticleFieldId, SceneModel, SceneModelId};
use crate::scene_graph::transform::Transform;

pub struct Scene {
    pub objects: Arena<Object3D>,
    pub models: Arena<SceneModel>,
    pub particle_fields: Arena<ParticleField>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            models: Arena::new(),
            particle_fields: Arena::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    pub fn add_child(&mut self, parent: ObjectId, object: Object3D) -> ObjectId {
        let id = self.add_object(object);
        self.set_object_parent(id, Some(parent));
        id
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn add_model(&mut self, model: SceneModel) -> SceneModelId {
        self.models.alloc(model)
    }

    pub fn add_particle_field(&mut self, field: ParticleField) -> ParticleFieldId {
        self.particle_fields.alloc(field)
    }

    /// Spawns every node of a glTF scene under a new group object named `name`
    /// and returns the group.
    pub fn spawn_gltf_scene(
        &mut self,
        name: &str,
        buffers: Buffers,
        scene: &gltf::Scene,
    ) -> anyhow::Result<ObjectId> {
        let root = self.add_object(Object3D::named(name));
        let mut mesh_to_model = HashMap::new();

        for node in scene.nodes() {
            self.spawn_gltf_node(buffers, &node, root, &mut mesh_to_model)?;
        }

        Ok(root)
    }

    fn spawn_gltf_node(
        &mut self,
        buffers: Buffers,
        node: &gltf::Node,
        parent: ObjectId,
        mesh_to_model: &mut HashMap<usize, SceneModelId>,
    ) -> anyhow::Result<ObjectId> {
        let node_name = node.name().unwrap_or("Unnamed").to_string();
        let mut object = Object3D::named(node_name.clone());
        let (translation, rotation, scale) = node.transform().decomposed();
        let (x, y, z) = Quat::from_array(rotation).to_euler(EulerRot::XYZ);

        object
            .transform
            .set_transform(translation.into(), Vec3::new(x, y, z), scale.into());

        if let Some(mesh) = node.mesh() {
            let mesh_index = mesh.index();

            let model_id = match mesh_to_model.get(&mesh_index).copied() {
                Some(model_id) => model_id,
                None => {
                    let mesh_name = mesh
                        .name()
                        .map(String::from)
                        .unwrap_or_else(|| format!("{} (Mesh)", node_name));

                    let model = Model::from_gltf(mesh_name.clone(), mesh, buffers)
                        .with_context(|| format!("Failed to import mesh {}", mesh_name))?;
                    let model_id = self.add_model(SceneModel::new(mesh_name, model));
                    mesh_to_model.insert(mesh_index, model_id);

                    model_id
                }
            };

            object.drawable = Drawable::Mesh(model_id);
        }

        let object_id = self.add_child(parent, object);

        for child in node.children() {
            self.spawn_gltf_node(buffers, &child, object_id, mesh_to_model)?;
        }

        Ok(object_id)
    }

    /// Depth-first list of `root` and all of its descendants, `root` first.
    pub fn descendants(&self, root: ObjectId) -> Vec<ObjectId> {
        let mut result = Vec::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            let Some(object) = self.objects.get(id) else {
                continue;
            };

            result.push(id);
            stack.extend(object.child_ids.iter().rev().copied());
        }

        result
    }

    /// Objects under `root` (inclusive) that draw a mesh.
    pub fn meshes_under(&self, root: ObjectId) -> impl Iterator<Item = (ObjectId, SceneModelId)> + '_ {
        self.descendants(root).into_iter().filter_map(move |id| {
            self.objects
                .get(id)
                .and_then(|object| object.model_id())
                .map(|model_id| (id, model_id))
        })
    }

    /// Updates all object transforms in hierarchical order
    fn update_transforms(&self) {
        let root_objects = self.objects.iter().filter_map(|(id, object)| {
            if object.parent_id.is_none() {
                Some(id)
            } else {
                None
            }
        });

        for root_id in root_objects {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY);
        }
    }

    fn update_object_transform_recursive(&self, object_id: ObjectId, parent_world_matrix: Mat4) {
        if let Some(object) = self.objects.get(object_id) {
            if object.transform.is_world_dirty() {
                let local_matrix = *object.transform.get_local_matrix();
                let world_matrix = parent_world_matrix * local_matrix;
                object.transform.set_world_matrix(world_matrix);
            }

            let world_matrix = *object.transform.get_world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix);
            }
        }
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(child) = self.objects.get(child_id) {
            if let Some(old_parent_id) = child.parent_id {
                if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                    old_parent.child_ids.retain(|&id| id != child_id);
                }
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.objects.get_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }

        self.invalidate_object_hierarchy(child_id);
    }

    pub fn set_object_rotation(&mut self, object_id: ObjectId, rotation: Vec3) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_rotation(rotation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_scale(&mut self, object_id: ObjectId, scale: Vec3) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_scale(scale);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.objects.get(object_id).map(|object| &object.transform)
    }

    pub fn early_update(&mut self) {
        for (_, object) in self.objects.iter() {
            object.transform.reset_flags();
        }
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }
}
