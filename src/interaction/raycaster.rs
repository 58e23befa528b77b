use glam::{Mat4, Vec2};
use rayon::prelude::*;

use crate::{
    camera::Camera,
    math::ray::Ray,
    scene_graph::{ObjectId, Scene},
};

/// Answers whether the pointer, given in normalized device coordinates, is
/// over an object or any of its descendants.
pub trait PointerPicker {
    fn hits(&self, scene: &Scene, object: ObjectId, ndc: Vec2) -> bool;
}

/// Casts camera rays against mesh triangles. World matrices must be current,
/// i.e. `Scene::late_update` has run since the last transform change.
pub struct Raycaster {
    inverse_view_projection: Mat4,
}

impl Raycaster {
    pub fn new(view_projection: Mat4) -> Self {
        Self {
            inverse_view_projection: view_projection.inverse(),
        }
    }

    pub fn from_camera(camera: &Camera, aspect_ratio: f32) -> Self {
        Self::new(camera.view_projection(aspect_ratio))
    }

    pub fn ray(&self, ndc: Vec2) -> Ray {
        Ray::from_ndc(ndc, &self.inverse_view_projection)
    }

    /// Distance to the nearest triangle hit under `root`, inclusive.
    pub fn intersect_object(&self, scene: &Scene, root: ObjectId, ray: &Ray) -> Option<f32> {
        scene
            .meshes_under(root)
            .filter_map(|(object_id, model_id)| {
                let transform = scene.get_object_transform(object_id)?;
                // Singular transforms (zero scale) cannot be hit
                let inverse_world = transform.get_inverse_world_matrix()?;
                let model = &scene.models.get(model_id)?.model;
                let local_ray = ray.transform(&inverse_world);

                model.bounds.intersect_ray(&local_ray)?;

                model
                    .primitives
                    .iter()
                    .filter_map(|primitive| {
                        (0..primitive.triangle_count())
                            .into_par_iter()
                            .filter_map(|face| local_ray.intersect_triangle(primitive.triangle(face)))
                            .min_by(|a, b| a.total_cmp(b))
                    })
                    .min_by(|a, b| a.total_cmp(b))
            })
            .min_by(|a, b| a.total_cmp(b))
    }
}

impl PointerPicker for Raycaster {
    fn hits(&self, scene: &Scene, object: ObjectId, ndc: Vec2) -> bool {
        let ray = self.ray(ndc);
        self.intersect_object(scene, object, &ray).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::test_meshes,
        scene_graph::{scene_model::SceneModel, Drawable, Object3D},
    };
    use glam::Vec3;

    fn camera() -> Camera {
        Camera {
            eye: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 2000.0,
        }
    }

    /// A group containing a unit cube, like an imported glTF scene.
    fn scene_with_cube() -> (Scene, ObjectId, ObjectId) {
        let mut scene = Scene::new();
        let model = scene.add_model(SceneModel::new("cube".into(), test_meshes::cube(1.0)));
        let group = scene.add_object(Object3D::named("group"));
        let cube = scene.add_child(
            group,
            Object3D::named("cube").with_drawable(Drawable::Mesh(model)),
        );
        scene.late_update();
        (scene, group, cube)
    }

    #[test]
    fn centre_ray_hits_cube_through_parent() {
        let (scene, group, _) = scene_with_cube();
        let raycaster = Raycaster::from_camera(&camera(), 1.0);

        assert!(raycaster.hits(&scene, group, Vec2::ZERO));

        let distance = raycaster
            .intersect_object(&scene, group, &raycaster.ray(Vec2::ZERO))
            .unwrap();
        // Near plane to the cube's front face
        assert!((distance - 2.4).abs() < 1e-3);
    }

    #[test]
    fn corner_ray_misses() {
        let (scene, group, _) = scene_with_cube();
        let raycaster = Raycaster::from_camera(&camera(), 1.0);

        assert!(!raycaster.hits(&scene, group, Vec2::new(0.95, 0.95)));
        assert!(!raycaster.hits(&scene, group, Vec2::new(-5.0, 3.0)));
    }

    #[test]
    fn scaling_the_group_grows_the_hit_area() {
        let (mut scene, group, _) = scene_with_cube();
        let raycaster = Raycaster::from_camera(&camera(), 1.0);
        let ndc = Vec2::new(0.4, 0.0);

        assert!(!raycaster.hits(&scene, group, ndc));

        scene.set_object_scale(group, Vec3::splat(1.5));
        scene.late_update();

        assert!(raycaster.hits(&scene, group, ndc));
    }

    #[test]
    fn tiny_but_invertible_scale_is_hit() {
        let (mut scene, group, _) = scene_with_cube();
        let raycaster = Raycaster::from_camera(&camera(), 1.0);

        // Determinant 6.4e-8, below f32::EPSILON
        scene.set_object_scale(group, Vec3::splat(0.004));
        scene.late_update();

        assert!(raycaster.hits(&scene, group, Vec2::ZERO));
        assert!(!raycaster.hits(&scene, group, Vec2::new(0.4, 0.0)));
    }

    #[test]
    fn zero_scale_is_never_hit() {
        let (mut scene, group, _) = scene_with_cube();
        let raycaster = Raycaster::from_camera(&camera(), 1.0);

        scene.set_object_scale(group, Vec3::ZERO);
        scene.late_update();

        assert!(!raycaster.hits(&scene, group, Vec2::ZERO));
    }

    #[test]
    fn objects_without_meshes_are_never_hit() {
        let mut scene = Scene::new();
        let empty = scene.add_object(Object3D::named("empty"));
        scene.late_update();
        let raycaster = Raycaster::from_camera(&camera(), 1.0);

        assert!(!raycaster.hits(&scene, empty, Vec2::ZERO));
    }
}
