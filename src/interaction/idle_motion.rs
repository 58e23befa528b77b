use std::{f32::consts::TAU, time::Duration};

use glam::Vec3;

use crate::{
    interaction::tween::{Animatable, TweenProperty},
    scene_graph::ObjectId,
};

/// Spins one object around its Y axis at a constant rate of wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct IdleMotion {
    object: ObjectId,
    angular_speed: f32,
}

impl IdleMotion {
    pub fn new(object: ObjectId, angular_speed: f32) -> Self {
        Self {
            object,
            angular_speed,
        }
    }

    /// Angle in [0, 2π) after `elapsed` time. Depends only on elapsed time,
    /// never on how many frames were rendered.
    pub fn angle_at(&self, elapsed: Duration) -> f32 {
        (elapsed.as_secs_f64() * self.angular_speed as f64).rem_euclid(TAU as f64) as f32
    }

    /// Overwrites the Y rotation, keeping X and Z.
    pub fn apply(&self, scene: &mut impl Animatable, elapsed: Duration) {
        let Some(rotation) = scene.property(self.object, TweenProperty::Rotation) else {
            return;
        };

        let angle = self.angle_at(elapsed);
        scene.set_property(
            self.object,
            TweenProperty::Rotation,
            Vec3::new(rotation.x, angle, rotation.z),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::{Object3D, Scene};

    #[test]
    fn angle_is_elapsed_times_speed() {
        let mut scene = Scene::new();
        let group = scene.add_object(Object3D::named("group"));
        let motion = IdleMotion::new(group, 0.01);

        assert_eq!(motion.angle_at(Duration::ZERO), 0.0);
        assert!((motion.angle_at(Duration::from_secs(30)) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn angle_wraps_into_full_turn() {
        let mut scene = Scene::new();
        let group = scene.add_object(Object3D::named("group"));
        let motion = IdleMotion::new(group, 1.0);

        let angle = motion.angle_at(Duration::from_secs_f32(TAU + 0.5));
        assert!((angle - 0.5).abs() < 1e-4);
    }

    #[test]
    fn result_is_independent_of_frame_rate() {
        let mut at_30 = Scene::new();
        let mut at_60 = Scene::new();
        let group_30 = at_30.add_object(Object3D::named("group"));
        let group_60 = at_60.add_object(Object3D::named("group"));
        let motion_30 = IdleMotion::new(group_30, 0.01);
        let motion_60 = IdleMotion::new(group_60, 0.01);

        for frame in 1..=300u32 {
            motion_30.apply(&mut at_30, Duration::from_secs(10) * frame / 300);
        }
        for frame in 1..=600u32 {
            motion_60.apply(&mut at_60, Duration::from_secs(10) * frame / 600);
        }

        assert_eq!(
            at_30.property(group_30, TweenProperty::Rotation),
            at_60.property(group_60, TweenProperty::Rotation)
        );
    }

    #[test]
    fn keeps_other_axes() {
        let mut scene = Scene::new();
        let group = scene.add_object(Object3D::named("group"));
        scene.set_object_rotation(group, Vec3::new(1.0, 5.0, -1.0));

        IdleMotion::new(group, 0.5).apply(&mut scene, Duration::from_secs(2));

        assert_eq!(
            scene.property(group, TweenProperty::Rotation),
            Some(Vec3::new(1.0, 1.0, -1.0))
        );
    }
}
