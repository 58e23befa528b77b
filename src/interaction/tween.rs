use std::time::Duration;

use glam::Vec3;

use crate::{
    interaction::easing,
    scene_graph::{ObjectId, Scene},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenProperty {
    Scale,
    Rotation,
}

/// Read/write access to the animatable attributes of scene objects.
pub trait Animatable {
    /// Current value, or `None` if the object does not exist.
    fn property(&self, object: ObjectId, property: TweenProperty) -> Option<Vec3>;

    fn set_property(&mut self, object: ObjectId, property: TweenProperty, value: Vec3);
}

impl Animatable for Scene {
    fn property(&self, object: ObjectId, property: TweenProperty) -> Option<Vec3> {
        let transform = self.get_object_transform(object)?;

        Some(match property {
            TweenProperty::Scale => transform.scale(),
            TweenProperty::Rotation => transform.rotation(),
        })
    }

    fn set_property(&mut self, object: ObjectId, property: TweenProperty, value: Vec3) {
        match property {
            TweenProperty::Scale => self.set_object_scale(object, value),
            TweenProperty::Rotation => self.set_object_rotation(object, value),
        }
    }
}

/// What happens to in-flight tweens when a new one starts on the same
/// object attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Both keep running; the newest one writes last each tick.
    #[default]
    Coexist,
    /// The older tween is dropped immediately.
    Supersede,
}

#[derive(Debug, Clone)]
pub struct Tween {
    pub target: ObjectId,
    pub property: TweenProperty,
    start: Vec3,
    end: Vec3,
    duration: Duration,
    elapsed: Duration,
}

impl Tween {
    pub fn new(
        target: ObjectId,
        property: TweenProperty,
        start: Vec3,
        end: Vec3,
        duration: Duration,
    ) -> Self {
        Self {
            target,
            property,
            start,
            end,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    pub fn value_at(&self, elapsed: Duration) -> Vec3 {
        if elapsed >= self.duration {
            return self.end;
        }

        if elapsed.is_zero() {
            return self.start;
        }

        let progress = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.start + (self.end - self.start) * easing::quadratic_out(progress)
    }

    pub fn value(&self) -> Vec3 {
        self.value_at(self.elapsed)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn advance(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta);
    }
}

/// Owns every in-flight tween and advances them once per frame.
pub struct TweenManager {
    tweens: Vec<Tween>,
    policy: OverlapPolicy,
}

impl TweenManager {
    pub fn new(policy: OverlapPolicy) -> Self {
        Self {
            tweens: Vec::new(),
            policy,
        }
    }

    pub fn start(&mut self, tween: Tween) {
        if self.policy == OverlapPolicy::Supersede {
            self.tweens
                .retain(|other| other.target != tween.target || other.property != tween.property);
        }

        self.tweens.push(tween);
    }

    /// Starts a tween from the attribute's current value. Returns `false`
    /// without starting anything if the object does not exist.
    pub fn animate(
        &mut self,
        scene: &impl Animatable,
        target: ObjectId,
        property: TweenProperty,
        end: Vec3,
        duration: Duration,
    ) -> bool {
        let Some(start) = scene.property(target, property) else {
            return false;
        };

        self.start(Tween::new(target, property, start, end, duration));
        true
    }

    /// Snaps the attribute to `start` and tweens it to `end`.
    pub fn animate_from(
        &mut self,
        scene: &mut impl Animatable,
        target: ObjectId,
        property: TweenProperty,
        start: Vec3,
        end: Vec3,
        duration: Duration,
    ) {
        scene.set_property(target, property, start);
        self.start(Tween::new(target, property, start, end, duration));
    }

    /// Advances all tweens by `delta`, writes their values in start order and
    /// drops the ones that finished.
    pub fn update(&mut self, scene: &mut impl Animatable, delta: Duration) {
        for tween in &mut self.tweens {
            tween.advance(delta);
            scene.set_property(tween.target, tween.property, tween.value());
        }

        self.tweens.retain(|tween| !tween.is_finished());
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tween> {
        self.tweens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::Object3D;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn scene_with_object() -> (Scene, ObjectId) {
        let mut scene = Scene::new();
        let id = scene.add_object(Object3D::named("target"));
        (scene, id)
    }

    #[test]
    fn samples_endpoints_exactly() {
        let (_, id) = scene_with_object();
        let start = Vec3::new(0.3, -0.7, 1.1);
        let end = Vec3::new(1.5, 0.1, -2.9);
        let tween = Tween::new(id, TweenProperty::Scale, start, end, ms(400));

        assert_eq!(tween.value_at(Duration::ZERO), start);
        assert_eq!(tween.value_at(ms(400)), end);
        assert_eq!(tween.value_at(ms(10_000)), end);
    }

    #[test]
    fn output_is_monotonic_per_component() {
        let (_, id) = scene_with_object();
        let tween = Tween::new(
            id,
            TweenProperty::Rotation,
            Vec3::ZERO,
            Vec3::new(0.15, 0.3, 0.05),
            ms(400),
        );

        let mut previous = tween.value_at(Duration::ZERO);
        for step in 1..=400 {
            let value = tween.value_at(ms(step));
            assert!(value.cmpge(previous).all(), "decreased at {} ms", step);
            previous = value;
        }
    }

    #[test]
    fn update_writes_back_and_finishes_on_end_value() {
        let (mut scene, id) = scene_with_object();
        let mut tweens = TweenManager::new(OverlapPolicy::Coexist);
        let end = Vec3::splat(1.5);

        assert!(tweens.animate(&scene, id, TweenProperty::Scale, end, ms(400)));

        // Deltas that don't add up to the duration evenly
        for _ in 0..23 {
            tweens.update(&mut scene, ms(17));
            let scale = scene.property(id, TweenProperty::Scale).unwrap();
            assert!(scale.cmpge(Vec3::ONE).all() && scale.cmple(end).all());
        }
        assert_eq!(tweens.len(), 1);

        tweens.update(&mut scene, ms(17));
        assert!(tweens.is_empty());
        assert_eq!(scene.property(id, TweenProperty::Scale), Some(end));
    }

    #[test]
    fn start_value_is_read_at_call_time() {
        let (mut scene, id) = scene_with_object();
        let mut tweens = TweenManager::new(OverlapPolicy::Coexist);
        scene.set_object_scale(id, Vec3::splat(1.2));

        tweens.animate(&scene, id, TweenProperty::Scale, Vec3::ONE, ms(400));

        assert_eq!(tweens.iter().next().unwrap().start(), Vec3::splat(1.2));
    }

    #[test]
    fn missing_object_starts_nothing() {
        let (scene, _) = scene_with_object();
        let mut other = Scene::new();
        other.add_object(Object3D::named("a"));
        let missing = other.add_object(Object3D::named("b"));
        let mut tweens = TweenManager::new(OverlapPolicy::Coexist);

        assert!(!tweens.animate(&scene, missing, TweenProperty::Scale, Vec3::ONE, ms(400)));
        assert!(tweens.is_empty());
    }

    #[test]
    fn overlapping_tweens_coexist_and_newest_writes_last() {
        let (mut scene, id) = scene_with_object();
        let mut tweens = TweenManager::new(OverlapPolicy::Coexist);

        tweens.start(Tween::new(id, TweenProperty::Scale, Vec3::ZERO, Vec3::splat(4.0), ms(1000)));
        tweens.start(Tween::new(id, TweenProperty::Scale, Vec3::ONE, Vec3::ONE, ms(400)));
        tweens.update(&mut scene, ms(100));

        assert_eq!(tweens.len(), 2);
        assert_eq!(scene.property(id, TweenProperty::Scale), Some(Vec3::ONE));

        // Once the newer one is done the older one takes over again
        tweens.update(&mut scene, ms(400));
        assert_eq!(tweens.len(), 1);
        tweens.update(&mut scene, ms(100));
        let scale = scene.property(id, TweenProperty::Scale).unwrap();
        assert!(scale.x > 1.0 && scale.x < 4.0);
    }

    #[test]
    fn supersede_drops_tween_on_same_attribute_only() {
        let (mut scene, id) = scene_with_object();
        let mut tweens = TweenManager::new(OverlapPolicy::Supersede);

        tweens.animate(&scene, id, TweenProperty::Scale, Vec3::splat(1.5), ms(400));
        tweens.animate(&scene, id, TweenProperty::Rotation, Vec3::ONE, ms(400));
        tweens.animate(&scene, id, TweenProperty::Scale, Vec3::ONE, ms(400));

        assert_eq!(tweens.len(), 2);
        tweens.update(&mut scene, ms(400));
        assert_eq!(scene.property(id, TweenProperty::Scale), Some(Vec3::ONE));
        assert_eq!(scene.property(id, TweenProperty::Rotation), Some(Vec3::ONE));
    }

    #[test]
    fn animate_from_snaps_to_start() {
        let (mut scene, id) = scene_with_object();
        let mut tweens = TweenManager::new(OverlapPolicy::Coexist);

        tweens.animate_from(&mut scene, id, TweenProperty::Scale, Vec3::ZERO, Vec3::ONE, ms(1500));

        assert_eq!(scene.property(id, TweenProperty::Scale), Some(Vec3::ZERO));
    }

    #[test]
    fn zero_duration_completes_on_first_update() {
        let (mut scene, id) = scene_with_object();
        let mut tweens = TweenManager::new(OverlapPolicy::Coexist);

        tweens.animate(&scene, id, TweenProperty::Rotation, Vec3::Y, Duration::ZERO);
        tweens.update(&mut scene, Duration::ZERO);

        assert!(tweens.is_empty());
        assert_eq!(scene.property(id, TweenProperty::Rotation), Some(Vec3::Y));
    }
}
