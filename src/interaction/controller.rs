use std::time::Duration;

use glam::{Vec2, Vec3};

use crate::{
    config::{AppearanceConfig, HoverConfig, SceneConfig},
    interaction::{
        clock::FrameTime,
        hover::{HoverState, HoverTracker, HoverTransition},
        idle_motion::IdleMotion,
        pointer::to_normalized_device_coordinates,
        raycaster::PointerPicker,
        tween::{TweenManager, TweenProperty},
    },
    scene_graph::{ObjectId, Scene},
};

/// Drives the hover animation of the interaction target and the ambient
/// motion of the scene. Every target-dependent operation is a no-op until
/// `on_target_loaded` has been called.
pub struct InteractionController {
    hover_config: HoverConfig,
    appearance: AppearanceConfig,
    target: Option<ObjectId>,
    hover: HoverTracker,
    tweens: TweenManager,
    idle_motion: Option<IdleMotion>,
}

impl InteractionController {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            hover_config: config.hover.clone(),
            appearance: config.appearance.clone(),
            target: None,
            hover: HoverTracker::default(),
            tweens: TweenManager::new(config.overlap_policy),
            idle_motion: None,
        }
    }

    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    pub fn hover_state(&self) -> HoverState {
        self.hover.state()
    }

    pub fn tweens(&self) -> &TweenManager {
        &self.tweens
    }

    pub fn set_idle_motion(&mut self, motion: IdleMotion) {
        self.idle_motion = Some(motion);
    }

    /// Makes `object` appear by tweening one of its attributes up from zero.
    pub fn play_appearance(
        &mut self,
        scene: &mut Scene,
        object: ObjectId,
        property: TweenProperty,
        end: Vec3,
        duration: Duration,
    ) {
        self.tweens
            .animate_from(scene, object, property, Vec3::ZERO, end, duration);
    }

    pub fn on_target_loaded(&mut self, scene: &mut Scene, target: ObjectId) {
        self.target = Some(target);

        let scale = Vec3::splat(self.appearance.target_scale);
        let duration = self.appearance.target_scale_duration;
        self.play_appearance(scene, target, TweenProperty::Scale, scale, duration);
    }

    /// Handles a pointer move to `position` pixels in a `viewport` sized
    /// window. Returns the hover transition this move caused, if any.
    pub fn on_pointer_move(
        &mut self,
        scene: &Scene,
        picker: &impl PointerPicker,
        position: Vec2,
        viewport: Vec2,
    ) -> Option<HoverTransition> {
        let target = self.target?;
        let ndc = to_normalized_device_coordinates(position, viewport);
        let hit = picker.hits(scene, target, ndc);

        let transition = self.hover.update(hit)?;
        log::debug!("Hover {:?} at {}", transition, ndc);

        let (scale, rotation) = match transition {
            HoverTransition::Enter => (self.hover_config.enter_scale, self.hover_config.enter_rotation),
            HoverTransition::Exit => (self.hover_config.exit_scale, self.hover_config.exit_rotation),
        };

        let duration = self.hover_config.duration;
        self.tweens
            .animate(scene, target, TweenProperty::Scale, scale, duration);
        self.tweens
            .animate(scene, target, TweenProperty::Rotation, rotation, duration);

        Some(transition)
    }

    /// Per-frame update: idle motion first, then tweens, so tweens win when
    /// both write the same attribute.
    pub fn update(&mut self, scene: &mut Scene, frame: FrameTime) {
        if let Some(idle_motion) = &self.idle_motion {
            idle_motion.apply(scene, frame.elapsed);
        }

        self.tweens.update(scene, frame.delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{interaction::tween::Animatable, scene_graph::Object3D};
    use std::cell::Cell;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    /// Reports a scripted hit result and counts queries.
    #[derive(Default)]
    struct StubPicker {
        hit: Cell<bool>,
        queries: Cell<usize>,
    }

    impl StubPicker {
        fn set_hit(&self, hit: bool) {
            self.hit.set(hit);
        }
    }

    impl PointerPicker for StubPicker {
        fn hits(&self, _scene: &Scene, _object: ObjectId, _ndc: Vec2) -> bool {
            self.queries.set(self.queries.get() + 1);
            self.hit.get()
        }
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn advance(controller: &mut InteractionController, scene: &mut Scene, delta: Duration) {
        let frame = FrameTime {
            elapsed: Duration::ZERO,
            delta,
        };
        controller.update(scene, frame);
    }

    /// Controller with a loaded target whose grow-in animation has finished.
    fn loaded() -> (InteractionController, Scene, ObjectId) {
        let mut scene = Scene::new();
        let target = scene.add_object(Object3D::named("target"));
        let mut controller = InteractionController::new(&SceneConfig::default());

        controller.on_target_loaded(&mut scene, target);
        advance(&mut controller, &mut scene, ms(1500));
        assert!(controller.tweens().is_empty());

        (controller, scene, target)
    }

    fn move_pointer(
        controller: &mut InteractionController,
        scene: &Scene,
        picker: &StubPicker,
    ) -> Option<HoverTransition> {
        controller.on_pointer_move(scene, picker, Vec2::new(400.0, 300.0), VIEWPORT)
    }

    #[test]
    fn target_grows_in_on_load() {
        let mut scene = Scene::new();
        let target = scene.add_object(Object3D::named("target"));
        let mut controller = InteractionController::new(&SceneConfig::default());

        controller.on_target_loaded(&mut scene, target);
        assert_eq!(controller.target(), Some(target));
        assert_eq!(scene.property(target, TweenProperty::Scale), Some(Vec3::ZERO));

        advance(&mut controller, &mut scene, ms(750));
        let halfway = scene.property(target, TweenProperty::Scale).unwrap();
        assert!(halfway.x > 0.5 && halfway.x < 1.0);

        advance(&mut controller, &mut scene, ms(750));
        assert_eq!(scene.property(target, TweenProperty::Scale), Some(Vec3::ONE));
    }

    #[test]
    fn nothing_happens_before_load() {
        let mut scene = Scene::new();
        let object = scene.add_object(Object3D::named("object"));
        let mut controller = InteractionController::new(&SceneConfig::default());
        let picker = StubPicker::default();
        picker.set_hit(true);

        for _ in 0..5 {
            assert_eq!(move_pointer(&mut controller, &scene, &picker), None);
            advance(&mut controller, &mut scene, ms(16));
        }

        assert_eq!(picker.queries.get(), 0);
        assert!(controller.tweens().is_empty());
        assert_eq!(controller.hover_state(), HoverState::Idle);
        assert_eq!(scene.property(object, TweenProperty::Scale), Some(Vec3::ONE));
    }

    #[test]
    fn entering_animates_to_hover_pose() {
        let (mut controller, mut scene, target) = loaded();
        let picker = StubPicker::default();
        picker.set_hit(true);

        assert_eq!(
            move_pointer(&mut controller, &scene, &picker),
            Some(HoverTransition::Enter)
        );
        assert_eq!(controller.hover_state(), HoverState::Hovering);
        assert_eq!(controller.tweens().len(), 2);

        advance(&mut controller, &mut scene, ms(400));

        assert_eq!(scene.property(target, TweenProperty::Scale), Some(Vec3::splat(1.5)));
        assert_eq!(
            scene.property(target, TweenProperty::Rotation),
            Some(Vec3::new(0.15, 0.3, 0.05))
        );
        assert!(controller.tweens().is_empty());
    }

    #[test]
    fn leaving_animates_back_to_rest_pose() {
        let (mut controller, mut scene, target) = loaded();
        let picker = StubPicker::default();
        picker.set_hit(true);
        move_pointer(&mut controller, &scene, &picker);
        advance(&mut controller, &mut scene, ms(400));

        picker.set_hit(false);
        assert_eq!(
            move_pointer(&mut controller, &scene, &picker),
            Some(HoverTransition::Exit)
        );
        assert_eq!(controller.hover_state(), HoverState::Idle);

        advance(&mut controller, &mut scene, ms(200));
        let scale = scene.property(target, TweenProperty::Scale).unwrap();
        let rotation = scene.property(target, TweenProperty::Rotation).unwrap();
        assert!(scale.cmpgt(Vec3::ONE).all() && scale.cmplt(Vec3::splat(1.5)).all());
        assert!(rotation.cmpgt(Vec3::ZERO).all());
        assert!(rotation.cmplt(Vec3::new(0.15, 0.3, 0.05)).all());

        advance(&mut controller, &mut scene, ms(200));
        assert_eq!(scene.property(target, TweenProperty::Scale), Some(Vec3::ONE));
        assert_eq!(scene.property(target, TweenProperty::Rotation), Some(Vec3::ZERO));
    }

    #[test]
    fn repeated_hits_in_one_frame_enter_once() {
        let (mut controller, scene, _) = loaded();
        let picker = StubPicker::default();
        picker.set_hit(true);

        let transitions = (0..2)
            .filter_map(|_| move_pointer(&mut controller, &scene, &picker))
            .collect::<Vec<_>>();

        assert_eq!(transitions, vec![HoverTransition::Enter]);
        assert_eq!(controller.tweens().len(), 2);
    }

    #[test]
    fn rapid_exit_starts_from_current_value() {
        let (mut controller, mut scene, target) = loaded();
        let picker = StubPicker::default();
        picker.set_hit(true);
        move_pointer(&mut controller, &scene, &picker);
        advance(&mut controller, &mut scene, ms(100));
        let mid_scale = scene.property(target, TweenProperty::Scale).unwrap();

        picker.set_hit(false);
        move_pointer(&mut controller, &scene, &picker);

        let exit_scale = controller
            .tweens()
            .iter()
            .filter(|tween| tween.property == TweenProperty::Scale)
            .last()
            .unwrap();
        assert_eq!(exit_scale.start(), mid_scale);
        assert_eq!(exit_scale.end(), Vec3::ONE);
        // Enter tweens are not cancelled
        assert_eq!(controller.tweens().len(), 4);
    }

    #[test]
    fn hover_during_grow_in_overlaps() {
        let mut scene = Scene::new();
        let target = scene.add_object(Object3D::named("target"));
        let mut controller = InteractionController::new(&SceneConfig::default());
        let picker = StubPicker::default();
        picker.set_hit(true);

        controller.on_target_loaded(&mut scene, target);
        advance(&mut controller, &mut scene, ms(100));
        move_pointer(&mut controller, &scene, &picker);

        // The hover tween is newer, so it wins while both run
        advance(&mut controller, &mut scene, ms(400));
        assert_eq!(scene.property(target, TweenProperty::Scale), Some(Vec3::splat(1.5)));

        // Then the unfinished grow-in takes over until it completes
        advance(&mut controller, &mut scene, ms(1000));
        assert_eq!(scene.property(target, TweenProperty::Scale), Some(Vec3::ONE));
        assert!(controller.tweens().is_empty());
    }

    #[test]
    fn idle_motion_runs_before_tweens() {
        let mut scene = Scene::new();
        let group = scene.add_object(Object3D::named("group"));
        let mut controller = InteractionController::new(&SceneConfig::default());
        controller.set_idle_motion(IdleMotion::new(group, 0.01));
        controller.play_appearance(
            &mut scene,
            group,
            TweenProperty::Rotation,
            Vec3::ONE,
            ms(2000),
        );

        let frame = FrameTime {
            elapsed: ms(2000),
            delta: ms(2000),
        };
        controller.update(&mut scene, frame);
        // The finishing tween wrote last
        assert_eq!(scene.property(group, TweenProperty::Rotation), Some(Vec3::ONE));

        let frame = FrameTime {
            elapsed: ms(3000),
            delta: ms(1000),
        };
        controller.update(&mut scene, frame);
        let rotation = scene.property(group, TweenProperty::Rotation).unwrap();
        assert_eq!(rotation.x, 1.0);
        assert!((rotation.y - 0.03).abs() < 1e-6);
    }
}
