pub mod clock;
pub mod controller;
pub mod easing;
pub mod hover;
pub mod idle_motion;
pub mod pointer;
pub mod raycaster;
pub mod tween;

pub use controller::InteractionController;
