use glam::{Vec2, Vec3};

use crate::{camera::Camera, config::OrbitConfig};

// Keeps the camera off the poles, where the view matrix degenerates
const POLE_EPSILON: f32 = 1e-6;

/// Orbits the camera around its target on a sphere, with optional damping
/// and clamped distance and angles.
pub struct OrbitControls {
    config: OrbitConfig,
    // Pending rotation around the up axis (theta) and from it (phi)
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
}

impl OrbitControls {
    pub fn new(config: OrbitConfig) -> Self {
        Self {
            config,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
        }
    }

    /// Applies a pointer drag of `delta` pixels in a viewport `viewport_height`
    /// pixels tall. A drag over the full height is one full turn.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        let factor = std::f32::consts::TAU / height * self.config.rotate_speed;

        self.delta_theta -= delta.x * factor;
        self.delta_phi -= delta.y * factor;
    }

    /// Positive `steps` move towards the target.
    pub fn dolly(&mut self, steps: f32) {
        let zoom_scale = 0.95f32.powf(self.config.zoom_speed);
        self.scale *= zoom_scale.powf(steps);
    }

    pub fn update(&mut self, camera: &mut Camera) {
        let config = &self.config;
        let offset = camera.eye - camera.target;
        let radius = offset.length();

        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, std::f32::consts::FRAC_PI_2)
        };

        if config.enable_damping {
            theta += self.delta_theta * config.damping_factor;
            phi += self.delta_phi * config.damping_factor;
        } else {
            theta += self.delta_theta;
            phi += self.delta_phi;
        }

        theta = theta.clamp(config.min_azimuth_angle, config.max_azimuth_angle);
        phi = phi
            .clamp(config.min_polar_angle, config.max_polar_angle)
            .clamp(POLE_EPSILON, std::f32::consts::PI - POLE_EPSILON);

        let radius = (radius * self.scale).clamp(config.min_distance, config.max_distance);

        let sin_phi = phi.sin();
        let offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        camera.eye = camera.target + offset;

        if config.enable_damping {
            self.delta_theta *= 1.0 - config.damping_factor;
            self.delta_phi *= 1.0 - config.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }

        self.scale = 1.0;
    }
}
