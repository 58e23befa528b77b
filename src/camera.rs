use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            eye: config.eye,
            target: config.target,
            up: Vec3::Y,
            fov_y_degrees: config.fov_y_degrees,
            near: config.near,
            far: config.far,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    // Depth maps to [0, 1], as wgpu expects
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            aspect_ratio.max(f32::EPSILON),
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self, aspect_ratio: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio) * self.view_matrix()
    }

    pub fn distance_to_target(&self) -> f32 {
        self.eye.distance(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_projects_to_screen_centre() {
        let camera = Camera::from_config(&CameraConfig::default());
        let clip = camera
            .view_projection(16.0 / 9.0)
            .project_point3(camera.target);

        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&clip.z));
    }
}
