use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::camera::Camera;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: Mat4,
    pub eye: Vec4,
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera, aspect_ratio: f32) -> Self {
        Self {
            view_proj: camera.view_projection(aspect_ratio),
            eye: camera.eye.extend(1.0),
        }
    }
}
