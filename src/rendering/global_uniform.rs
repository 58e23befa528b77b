use bytemuck::{Pod, Zeroable};
use winit::dpi::PhysicalSize;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GlobalUniformState {
    pub resolution: [f32; 2],
    pub now: f32,
    _padding: f32,
}

impl GlobalUniformState {
    pub fn new(resolution: PhysicalSize<u32>, now: f32) -> Self {
        Self {
            resolution: [resolution.width as f32, resolution.height as f32],
            now,
            _padding: 0.0,
        }
    }
}
