#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub clear_color: wgpu::Color,
    /// Watch `assets/shaders` and rebuild pipelines when a shader changes.
    pub hot_reload_shaders: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: wgpu::Color {
                r: 0.01,
                g: 0.01,
                b: 0.015,
                a: 1.0,
            },
            hot_reload_shaders: cfg!(debug_assertions),
        }
    }
}
