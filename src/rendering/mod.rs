pub mod config;
pub mod global_uniform;
pub mod gold_material;
pub mod imgui_renderer;
pub mod instance;
pub mod lighting;
pub mod passes;
pub mod render_camera;
pub mod render_common;
pub mod render_model;
pub mod render_particles;
pub mod renderer;
pub mod shader_loader;
pub mod texture;
pub mod util;
