pub mod background_pass;
pub mod mesh_pass;
pub mod points_pass;
