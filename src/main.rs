use anyhow::Result;

mod asset_loader;
mod asset_pipeline;
mod camera;
mod config;
mod demo;
mod engine;
mod interaction;
mod math;
mod model;
mod orbit_controls;
mod particles;
mod rendering;
mod scene_graph;
mod window;

fn main() -> Result<()> {
    pretty_env_logger::init();

    pollster::block_on(window::run())?;

    Ok(())
}
