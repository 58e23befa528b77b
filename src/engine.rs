use crate::{demo::DemoState, rendering::renderer::Renderer};

/// One simulation tick, run before the frame is rendered.
pub fn update(state: &mut DemoState, renderer: &mut Renderer, ui: &mut imgui::Ui) {
    state.scene.early_update();
    state.update();
    state.scene.late_update();

    renderer.sync_scene(&mut state.scene);
    state.draw_ui(ui);
}
