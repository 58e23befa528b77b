use std::{sync::Arc, time::Instant};

use anyhow::Context;
use glam::Vec2;
use imgui::{FontConfig, FontSource};
use imgui_winit_support::WinitPlatform;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    config::SceneConfig,
    demo::DemoState,
    engine,
    rendering::{config::RenderConfig, renderer::Renderer},
};

// Pixel scroll deltas per dolly step, for touchpads
const PIXELS_PER_SCROLL_STEP: f32 = 50.0;

struct ImguiState {
    context: imgui::Context,
    platform: WinitPlatform,
}

struct App {
    render_config: RenderConfig,
    renderer: Option<Renderer>,
    demo_state: DemoState,
    mouse_pos: Vec2,
    dragging: bool,
    imgui: Option<ImguiState>,
    last_frame: Instant,
}

fn viewport(size: PhysicalSize<u32>) -> Vec2 {
    Vec2::new(size.width as f32, size.height as f32)
}

impl App {
    fn new(demo_state: DemoState, render_config: RenderConfig) -> Self {
        Self {
            render_config,
            renderer: None,
            demo_state,
            mouse_pos: Vec2::ZERO,
            dragging: false,
            imgui: None,
            last_frame: Instant::now(),
        }
    }

    fn setup_imgui(window: &Window) -> ImguiState {
        let mut context = imgui::Context::create();
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(
            context.io_mut(),
            window,
            imgui_winit_support::HiDpiMode::Default,
        );

        let font_size = 14.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        // Disable INI support because it's broken in the published version of imgui
        context.set_ini_filename(None);

        ImguiState { context, platform }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes().with_title("Lightning field");
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );

        let mut imgui = Self::setup_imgui(&window);
        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            &self.demo_state,
            &mut imgui.context,
            &self.render_config,
        ))?;

        self.demo_state.resize(viewport(window.inner_size()));
        self.imgui = Some(imgui);
        self.renderer = Some(renderer);

        Ok(())
    }

    fn on_cursor_moved(&mut self, position: Vec2, ui_wants_mouse: bool) {
        let delta = position - self.mouse_pos;
        self.mouse_pos = position;

        if self.dragging {
            let viewport_height = self.demo_state.viewport.y;
            self.demo_state
                .orbit_controls
                .rotate(delta, viewport_height);
        }

        if !ui_wants_mouse {
            self.demo_state.on_pointer_move(position);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(imgui)) = (self.renderer.as_mut(), self.imgui.as_mut()) else {
            return;
        };

        let now = Instant::now();
        imgui
            .context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        renderer.window.request_redraw();

        if let Err(e) = imgui
            .platform
            .prepare_frame(imgui.context.io_mut(), &renderer.window)
        {
            log::error!("Failed to prepare imgui frame: {}", e);
            return;
        }

        let ui = imgui.context.new_frame();
        engine::update(&mut self.demo_state, renderer, ui);
        imgui.platform.prepare_render(ui, &renderer.window);

        match renderer.render(&self.demo_state, &mut imgui.context) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.resize(renderer.size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory");
                event_loop.exit();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timeout");
            }
            Err(other) => {
                log::error!("Unexpected error: {:?}", other);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            log::error!("{:#}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let ui_wants_mouse = match (&mut self.imgui, &self.renderer) {
            (Some(imgui), Some(renderer)) => {
                imgui.platform.handle_event::<()>(
                    imgui.context.io_mut(),
                    &renderer.window,
                    &Event::WindowEvent {
                        window_id,
                        event: event.clone(),
                    },
                );
                imgui.context.io().want_capture_mouse
            }
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(new_size);
                }
                self.demo_state.resize(viewport(new_size));
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                self.on_cursor_moved(position, ui_wants_mouse);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state == ElementState::Pressed && !ui_wants_mouse;
            }
            WindowEvent::MouseWheel { delta, .. } if !ui_wants_mouse => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => {
                        position.y as f32 / PIXELS_PER_SCROLL_STEP
                    }
                };
                self.demo_state.orbit_controls.dolly(steps);
            }
            _ => (),
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let demo_state =
        DemoState::new(SceneConfig::default()).context("Failed to create demo state")?;
    let mut app = App::new(demo_state, RenderConfig::default());
    event_loop.run_app(&mut app)?;

    Ok(())
}
