use std::sync::Arc;

use anyhow::Context;
use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    config::ViewerConfig,
    demo::DemoState,
    rendering::{renderer::Renderer, FrameRenderer},
    resize::ResizeController,
    scheduler::{FrameScheduler, StopSignal, TickOutcome},
};

// Pixels of trackpad scrolling that count as one wheel line
const PIXELS_PER_LINE: f32 = 40.0;

struct App {
    config: ViewerConfig,
    demo_state: DemoState,
    renderer: Option<Renderer>,
    scheduler: FrameScheduler,
    resize_controller: ResizeController,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: ViewerConfig, demo_state: DemoState) -> Self {
        let scheduler = FrameScheduler::new(StopSignal::new(), config.frame_limit);

        Self {
            config,
            demo_state,
            renderer: None,
            scheduler,
            resize_controller: ResizeController::new(),
            error: None,
        }
    }

    fn create_renderer(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Renderer> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.window_title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.initial_width,
                self.config.initial_height,
            ));
        let window = event_loop
            .create_window(window_attributes)
            .context("Failed to create window")?;

        pollster::block_on(Renderer::new(Arc::new(window), &self.config))
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        let mut renderer = match self.create_renderer(event_loop) {
            Ok(renderer) => renderer,
            Err(err) => {
                log::error!("{:#}", err);
                self.error = Some(err);
                event_loop.exit();
                return;
            }
        };

        let viewport = renderer.viewport();
        self.resize_controller
            .handle_resize(viewport, &mut self.demo_state.camera, &mut renderer);
        renderer.window.request_redraw();

        log::info!("Renderer ready at {}x{}", viewport.width, viewport.height);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.scheduler.stop_signal().stop();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                // Applied before the next redraw is dispatched
                self.resize_controller.handle_resize(
                    new_size.into(),
                    &mut self.demo_state.camera,
                    renderer,
                );
                renderer.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                self.demo_state.update();

                let outcome =
                    self.scheduler
                        .tick(&self.demo_state.scene, &self.demo_state.camera, renderer);

                match outcome {
                    TickOutcome::Stopped => {
                        log::info!(
                            "Render loop stopped after {} frames",
                            self.scheduler.frames_rendered()
                        );
                        event_loop.exit();
                    }
                    // Resumes on the next resize event
                    TickOutcome::Skipped => {}
                    TickOutcome::Rendered(_) | TickOutcome::Dropped => {
                        renderer.window.request_redraw();
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.demo_state
                    .orbit
                    .set_dragging(state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.demo_state
                    .orbit
                    .cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
                self.demo_state.orbit.zoom(lines);
            }
            _ => (),
        }
    }
}

pub async fn run(config: ViewerConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let demo_state = DemoState::new(&config).context("Failed to create demo state")?;
    let mut app = App::new(config, demo_state);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
