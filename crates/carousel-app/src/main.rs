// ABOUTME: Main application entry point.
// ABOUTME: Opens the window, shows the scroll panel screen and renders it every frame.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use carousel_core::{Config, Size};
use carousel_renderer::{load_font_data, Renderer};
use carousel_screen::LayoutController;

struct App {
    config: Config,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    controller: Option<LayoutController>,
}

impl App {
    fn new() -> Self {
        let config = Config::load_or_default();
        tracing::info!(
            "Loaded config: {}x{} window, {}s entrance",
            config.window.width,
            config.window.height,
            config.animation.entrance_duration_secs
        );

        Self {
            config,
            window: None,
            renderer: None,
            controller: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attrs = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let title = &self.config.title;
        let font_data = load_font_data(title.font_path.as_deref());
        let renderer = pollster::block_on(Renderer::new(
            Arc::clone(&window),
            font_data.as_deref(),
            &title.text,
            title.font_size,
        ))?;

        let physical_size = window.inner_size();
        tracing::info!(
            "Window created: {}x{} physical pixels, scale factor: {}",
            physical_size.width,
            physical_size.height,
            renderer.scale_factor()
        );

        // Without a font the label keeps a sensible height but draws nothing
        let title_size = renderer
            .measure_text(&title.text)
            .map(|(w, h)| Size::new(w as f64, h as f64))
            .unwrap_or_else(|| Size::new(0.0, title.font_size as f64 * 1.2));
        let (width, height) = renderer.logical_size();

        let mut controller = LayoutController::new(
            self.config.clone(),
            Size::new(width as f64, height as f64),
            title_size,
        );
        controller.on_appear(Instant::now())?;

        window.request_redraw();
        self.window = Some(window);
        self.renderer = Some(renderer);
        self.controller = Some(controller);
        Ok(())
    }

    fn redraw(&mut self) {
        let (Some(renderer), Some(controller)) = (&mut self.renderer, &mut self.controller) else {
            return;
        };

        let animating = controller.tick(Instant::now());
        let commands = controller.display_list();
        if let Err(e) = renderer.render(&commands, self.config.colors.background) {
            tracing::warn!("Render failed: {}", e);
        }

        if animating {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            tracing::error!("Failed to start: {:#}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(new_size.width, new_size.height);
                    let (width, height) = renderer.logical_size();
                    if let Some(controller) = &mut self.controller {
                        controller.resize(Size::new(width as f64, height as f64));
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting carousel");

    let event_loop = EventLoop::new()?;
    let mut app = App::new();

    event_loop.run_app(&mut app)?;

    Ok(())
}
