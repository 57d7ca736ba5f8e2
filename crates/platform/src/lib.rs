//! Platform layer: window, event loop and input routing into the scene.
//!
//! - Continuous redraws (`about_to_wait` requests the next frame).
//! - Resize reconfigures the surface and the camera viewport.
//! - Pointer is hidden and re-centred while the free/cockpit camera looks around.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use renderer::GpuState;
use scene::Scene;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

pub mod fps;
pub mod hud;
pub mod keymap;

use fps::FpsCounter;
use keymap::{KeyAction, key_action};

const WINDOW_TITLE: &str = "Farm Scene";

/// Startup options collected from the command line.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub backends: wgpu::Backends,
    pub show_fps: bool,
    pub width: u32,
    pub height: u32,
    pub assets_dir: PathBuf,
}

/// Everything that exists once the window is up.
struct Running {
    window: Arc<Window>,
    gpu: GpuState,
    scene: Scene,
    egui_state: egui_winit::State,
    fps: Option<FpsCounter>,
    last_frame: Instant,
}

impl Running {
    fn new(
        event_loop: &ActiveEventLoop,
        config: &RunConfig,
        egui_ctx: &egui::Context,
    ) -> Result<Self> {
        let attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(config.width, config.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("Failed to create window")?,
        );
        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let mut gpu = pollster::block_on(GpuState::new(window.clone(), config.backends))?;

        log::info!("Loading assets from {}", config.assets_dir.display());
        let assets = scene::load_farm(&config.assets_dir, &mut gpu.texture_loader());
        let (width, height) = gpu.size();
        let scene = Scene::new(assets, width, height);

        window.set_cursor_visible(false);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        Ok(Self {
            window,
            gpu,
            scene,
            egui_state,
            fps: config.show_fps.then(FpsCounter::new),
            last_frame: Instant::now(),
        })
    }

    fn handle_key(&mut self, event: &KeyEvent) -> bool {
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };
        let pressed = event.state == ElementState::Pressed;
        match key_action(code) {
            Some(KeyAction::Hold(key)) if pressed => self.scene.key_down(key),
            Some(KeyAction::Hold(key)) => self.scene.key_up(key),
            Some(KeyAction::Command(command)) if pressed && !event.repeat => {
                self.scene.command(command)
            }
            Some(KeyAction::Exit) if pressed => return true,
            _ => {}
        }
        false
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        let (x, y) = (position.x as f32, position.y as f32);
        let Some(center) = self.scene.mouse_motion(x, y) else {
            return;
        };
        let target = PhysicalPosition::new(f64::from(center.x), f64::from(center.y));
        if let Err(err) = self.window.set_cursor_position(target) {
            log::debug!("Pointer warp unavailable: {err}");
            self.scene.pointer_warp_failed(x, y);
        }
    }

    /// Advance, compose and present one frame. Returns false on a fatal
    /// render error.
    fn redraw(&mut self, egui_ctx: &egui::Context) -> bool {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if let Some(rate) = self.fps.as_mut().and_then(|fps| fps.tick(dt)) {
            log::info!("FPS: {rate:.1}");
        }

        self.scene.update(dt);
        let frame = self.scene.compose();
        let overlay = hud::window_overlay(
            egui_ctx,
            &mut self.egui_state,
            &self.window,
            frame.help_visible,
        );

        match self.gpu.render(&frame, Some(&overlay)) {
            Ok(()) => true,
            Err(err) if GpuState::is_surface_lost(&err) => {
                log::warn!("Surface {err:?}; reconfiguring");
                self.gpu.recreate_surface();
                true
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout; skipping frame");
                true
            }
            Err(err) => {
                log::error!("Render failed: {err:?}");
                false
            }
        }
    }
}

struct App {
    config: RunConfig,
    egui_ctx: egui::Context,
    running: Option<Running>,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: RunConfig) -> Self {
        Self {
            config,
            egui_ctx: egui::Context::default(),
            running: None,
            error: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match Running::new(event_loop, &self.config, &self.egui_ctx) {
            Ok(running) => self.running = Some(running),
            Err(err) => {
                log::error!("Startup failed: {err:#}");
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        let response = running.egui_state.on_window_event(&running.window, &event);
        if response.repaint {
            running.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                log::info!("Resized: {width}x{height}");
                running.gpu.resize(width, height);
                running.scene.resize(width, height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                log::info!("Scale factor changed: {scale_factor:.3}");
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if running.handle_key(&event) {
                    log::info!("Escape pressed. Exiting event loop.");
                    event_loop.exit();
                }
            }
            WindowEvent::CursorMoved { position, .. } => running.handle_cursor(position),
            WindowEvent::RedrawRequested => {
                if !running.redraw(&self.egui_ctx) {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}

/// Open the window, load the farm and run until closed.
pub fn run_with_renderer(config: RunConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow::anyhow!("Event loop error: {e:?}"))?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
