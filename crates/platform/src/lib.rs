//! Platform layer: windowing, input mapping & the frame loop.
//!
//! - Redraws are requested continuously; the simulation advances once per redraw.
//! - Resize, lost surfaces and close are handled here and forwarded to the renderer.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use asset::{ObjModel, TextureFilter};
use corelib::{Camera, LightKind, Lights, Scene};
use renderer::Renderer;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// Longest simulation step taken for a single frame, in seconds.
pub const MAX_FRAME_DT: f32 = 0.1;

/// Startup options collected from the command line.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub backends: wgpu::Backends,
    pub width: u32,
    pub height: u32,
    pub show_fps: bool,
    pub assets_dir: PathBuf,
    pub texture_filter: TextureFilter,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            width: 1280,
            height: 720,
            show_fps: false,
            assets_dir: PathBuf::from("assets"),
            texture_filter: TextureFilter::default(),
        }
    }
}

/// Keyboard actions understood by the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    StartCueBall,
    ToggleLight(LightKind),
    Exit,
}

pub fn map_key(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Space => Some(Command::StartCueBall),
        KeyCode::Digit1 => Some(Command::ToggleLight(LightKind::Ambient)),
        KeyCode::Digit2 => Some(Command::ToggleLight(LightKind::Directional)),
        KeyCode::Digit3 => Some(Command::ToggleLight(LightKind::Point)),
        KeyCode::Digit4 => Some(Command::ToggleLight(LightKind::Spot)),
        KeyCode::Escape => Some(Command::Exit),
        _ => None,
    }
}

/// Collapse one wheel event to a zoom tick of `+1`, `-1`, or nothing.
pub fn scroll_tick(delta: MouseScrollDelta) -> Option<f32> {
    let y = match delta {
        MouseScrollDelta::LineDelta(_, y) => y as f64,
        MouseScrollDelta::PixelDelta(pos) => pos.y,
    };
    if y > 0.0 {
        Some(1.0)
    } else if y < 0.0 {
        Some(-1.0)
    } else {
        None
    }
}

/// Seconds between two frames, clamped to `[0, MAX_FRAME_DT]`.
pub fn frame_dt(last: Option<Instant>, now: Instant) -> f32 {
    match last {
        Some(last) => now.duration_since(last).as_secs_f32().min(MAX_FRAME_DT),
        None => 0.0,
    }
}

/// Counts frames and reports the rate once per second.
struct FpsCounter {
    frames: u32,
    window_start: Instant,
}

impl FpsCounter {
    fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
        }
    }

    fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.duration_since(self.window_start).as_secs_f32();
        if elapsed >= 1.0 {
            let fps = self.frames as f32 / elapsed;
            self.frames = 0;
            self.window_start = now;
            Some(fps)
        } else {
            None
        }
    }
}

struct ViewerApp {
    config: ViewerConfig,
    models: Vec<ObjModel>,

    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,

    scene: Scene,
    camera: Camera,
    lights: Lights,

    left_held: bool,
    last_cursor_x: Option<f64>,
    last_frame: Option<Instant>,
    fps: FpsCounter,

    error: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(config: ViewerConfig, models: Vec<ObjModel>) -> Self {
        let aspect = config.width as f32 / config.height.max(1) as f32;
        Self {
            config,
            models,
            window: None,
            renderer: None,
            scene: Scene::new(),
            camera: Camera::new(aspect),
            lights: Lights::new(),
            left_held: false,
            last_cursor_x: None,
            last_frame: None,
            fps: FpsCounter::new(Instant::now()),
            error: None,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Billiard 3D")
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Failed to create window")?,
        );
        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            self.config.backends,
            self.config.texture_filter,
            &self.models,
        ))
        .context("Renderer init failed")?;
        self.camera = self.camera.with_aspect(renderer.aspect());

        window.request_redraw();
        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn apply(&mut self, command: Command, event_loop: &ActiveEventLoop) {
        match command {
            Command::StartCueBall => {
                self.scene.start_cue_ball();
            }
            Command::ToggleLight(kind) => {
                self.lights.toggle(kind);
            }
            Command::Exit => {
                log::info!("Escape pressed. Exiting event loop.");
                event_loop.exit();
            }
        }
    }

    fn handle_key(&mut self, event: KeyEvent, event_loop: &ActiveEventLoop) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        if let PhysicalKey::Code(code) = event.physical_key {
            if let Some(command) = map_key(code) {
                self.apply(command, event_loop);
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = frame_dt(self.last_frame, now);
        self.last_frame = Some(now);
        self.scene.update(dt);

        if self.config.show_fps {
            if let Some(fps) = self.fps.tick(now) {
                log::info!("FPS: {:.1}", fps);
            }
        }

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        match renderer.render(&self.scene, &self.camera, &self.lights) {
            Ok(()) => {}
            Err(e) if Renderer::is_surface_lost(&e) => {
                log::warn!("Surface lost/outdated. Reconfiguring.");
                renderer.recreate_surface();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout; skipping frame.");
            }
            Err(e) => {
                log::error!("Render error: {e:?}, exiting");
                self.error = Some(anyhow!("Render error: {e:?}"));
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_window(event_loop) {
            log::error!("{e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                log::info!("Resized: {}x{}", new_size.width, new_size.height);
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(new_size.width, new_size.height);
                    self.camera = self.camera.with_aspect(renderer.aspect());
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event, event_loop),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.left_held = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(last_x) = self.last_cursor_x {
                    self.camera
                        .process_drag((position.x - last_x) as f32, self.left_held);
                }
                self.last_cursor_x = Some(position.x);
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_cursor_x = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(tick) = scroll_tick(delta) {
                    self.camera.process_scroll(tick);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Open the window and run until it is closed. `models` are the already-loaded ball models.
pub fn run(config: ViewerConfig, models: Vec<ObjModel>) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(config, models);
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("Event loop error: {e:?}"))?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
