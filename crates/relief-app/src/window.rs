//! winit application: owns the window, GPU context and terrain renderer, and
//! drives update ticks and redraws.

use std::path::PathBuf;
use std::sync::Arc;

use relief_config::Config;
use relief_render::{
    FrameState, RenderContext, RenderError, RenderOptions, RenderPhase, SurfaceError,
    TerrainRenderer, init_render_context_blocking,
};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::AppError;
use crate::game_loop::FixedTimestep;
use crate::input::{KeyboardState, RotationControls};
use crate::platform::preferred_backends;
use crate::scene::{self, Scene};

const CLOSE_KEY: KeyCode = KeyCode::Escape;
const RELOAD_KEY: KeyCode = KeyCode::F5;

pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attrs = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attrs
    }
}

pub fn render_options_from_config(config: &Config) -> RenderOptions {
    RenderOptions {
        vsync: config.window.vsync,
        wireframe: config.debug.wireframe_mode,
        backends: preferred_backends(),
    }
}

/// Application state across the event loop.
///
/// The scene is loaded before the loop starts; GPU resources appear on the
/// first `resumed` and live until exit. The phase turns to `Rendering` once
/// both are in place.
pub struct App {
    config: Config,
    config_dir: PathBuf,
    controls: RotationControls,
    pending_scene: Option<Scene>,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    renderer: Option<TerrainRenderer>,
    keyboard: KeyboardState,
    timestep: FixedTimestep,
    frame: FrameState,
    phase: RenderPhase,
    fatal: Option<AppError>,
}

impl App {
    /// Validate input bindings and load the scene. Nothing touches the GPU yet.
    pub fn new(config: Config, config_dir: PathBuf) -> Result<Self, AppError> {
        let controls = RotationControls::from_config(&config.input)?;
        let scene = Scene::load(&config)?;
        Ok(Self {
            config,
            config_dir,
            controls,
            pending_scene: Some(scene),
            window: None,
            gpu: None,
            renderer: None,
            keyboard: KeyboardState::new(),
            timestep: FixedTimestep::new(),
            frame: FrameState::new(),
            phase: RenderPhase::Initialized,
            fatal: None,
        })
    }

    pub fn frame_state(&self) -> &FrameState {
        &self.frame
    }

    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    /// Run one frame's worth of update ticks against the current key state.
    fn update(&mut self) {
        let controls = self.controls;
        let keyboard = &self.keyboard;
        let frame = &mut self.frame;
        self.timestep.frame(|_dt| frame.rotate(controls.tick_delta(keyboard)));
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let Some(scene) = self.pending_scene.take() else {
            return Ok(());
        };

        let attrs = window_attributes_from_config(&self.config);
        let window = Arc::new(event_loop.create_window(attrs)?);
        let ctx = init_render_context_blocking(
            window.clone(),
            render_options_from_config(&self.config),
        )?;
        let renderer =
            TerrainRenderer::new(&ctx, &scene.mesh, scene.effect, scene.camera, scene.lighting)?;

        info!(
            "Window ready: {}x{}, rotate with {:?}/{:?}",
            ctx.size().0,
            ctx.size().1,
            self.controls.left,
            self.controls.right
        );
        window.request_redraw();
        self.window = Some(window);
        self.gpu = Some(ctx);
        self.renderer = Some(renderer);
        self.timestep.reset_clock();
        self.phase = RenderPhase::Rendering;
        info!("Load complete, rendering");
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.fatal = Some(err);
        event_loop.exit();
    }

    /// Re-read `config.ron` and apply what can change while running.
    fn reload_config(&mut self) {
        match self.config.reload(&self.config_dir) {
            Ok(Some(new_config)) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.set_lighting(scene::lighting(&new_config.lighting));
                }
                match RotationControls::from_config(&new_config.input) {
                    Ok(controls) => self.controls = controls,
                    Err(e) => warn!("Keeping previous rotation keys: {e}"),
                }
                if new_config.terrain != self.config.terrain {
                    info!("Terrain changes take effect on restart");
                }
                self.config = new_config;
            }
            Ok(None) => debug!("Config unchanged"),
            Err(e) => warn!("Config reload failed: {e}"),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.phase != RenderPhase::Rendering {
            return;
        }
        self.update();

        let (Some(gpu), Some(renderer)) = (&self.gpu, &mut self.renderer) else {
            return;
        };
        match renderer.render(gpu, &self.frame) {
            Ok(()) => {}
            Err(RenderError::Surface(SurfaceError::Timeout)) => {
                debug!("Surface timeout, skipping frame");
            }
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_graphics(event_loop) {
            self.fail(event_loop, e);
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
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let (Some(gpu), Some(renderer)) = (&mut self.gpu, &mut self.renderer) {
                    gpu.resize(size.width, size.height);
                    renderer.resize(gpu);
                    debug!("Resized to {}x{}", size.width, size.height);
                }
            }
            WindowEvent::Focused(false) => self.keyboard.release_all(),
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard.handle_event(&event);
                if event.state == ElementState::Pressed
                    && !event.repeat
                    && let PhysicalKey::Code(code) = event.physical_key
                {
                    match code {
                        CLOSE_KEY => {
                            info!("Escape pressed, shutting down");
                            event_loop.exit();
                        }
                        RELOAD_KEY => self.reload_config(),
                        _ => {}
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Load the scene, open the window and block until it closes.
#[instrument(skip_all)]
pub fn run(config: Config, config_dir: PathBuf) -> Result<(), AppError> {
    let mut app = App::new(config, config_dir)?;
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;
    info!("Exited after {} update ticks", app.timestep.tick_count());
    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
