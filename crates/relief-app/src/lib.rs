//! Relief application: window, update loop and input around the terrain
//! renderer.

pub mod game_loop;
pub mod input;
pub mod platform;
pub mod scene;
pub mod window;

use relief_render::{EffectError, RenderContextError, RenderError};
use relief_terrain::TerrainError;
use thiserror::Error;

pub use input::InputError;
pub use platform::PlatformError;

/// Anything that ends the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("terrain: {0}")]
    Terrain(#[from] TerrainError),

    #[error("effect: {0}")]
    Effect(#[from] EffectError),

    #[error("GPU initialization: {0}")]
    Gpu(#[from] RenderContextError),

    #[error("render: {0}")]
    Render(#[from] RenderError),

    #[error("window creation: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
