//! wgpu rendering for terrain meshes: GPU context, buffers, camera, lighting,
//! named-parameter effects and the per-frame terrain draw.

pub mod bindings;
pub mod buffer;
pub mod camera;
pub mod colored;
pub mod depth;
pub mod effect;
pub mod frame;
pub mod gpu;
pub mod lighting;
pub mod pass;
pub mod pipeline;
pub mod renderer;

pub use bindings::{FrameUniforms, TECHNIQUE_NAME, TerrainBindings};
pub use buffer::{BufferAllocator, BufferError, MeshBuffer, VertexLayout};
pub use camera::{Camera, CameraSetup};
pub use colored::{COLORED_MANIFEST, COLORED_SHADER_SOURCE, colored_effect};
pub use depth::DepthBuffer;
pub use effect::{
    Effect, EffectError, EffectManifest, EffectParameters, ParameterDecl, ParameterHandle,
    ParameterKind, PassDecl, TechniqueDecl, TechniqueHandle,
};
pub use frame::{FrameState, world_matrix};
pub use gpu::{
    RenderContext, RenderContextError, RenderOptions, SurfaceError, init_render_context_blocking,
};
pub use lighting::Lighting;
pub use pass::{BLACK, DepthAttachmentConfig, FrameEncoder, RenderPassBuilder};
pub use pipeline::EffectPipelines;
pub use renderer::{RenderError, RenderPhase, TerrainRenderer, compose_frame};
