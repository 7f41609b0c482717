//! The terrain draw: owns GPU resources built at load and issues one frame
//! per call to [`TerrainRenderer::render`].

use relief_terrain::TerrainMesh;
use thiserror::Error;

use crate::bindings::{FrameUniforms, TerrainBindings};
use crate::buffer::{BufferAllocator, BufferError, MeshBuffer};
use crate::camera::{Camera, CameraSetup};
use crate::depth::DepthBuffer;
use crate::effect::{Effect, EffectError, EffectParameters};
use crate::frame::{FrameState, world_matrix};
use crate::gpu::{RenderContext, SurfaceError};
use crate::lighting::Lighting;
use crate::pass::{BLACK, FrameEncoder, RenderPassBuilder};
use crate::pipeline::EffectPipelines;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Effect(#[from] EffectError),

    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Application lifecycle around the renderer. `Initialized` until the scene
/// and every GPU resource have loaded, then `Rendering` for good.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderPhase {
    Initialized,
    Rendering,
}

pub struct TerrainRenderer {
    effect: Effect,
    bindings: TerrainBindings,
    parameters: EffectParameters,
    pipelines: EffectPipelines,
    mesh: MeshBuffer,
    depth: DepthBuffer,
    camera: Camera,
    lighting: Lighting,
    grid_size: (u32, u32),
}

impl TerrainRenderer {
    /// Resolve the effect's terrain bindings, upload the mesh and build every
    /// pipeline. Fails before any GPU work if a binding is missing.
    pub fn new(
        ctx: &RenderContext,
        mesh: &TerrainMesh,
        effect: Effect,
        camera: CameraSetup,
        lighting: Lighting,
    ) -> Result<Self, RenderError> {
        let bindings = TerrainBindings::resolve(&effect)?;
        let parameters = EffectParameters::new(&effect);

        let polygon_mode = if ctx.wireframe {
            wgpu::PolygonMode::Line
        } else {
            wgpu::PolygonMode::Fill
        };
        let pipelines = EffectPipelines::new(
            &ctx.device,
            &effect,
            bindings.technique,
            ctx.surface_format,
            polygon_mode,
        );

        let mesh_buffer =
            BufferAllocator::new(&ctx.device).create_terrain_mesh("terrain", mesh)?;
        let (width, height) = ctx.size();
        let depth = DepthBuffer::new(&ctx.device, width, height);

        log::info!(
            "Terrain renderer ready: {}x{} grid, {} triangles, effect '{}'",
            mesh.width(),
            mesh.height(),
            mesh.triangle_count(),
            effect.name()
        );

        Ok(Self {
            effect,
            bindings,
            parameters,
            pipelines,
            mesh: mesh_buffer,
            depth,
            camera: Camera::for_viewport(camera, width, height),
            lighting,
            grid_size: (mesh.width(), mesh.height()),
        })
    }

    /// Match the depth buffer and projection to a new surface size. Call after
    /// [`RenderContext::resize`].
    pub fn resize(&mut self, ctx: &RenderContext) {
        let (width, height) = ctx.size();
        self.depth.resize(&ctx.device, width, height);
        self.camera.set_viewport(width, height);
    }

    /// Uniform values for the given frame state.
    pub fn frame_uniforms(&self, frame: &FrameState) -> FrameUniforms {
        compose_frame(&self.camera, self.lighting, self.grid_size, frame)
    }

    /// Bind this frame's parameters, clear, and draw every pass of the technique.
    pub fn render(&mut self, ctx: &RenderContext, frame: &FrameState) -> Result<(), RenderError> {
        let uniforms = self.frame_uniforms(frame);
        self.bindings.apply(&mut self.parameters, &uniforms)?;

        let surface_texture = ctx.get_current_texture()?;
        self.pipelines
            .write_uniforms(&ctx.queue, self.parameters.as_bytes());

        let pass = terrain_pass(&self.depth);
        let mut encoder = FrameEncoder::new(&ctx.device, surface_texture);
        {
            let mut render_pass = encoder.begin_render_pass(&pass);
            self.pipelines.draw(&mut render_pass, &self.mesh);
        }
        encoder.submit(&ctx.queue);
        Ok(())
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn set_lighting(&mut self, lighting: Lighting) {
        self.lighting = lighting;
    }

    pub fn effect(&self) -> &Effect {
        &self.effect
    }
}

/// Black clear with the depth buffer reset to the far plane.
fn terrain_pass(depth: &DepthBuffer) -> RenderPassBuilder {
    RenderPassBuilder::new()
        .clear_color(BLACK)
        .depth(depth.view.clone(), DepthBuffer::CLEAR_VALUE)
        .label("terrain-pass")
}

/// Camera matrices, the grid's world transform at the frame's angle, and the
/// lighting values.
pub fn compose_frame(
    camera: &Camera,
    lighting: Lighting,
    (width, height): (u32, u32),
    frame: &FrameState,
) -> FrameUniforms {
    FrameUniforms {
        view: camera.view(),
        projection: camera.projection(),
        world: world_matrix(width, height, frame.angle()),
        lighting,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::tests::create_test_device;
    use crate::colored::colored_effect;
    use glam::Vec3;
    use relief_terrain::HeightGrid;

    const TARGET_SIZE: u32 = 64;
    const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Draw a flat grid into an offscreen target the way `render` does and
    /// read the pixels back as RGBA rows.
    fn draw_offscreen(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        grid: &HeightGrid,
        lighting: Lighting,
    ) -> Vec<u8> {
        let effect = colored_effect().unwrap();
        let bindings = TerrainBindings::resolve(&effect).unwrap();
        let pipelines = EffectPipelines::new(
            device,
            &effect,
            bindings.technique,
            TARGET_FORMAT,
            wgpu::PolygonMode::Fill,
        );
        let mesh = TerrainMesh::build(grid).unwrap();
        let mesh_buffer = BufferAllocator::new(device)
            .create_terrain_mesh("terrain", &mesh)
            .unwrap();
        let depth = DepthBuffer::new(device, TARGET_SIZE, TARGET_SIZE);

        let camera = Camera::for_viewport(CameraSetup::default(), TARGET_SIZE, TARGET_SIZE);
        let uniforms = compose_frame(
            &camera,
            lighting,
            (mesh.width(), mesh.height()),
            &FrameState::new(),
        );
        let mut parameters = EffectParameters::new(&effect);
        bindings.apply(&mut parameters, &uniforms).unwrap();
        pipelines.write_uniforms(queue, parameters.as_bytes());

        let extent = wgpu::Extent3d {
            width: TARGET_SIZE,
            height: TARGET_SIZE,
            depth_or_array_layers: 1,
        };
        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen-target"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("offscreen-readback"),
            size: u64::from(TARGET_SIZE * TARGET_SIZE * 4),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("offscreen-encoder"),
        });
        let pass = terrain_pass(&depth);
        {
            let mut render_pass = pass.begin(&mut encoder, &view);
            pipelines.draw(&mut render_pass, &mesh_buffer);
        }
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(TARGET_SIZE * 4),
                    rows_per_image: Some(TARGET_SIZE),
                },
            },
            extent,
        );
        queue.submit([encoder.finish()]);

        let slice = readback.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        device.poll(wgpu::PollType::wait_indefinitely()).unwrap();
        slice.get_mapped_range().to_vec()
    }

    fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
        let i = ((y * TARGET_SIZE + x) * 4) as usize;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    }

    #[test]
    fn test_draw_covers_center_and_clears_corner() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        // Flat grid: every vertex lands in the top band. Unlit, so the
        // centre shows the band color unscaled.
        let grid = HeightGrid::from_red_samples(32, 32, &[0; 32 * 32]).unwrap();
        let unlit = Lighting::new(Vec3::new(1.0, -1.0, -1.0), 0.1, false);
        let pixels = draw_offscreen(&device, &queue, &grid, unlit);

        let center = TARGET_SIZE / 2;
        assert_eq!(pixel(&pixels, center, center), [255, 255, 255, 255]);
        assert_eq!(pixel(&pixels, 0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn test_lighting_darkens_drawn_terrain() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let grid = HeightGrid::from_red_samples(32, 32, &[0; 32 * 32]).unwrap();
        let pixels = draw_offscreen(&device, &queue, &grid, Lighting::default());

        let center = TARGET_SIZE / 2;
        let [r, g, b, _] = pixel(&pixels, center, center);
        assert!(r > 0 && r < 255, "lit snow should be shaded, got {r}");
        assert!(r == g && g == b);
    }

    #[test]
    fn test_compose_frame_uses_camera_and_angle() {
        let camera = Camera::for_viewport(CameraSetup::default(), 500, 500);
        let mut frame = FrameState::new();
        frame.rotate(0.05);

        let uniforms = compose_frame(&camera, Lighting::default(), (64, 32), &frame);
        assert_eq!(uniforms.view, camera.view());
        assert_eq!(uniforms.projection, camera.projection());
        assert_eq!(uniforms.world, world_matrix(64, 32, 0.05));
        assert_eq!(uniforms.lighting, Lighting::default());
    }

    #[test]
    fn test_compose_frame_rotation_changes_only_world() {
        let camera = Camera::for_viewport(CameraSetup::default(), 500, 500);
        let still = compose_frame(&camera, Lighting::default(), (10, 10), &FrameState::new());
        let mut frame = FrameState::new();
        frame.rotate(-0.05);
        let turned = compose_frame(&camera, Lighting::default(), (10, 10), &frame);

        assert_eq!(still.view, turned.view);
        assert_ne!(still.world, turned.world);
        let corner = turned.world.transform_point3(Vec3::ZERO);
        assert!((corner.length() - Vec3::new(-5.0, 0.0, 5.0).length()).abs() < 1e-4);
    }
}
