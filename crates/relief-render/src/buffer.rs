//! Vertex, index and uniform buffer creation.

use relief_terrain::{TerrainMesh, TerrainVertex};
use thiserror::Error;
use wgpu::util::DeviceExt;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("{0} indices do not fit a u32 draw range")]
    TooManyIndices(usize),
}

/// Terrain geometry resident on the GPU. Indices are always `u32`.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffer {
    /// Bind vertex and index buffers to a render pass.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    /// Draw every index as a triangle list.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Vertex types that describe their own wgpu buffer layout.
pub trait VertexLayout {
    fn layout() -> wgpu::VertexBufferLayout<'static>;
}

impl VertexLayout for TerrainVertex {
    /// `@location(0)` position, `@location(1)` color (normalized to `0..1`),
    /// `@location(2)` normal.
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        use wgpu::{VertexAttribute, VertexFormat};

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TerrainVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: TerrainVertex::COLOR_OFFSET,
                    shader_location: 1,
                    format: VertexFormat::Unorm8x4,
                },
                VertexAttribute {
                    offset: TerrainVertex::NORMAL_OFFSET,
                    shader_location: 2,
                    format: VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// GPU buffer allocator for creating vertex, index and uniform buffers.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    /// Upload a built terrain mesh.
    pub fn create_terrain_mesh(
        &self,
        label: &str,
        mesh: &TerrainMesh,
    ) -> Result<MeshBuffer, BufferError> {
        self.create_mesh(label, mesh.vertex_bytes(), &mesh.indices)
    }

    /// Create a mesh buffer from raw vertex bytes and `u32` indices.
    pub fn create_mesh(
        &self,
        label: &str,
        vertices: &[u8],
        indices: &[u32],
    ) -> Result<MeshBuffer, BufferError> {
        let index_count =
            u32::try_from(indices.len()).map_err(|_| BufferError::TooManyIndices(indices.len()))?;
        Ok(MeshBuffer {
            vertex_buffer: self.create_vertex_buffer(&format!("{label}-vertices"), vertices),
            index_buffer: self.create_index_buffer(&format!("{label}-indices"), indices),
            index_count,
        })
    }

    pub fn create_vertex_buffer(&self, label: &str, data: &[u8]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage: wgpu::BufferUsages::VERTEX,
            })
    }

    pub fn create_index_buffer(&self, label: &str, data: &[u32]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::INDEX,
            })
    }

    /// Zero-initialized uniform buffer rewritten each frame with `Queue::write_buffer`.
    pub fn create_uniform_buffer(&self, label: &str, size: u64) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}
