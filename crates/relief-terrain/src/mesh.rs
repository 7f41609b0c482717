//! Vertex generation and the assembled [`TerrainMesh`].

use glam::Vec3;
use tracing::{debug, instrument};

use crate::band::ElevationBand;
use crate::error::TerrainError;
use crate::heightfield::HeightGrid;
use crate::indices::build_indices;
use crate::normals::{NormalReport, compute_normals};
use crate::vertex::TerrainVertex;

/// One vertex per cell at `(x, height, -y)`, colored by elevation band.
///
/// Grid `y` runs into negative world Z so rows further "north" in the image
/// sit further away from a camera looking down -Z. Normals are left zeroed.
pub fn build_vertices(grid: &HeightGrid) -> Vec<TerrainVertex> {
    let (min, max) = grid.min_max();
    let width = grid.width();

    grid.as_slice()
        .iter()
        .enumerate()
        .map(|(i, &h)| {
            let x = (i as u32 % width) as f32;
            let y = (i as u32 / width) as f32;
            let band = ElevationBand::classify(h, min, max);
            TerrainVertex::new(Vec3::new(x, h, -y), band.color())
        })
        .collect()
}

/// Static terrain geometry: vertices with normals plus a `u32` triangle list.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainMesh {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
    width: u32,
    height: u32,
    normal_report: NormalReport,
}

impl TerrainMesh {
    /// Run the full pipeline over a loaded grid.
    #[instrument(skip_all, fields(width = grid.width(), height = grid.height()))]
    pub fn build(grid: &HeightGrid) -> Result<Self, TerrainError> {
        let indices = build_indices(grid.width(), grid.height())?;
        let mut vertices = build_vertices(grid);
        let normal_report = compute_normals(&mut vertices, &indices)?;

        debug!(
            vertices = vertices.len(),
            triangles = indices.len() / 3,
            "Built terrain mesh"
        );

        Ok(Self {
            vertices,
            indices,
            width: grid.width(),
            height: grid.height(),
            normal_report,
        })
    }

    /// Grid columns the mesh was built from.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid rows the mesh was built from.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Outcome of normal normalization (degenerate vertices substituted).
    pub fn normal_report(&self) -> NormalReport {
        self.normal_report
    }

    /// Vertex buffer contents for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
