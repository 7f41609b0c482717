//! Smooth per-vertex normals from area-weighted face normals.

use glam::Vec3;
use tracing::warn;

use crate::error::TerrainError;
use crate::vertex::TerrainVertex;

/// Summary of a normal pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalReport {
    /// Vertices whose accumulated normal had zero length and were left as the
    /// zero vector instead of being normalized.
    pub degenerate: usize,
}

/// Overwrite every vertex normal with the normalized sum of the unnormalized
/// face normals of all triangles touching it.
///
/// For triangle `(i1, i2, i3)` the face normal is
/// `(p1 - p3) × (p1 - p2)`; its length is twice the triangle area, so larger
/// triangles pull harder. Indices are validated up front, so on error no
/// vertex has been modified.
pub fn compute_normals(
    vertices: &mut [TerrainVertex],
    indices: &[u32],
) -> Result<NormalReport, TerrainError> {
    if indices.len() % 3 != 0 {
        return Err(TerrainError::PartialTriangle(indices.len()));
    }
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
        return Err(TerrainError::IndexOutOfRange {
            index,
            vertex_count: vertices.len(),
        });
    }

    let mut sums = vec![Vec3::ZERO; vertices.len()];
    for tri in indices.chunks_exact(3) {
        let (i1, i2, i3) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let p1 = vertices[i1].position();
        let side1 = p1 - vertices[i3].position();
        let side2 = p1 - vertices[i2].position();
        let face_normal = side1.cross(side2);

        sums[i1] += face_normal;
        sums[i2] += face_normal;
        sums[i3] += face_normal;
    }

    let mut report = NormalReport::default();
    for (vertex, sum) in vertices.iter_mut().zip(sums) {
        let normal = sum.normalize_or_zero();
        if normal == Vec3::ZERO {
            report.degenerate += 1;
        }
        vertex.normal = normal.to_array();
    }

    if report.degenerate > 0 {
        warn!(
            degenerate = report.degenerate,
            "Vertices with zero accumulated normal kept the zero vector"
        );
    }
    Ok(report)
}
