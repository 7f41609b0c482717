//! Triangle-list indices over a `width × height` vertex grid.

use crate::error::TerrainError;
use crate::heightfield::MIN_GRID_DIMENSION;

/// Number of indices for a grid: two triangles per interior cell.
pub fn index_count(width: u32, height: u32) -> usize {
    (width.saturating_sub(1) as usize) * (height.saturating_sub(1) as usize) * 6
}

/// True when the grid is at least 2×2 and both its vertex ids and its
/// index count fit in `u32`.
pub fn addressable(width: u32, height: u32) -> bool {
    let cells = u64::from(width) * u64::from(height);
    let indices = u64::from(width.saturating_sub(1)) * u64::from(height.saturating_sub(1)) * 6;
    width >= MIN_GRID_DIMENSION
        && height >= MIN_GRID_DIMENSION
        && cells <= u64::from(u32::MAX)
        && indices <= u64::from(u32::MAX)
}

/// Emit two triangles per cell, rows (y) outer and columns (x) inner.
///
/// With corners `ll = (x, y)`, `lr = (x+1, y)`, `tl = (x, y+1)`, `tr = (x+1, y+1)`
/// flattened as `x + y * width`, each cell yields `(tl, lr, ll)` then
/// `(tl, tr, lr)`. Both triangles share the `tl`–`lr` diagonal and wind the
/// same way, which fixes the sign of the face normals.
pub fn build_indices(width: u32, height: u32) -> Result<Vec<u32>, TerrainError> {
    if !addressable(width, height) {
        return Err(TerrainError::InvalidTerrainDimensions { width, height });
    }

    let mut indices = Vec::with_capacity(index_count(width, height));
    for y in 0..height - 1 {
        for x in 0..width - 1 {
            let lower_left = x + y * width;
            let lower_right = (x + 1) + y * width;
            let top_left = x + (y + 1) * width;
            let top_right = (x + 1) + (y + 1) * width;

            indices.extend_from_slice(&[top_left, lower_right, lower_left]);
            indices.extend_from_slice(&[top_left, top_right, lower_right]);
        }
    }
    Ok(indices)
}
