//! Height grid loading from image intensity samples.
//!
//! Elevation comes from the red channel only: `height = red / divisor`, with the
//! divisor defaulting to [`DEFAULT_HEIGHT_DIVISOR`] so an 8-bit sample maps to
//! `0.0..=51.0` elevation units.

use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::error::TerrainError;
use crate::indices::addressable;

/// Red-channel divisor used by the reference terrain.
pub const DEFAULT_HEIGHT_DIVISOR: f32 = 5.0;

/// Smallest grid edge that still forms one quad.
pub const MIN_GRID_DIMENSION: u32 = 2;

/// Immutable `width × height` grid of non-negative elevations, indexed `[x, y]`.
///
/// Storage is flat with `x + y * width`, the same order the vertex buffer uses.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    width: u32,
    height: u32,
    heights: Vec<f32>,
}

impl HeightGrid {
    /// Build a grid from raw elevations laid out as `x + y * width`.
    pub fn from_heights(width: u32, height: u32, heights: Vec<f32>) -> Result<Self, TerrainError> {
        let expected = validate_dimensions(width, height)?;
        if heights.len() != expected {
            return Err(TerrainError::SampleCountMismatch {
                expected,
                actual: heights.len(),
            });
        }
        if let Some(i) = heights.iter().position(|h| !h.is_finite() || *h < 0.0) {
            return Err(TerrainError::InvalidHeight {
                x: i as u32 % width,
                y: i as u32 / width,
                value: heights[i],
            });
        }
        Ok(Self {
            width,
            height,
            heights,
        })
    }

    /// Build a grid from red-channel bytes with the default divisor.
    pub fn from_red_samples(width: u32, height: u32, red: &[u8]) -> Result<Self, TerrainError> {
        Self::from_red_samples_with_divisor(width, height, red, DEFAULT_HEIGHT_DIVISOR)
    }

    /// Build a grid from red-channel bytes, dividing each by `divisor`.
    pub fn from_red_samples_with_divisor(
        width: u32,
        height: u32,
        red: &[u8],
        divisor: f32,
    ) -> Result<Self, TerrainError> {
        check_divisor(divisor)?;
        let expected = validate_dimensions(width, height)?;
        if red.len() != expected {
            return Err(TerrainError::SampleCountMismatch {
                expected,
                actual: red.len(),
            });
        }
        let heights = red.iter().map(|&r| f32::from(r) / divisor).collect();
        Ok(Self {
            width,
            height,
            heights,
        })
    }

    /// Build a grid from a decoded image using the default divisor.
    pub fn from_image(image: &DynamicImage) -> Result<Self, TerrainError> {
        Self::from_image_with_divisor(image, DEFAULT_HEIGHT_DIVISOR)
    }

    /// Build a grid from a decoded image. Any color type is accepted; it is
    /// expanded to RGBA8 and only the red channel is read.
    pub fn from_image_with_divisor(
        image: &DynamicImage,
        divisor: f32,
    ) -> Result<Self, TerrainError> {
        // Reject before converting so a bad image never allocates a grid.
        check_divisor(divisor)?;
        validate_dimensions(image.width(), image.height())?;

        let rgba = image.to_rgba8();
        let red: Vec<u8> = rgba.pixels().map(|p| p.0[0]).collect();
        Self::from_red_samples_with_divisor(rgba.width(), rgba.height(), &red, divisor)
    }

    /// Decode a heightmap file (PNG or JPEG) with the default divisor.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TerrainError> {
        Self::open_with_divisor(path, DEFAULT_HEIGHT_DIVISOR)
    }

    /// Decode a heightmap file, dividing intensities by `divisor`.
    pub fn open_with_divisor(path: impl AsRef<Path>, divisor: f32) -> Result<Self, TerrainError> {
        let path = path.as_ref();
        let image = image::open(path)?;
        let grid = Self::from_image_with_divisor(&image, divisor)?;
        debug!(
            path = %path.display(),
            width = grid.width,
            height = grid.height,
            "Loaded heightmap"
        );
        Ok(grid)
    }

    /// Number of columns (x extent).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows (y extent).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells, which is also the vertex count.
    pub fn cell_count(&self) -> usize {
        self.heights.len()
    }

    /// Elevation at `[x, y]`, or `None` outside the grid.
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.heights[(x + y * self.width) as usize])
        } else {
            None
        }
    }

    /// Flat slice of elevations in `x + y * width` order.
    pub fn as_slice(&self) -> &[f32] {
        &self.heights
    }

    /// Lowest and highest elevation in a single scan.
    pub fn min_max(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }
}

/// Returns the cell count for valid dimensions.
fn validate_dimensions(width: u32, height: u32) -> Result<usize, TerrainError> {
    if !addressable(width, height) {
        return Err(TerrainError::InvalidTerrainDimensions { width, height });
    }
    Ok(width as usize * height as usize)
}

fn check_divisor(divisor: f32) -> Result<(), TerrainError> {
    if divisor.is_finite() && divisor > 0.0 {
        Ok(())
    } else {
        Err(TerrainError::InvalidDivisor(divisor))
    }
}
