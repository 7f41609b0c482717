//! Terrain construction errors.

/// Errors raised while loading a height grid or building its mesh.
///
/// Every variant aborts construction before any buffer is handed out.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    /// The grid is smaller than 2×2, or its vertices or indices overflow `u32`.
    #[error("invalid terrain dimensions {width}x{height}: need at least 2x2 and at most 2^32-1 vertices and indices")]
    InvalidTerrainDimensions { width: u32, height: u32 },

    /// The sample buffer does not hold exactly `width * height` entries.
    #[error("expected {expected} height samples, got {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },

    /// A raw height was negative, NaN or infinite.
    #[error("invalid height {value} at ({x}, {y})")]
    InvalidHeight { x: u32, y: u32, value: f32 },

    /// The intensity divisor must be finite and positive.
    #[error("height divisor must be finite and positive, got {0}")]
    InvalidDivisor(f32),

    /// A triangle references a vertex that does not exist.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    /// The index sequence is not a whole number of triangles.
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),

    /// Decoding the heightmap image failed.
    #[error("failed to load heightmap: {0}")]
    Image(#[from] image::ImageError),
}
