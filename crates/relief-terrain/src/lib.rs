//! Heightmap terrain: grid loading, vertex/index generation, and smooth normals.
//!
//! The pipeline runs once per terrain, leaf-first:
//! [`HeightGrid`] → [`build_vertices`] → [`build_indices`] → [`compute_normals`].
//! [`TerrainMesh::build`] chains the stages and either returns both buffers
//! or an error; there is no partially built mesh.

mod band;
mod error;
mod heightfield;
mod indices;
mod mesh;
mod normals;
mod vertex;

pub use band::ElevationBand;
pub use error::TerrainError;
pub use heightfield::{DEFAULT_HEIGHT_DIVISOR, HeightGrid, MIN_GRID_DIMENSION};
pub use indices::{build_indices, index_count};
pub use mesh::{TerrainMesh, build_vertices};
pub use normals::{NormalReport, compute_normals};
pub use vertex::TerrainVertex;
