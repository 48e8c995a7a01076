//! Wave surface: heightfield synthesis and the mesh drawn from it.

mod mesh;
mod system;

pub use mesh::{SurfaceGrid, Vertex};
pub use system::WaveSurface;
