//! WebGPU rendering module
//!
//! Geometry is built on the CPU each frame (`scene`) and drawn with a single
//! textured pipeline (`pipeline`).

pub mod connections;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{SceneBuilder, SceneStyle};
pub use shapes::Mesh;
pub use vertex::Vertex;
