pub mod mesh;

pub use mesh::{Mesh, VertexLayout};
