pub mod config;
pub mod error;
pub mod ingestion;
pub mod output;
pub mod pipeline;
pub mod types;

pub use config::{AttributePolicy, ConvertConfig, LoadOptions};
pub use error::{ObjError, Result};
pub use ingestion::{load_obj, load_obj_str, LoadStats, SizingDescriptor};
pub use pipeline::Pipeline;
pub use types::{Mesh, VertexLayout};
