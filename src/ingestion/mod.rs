pub mod builder;
pub mod counter;
pub mod index;
pub mod lines;

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::LoadOptions;
use crate::error::{ObjError, Result};
use crate::types::Mesh;

pub use counter::SizingDescriptor;

/// Statistics about a finished load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadStats {
    pub sizing: SizingDescriptor,
    pub point_count: usize,
    pub attribute_width: usize,
    /// Unique points over face corners; 1.0 when nothing was shared.
    pub dedup_ratio: f64,
}

impl LoadStats {
    fn new(sizing: SizingDescriptor, mesh: &Mesh) -> Self {
        let dedup_ratio = if sizing.corner_count == 0 {
            1.0
        } else {
            mesh.point_count() as f64 / sizing.corner_count as f64
        };
        Self {
            sizing,
            point_count: mesh.point_count(),
            attribute_width: mesh.attribute_width(),
            dedup_ratio,
        }
    }
}

/// Convert OBJ text into an indexed triangle list.
pub fn load_obj_str(text: &str, options: &LoadOptions) -> Result<Mesh> {
    load_obj_str_with_stats(text, options).map(|(mesh, _)| mesh)
}

/// Convert OBJ text and report sizing statistics.
///
/// The counting pass runs to completion before any mesh buffer is
/// allocated.
pub fn load_obj_str_with_stats(text: &str, options: &LoadOptions) -> Result<(Mesh, LoadStats)> {
    // 1. Count
    let sizing = counter::count(text, options)?;

    // 2. Fill, triangulate, deduplicate
    let mesh = builder::build(text, &sizing, options)?;

    let stats = LoadStats::new(sizing, &mesh);
    debug!(
        points = stats.point_count,
        triangles = mesh.triangle_count(),
        dedup_ratio = stats.dedup_ratio,
        "Load stats"
    );
    Ok((mesh, stats))
}

/// Load an OBJ file into an indexed triangle list.
pub fn load_obj(path: &Path, options: &LoadOptions) -> Result<Mesh> {
    load_obj_with_stats(path, options).map(|(mesh, _)| mesh)
}

/// Load an OBJ file and report sizing statistics.
pub fn load_obj_with_stats(path: &Path, options: &LoadOptions) -> Result<(Mesh, LoadStats)> {
    info!(path = %path.display(), "Loading OBJ");
    with_source(path, |text| load_obj_str_with_stats(text, options))
}

/// Run only the counting pass over a file.
pub fn count_obj(path: &Path, options: &LoadOptions) -> Result<SizingDescriptor> {
    with_source(path, |text| counter::count(text, options))
}

/// Read `path` fully and hand its text to `f`.
///
/// Missing files and non-UTF-8 content both surface as `IoUnavailable`.
fn with_source<T>(path: &Path, f: impl FnOnce(&str) -> Result<T>) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|source| ObjError::IoUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(bytes = text.len(), "Read OBJ source");
    f(&text)
}
