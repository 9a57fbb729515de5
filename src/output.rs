use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{ObjError, Result};
use crate::types::{Mesh, VertexLayout};

/// JSON sidecar describing the binary buffer layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub generator: &'static str,
    pub point_count: usize,
    pub triangle_count: usize,
    pub attribute_width: usize,
    pub layout: VertexLayout,
    /// Name of the binary file, relative to the manifest.
    pub buffer: String,
    pub points_byte_offset: usize,
    pub points_byte_length: usize,
    pub indices_byte_offset: usize,
    pub indices_byte_length: usize,
}

/// Paths produced by [`write_mesh`].
#[derive(Debug, Clone)]
pub struct WrittenFiles {
    pub buffer: PathBuf,
    pub manifest: PathBuf,
}

/// Build the manifest for `mesh` stored in `buffer_name`.
pub fn manifest(mesh: &Mesh, buffer_name: &str) -> Manifest {
    let points_byte_length = std::mem::size_of_val(mesh.points());
    let indices_byte_length = std::mem::size_of_val(mesh.indices());
    Manifest {
        generator: "obj-indexer",
        point_count: mesh.point_count(),
        triangle_count: mesh.triangle_count(),
        attribute_width: mesh.attribute_width(),
        layout: mesh.layout(),
        buffer: buffer_name.to_string(),
        points_byte_offset: 0,
        points_byte_length,
        indices_byte_offset: points_byte_length,
        indices_byte_length,
    }
}

/// Write `<stem>.bin` (little-endian f32 points, then u32 indices) and
/// `<stem>.json`.
pub fn write_mesh(mesh: &Mesh, stem: &Path) -> Result<WrittenFiles> {
    if let Some(dir) = stem.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| {
            ObjError::Output(format!("Failed to create {}: {e}", dir.display()))
        })?;
    }

    let buffer_path = append_extension(stem, "bin");
    let manifest_path = append_extension(stem, "json");
    let buffer_name = buffer_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut bytes = Vec::with_capacity(
        std::mem::size_of_val(mesh.points()) + std::mem::size_of_val(mesh.indices()),
    );
    if cfg!(target_endian = "little") {
        bytes.extend_from_slice(bytemuck::cast_slice(mesh.points()));
        bytes.extend_from_slice(bytemuck::cast_slice(mesh.indices()));
    } else {
        bytes.extend(mesh.points().iter().flat_map(|f| f.to_le_bytes()));
        bytes.extend(mesh.indices().iter().flat_map(|i| i.to_le_bytes()));
    }

    fs::write(&buffer_path, &bytes).map_err(|e| {
        ObjError::Output(format!("Failed to write {}: {e}", buffer_path.display()))
    })?;

    let json_string = serde_json::to_string_pretty(&manifest(mesh, &buffer_name))
        .map_err(|e| ObjError::Output(format!("Failed to serialize manifest: {e}")))?;
    fs::write(&manifest_path, &json_string).map_err(|e| {
        ObjError::Output(format!("Failed to write {}: {e}", manifest_path.display()))
    })?;

    info!(
        buffer = %buffer_path.display(),
        manifest = %manifest_path.display(),
        bytes = bytes.len(),
        "Wrote mesh buffers"
    );

    Ok(WrittenFiles {
        buffer: buffer_path,
        manifest: manifest_path,
    })
}

/// `out/model.v2` + `bin` -> `out/model.v2.bin`; existing dots are kept.
fn append_extension(stem: &Path, ext: &str) -> PathBuf {
    let mut name = stem.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}
