//! First pass: exact buffer sizing without storing any geometry.

use serde::Serialize;
use tracing::debug;

use crate::config::LoadOptions;
use crate::error::{ObjError, Result};
use crate::ingestion::index::AttributeCounts;
use crate::ingestion::lines::{self, Directive};
use crate::types::VertexLayout;

/// Capacity requirements computed by [`count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SizingDescriptor {
    pub position_count: usize,
    pub texcoord_count: usize,
    pub normal_count: usize,
    /// Sum of polygon degrees over all faces.
    pub corner_count: usize,
    /// Triangles after fan triangulation: sum of `degree - 2`.
    pub triangle_count: usize,
}

impl SizingDescriptor {
    /// Exact length of the output index buffer.
    pub fn index_count(&self) -> usize {
        self.triangle_count * 3
    }

    /// Output layout, fixed by whether any texcoord or normal is declared.
    pub fn layout(&self) -> VertexLayout {
        VertexLayout {
            has_texcoords: self.texcoord_count > 0,
            has_normals: self.normal_count > 0,
        }
    }

    /// Declared attribute totals.
    pub fn attribute_counts(&self) -> AttributeCounts {
        AttributeCounts {
            positions: self.position_count,
            texcoords: self.texcoord_count,
            normals: self.normal_count,
        }
    }
}

/// Scan `text` once and compute exact buffer sizes.
///
/// Faces with fewer than three corners fail here, before anything is
/// allocated for the mesh.
pub fn count(text: &str, options: &LoadOptions) -> Result<SizingDescriptor> {
    let mut desc = SizingDescriptor::default();

    for line in lines::lines(text, options.max_line_length) {
        let line = line?;
        match line.directive {
            Directive::Position => desc.position_count += 1,
            Directive::Texcoord => desc.texcoord_count += 1,
            Directive::Normal => desc.normal_count += 1,
            Directive::Face => {
                let corners = line.args.split_ascii_whitespace().count();
                if corners < 3 {
                    return Err(ObjError::DegenerateFace {
                        line: line.number,
                        corners,
                    });
                }
                desc.corner_count += corners;
                desc.triangle_count += corners - 2;
            }
            Directive::Other => {}
        }
    }

    // Output indices are u32.
    if desc.corner_count > u32::MAX as usize {
        return Err(ObjError::TooLarge {
            corners: desc.corner_count,
        });
    }

    debug!(
        positions = desc.position_count,
        texcoords = desc.texcoord_count,
        normals = desc.normal_count,
        corners = desc.corner_count,
        triangles = desc.triangle_count,
        "Counted OBJ"
    );

    Ok(desc)
}
