use serde::Serialize;

/// Which optional attributes each output vertex carries.
///
/// Row order is always position, then texcoord, then normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VertexLayout {
    pub has_texcoords: bool,
    pub has_normals: bool,
}

impl VertexLayout {
    pub const POSITION_WIDTH: usize = 3;
    pub const TEXCOORD_WIDTH: usize = 2;
    pub const NORMAL_WIDTH: usize = 3;

    /// Floats per output vertex: 3, 5, 6 or 8.
    pub fn width(&self) -> usize {
        let mut width = Self::POSITION_WIDTH;
        if self.has_texcoords {
            width += Self::TEXCOORD_WIDTH;
        }
        if self.has_normals {
            width += Self::NORMAL_WIDTH;
        }
        width
    }

    /// Float offset of the texcoord within a row, if present.
    pub fn texcoord_offset(&self) -> Option<usize> {
        self.has_texcoords.then_some(Self::POSITION_WIDTH)
    }

    /// Float offset of the normal within a row, if present.
    pub fn normal_offset(&self) -> Option<usize> {
        self.has_normals.then(|| {
            Self::POSITION_WIDTH
                + if self.has_texcoords {
                    Self::TEXCOORD_WIDTH
                } else {
                    0
                }
        })
    }
}

/// Renderer-ready indexed triangle list.
///
/// Owns both buffers; dropping the mesh releases them together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Interleaved rows of `layout.width()` floats.
    points: Vec<f32>,
    /// Triangle corners, grouped in threes.
    indices: Vec<u32>,
    layout: VertexLayout,
}

impl Mesh {
    /// Assemble a mesh from finished buffers.
    ///
    /// Callers guarantee that `points` is a whole number of rows and that
    /// every index addresses an existing row.
    pub(crate) fn from_parts(points: Vec<f32>, indices: Vec<u32>, layout: VertexLayout) -> Self {
        debug_assert_eq!(points.len() % layout.width(), 0);
        debug_assert_eq!(indices.len() % 3, 0);
        Self {
            points,
            indices,
            layout,
        }
    }

    pub fn points(&self) -> &[f32] {
        &self.points
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Floats per point row.
    pub fn attribute_width(&self) -> usize {
        self.layout.width()
    }

    /// Number of unique points.
    pub fn point_count(&self) -> usize {
        self.points.len() / self.layout.width()
    }

    /// Number of triangles (indices / 3).
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The attribute row of point `i`.
    pub fn point(&self, i: usize) -> Option<&[f32]> {
        let width = self.layout.width();
        let start = i.checked_mul(width)?;
        self.points.get(start..start.checked_add(width)?)
    }

    /// Iterate triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Whether the mesh contains no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Hand both buffers over at once.
    pub fn into_parts(self) -> (Vec<f32>, Vec<u32>, VertexLayout) {
        (self.points, self.indices, self.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_widths() {
        let cases = [
            (false, false, 3),
            (true, false, 5),
            (false, true, 6),
            (true, true, 8),
        ];
        for (has_texcoords, has_normals, width) in cases {
            let layout = VertexLayout {
                has_texcoords,
                has_normals,
            };
            assert_eq!(layout.width(), width);
        }
    }

    #[test]
    fn layout_offsets() {
        let full = VertexLayout {
            has_texcoords: true,
            has_normals: true,
        };
        assert_eq!(full.texcoord_offset(), Some(3));
        assert_eq!(full.normal_offset(), Some(5));

        let normals_only = VertexLayout {
            has_texcoords: false,
            has_normals: true,
        };
        assert_eq!(normals_only.texcoord_offset(), None);
        assert_eq!(normals_only.normal_offset(), Some(3));
    }

    #[test]
    fn empty_mesh() {
        let mesh = Mesh::default();
        assert!(mesh.is_empty());
        assert_eq!(mesh.point_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.attribute_width(), 3);
        assert!(mesh.point(0).is_none());
    }

    #[test]
    fn quad_two_triangles() {
        let mesh = Mesh::from_parts(
            vec![
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
            ],
            vec![0, 1, 2, 0, 2, 3],
            VertexLayout::default(),
        );

        assert_eq!(mesh.point_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.point(2), Some(&[1.0, 1.0, 0.0][..]));
        assert!(mesh.point(4).is_none());
        let tris: Vec<_> = mesh.triangles().collect();
        assert_eq!(tris, vec![[0, 1, 2], [0, 2, 3]]);

        let (points, indices, layout) = mesh.into_parts();
        assert_eq!(points.len(), 12);
        assert_eq!(indices.len(), 6);
        assert_eq!(layout, VertexLayout::default());
    }

    #[test]
    fn point_out_of_range_is_none() {
        let mesh = Mesh::from_parts(
            vec![0.0; 24],
            vec![0, 1, 2],
            VertexLayout {
                has_texcoords: true,
                has_normals: true,
            },
        );

        assert_eq!(mesh.point_count(), 3);
        assert!(mesh.point(3).is_none());
        assert!(mesh.point(usize::MAX).is_none());
        // Would wrap to row 0 if the offset were computed unchecked.
        assert!(mesh.point(1 << (usize::BITS - 3)).is_none());
    }
}
