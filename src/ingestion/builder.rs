//! Second pass: fill raw attributes, fan-triangulate faces and deduplicate
//! corners into one shared vertex space.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::config::{AttributePolicy, LoadOptions};
use crate::error::{ObjError, Result};
use crate::ingestion::counter::SizingDescriptor;
use crate::ingestion::index::{self, AttributeCounts, AttributeKind, CornerKey};
use crate::ingestion::lines::{self, Directive};
use crate::types::{Mesh, VertexLayout};

/// Per-kind attribute storage, filled in declaration order.
#[derive(Debug, Default)]
pub struct RawAttributes {
    pub positions: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
}

impl RawAttributes {
    /// Allocate exactly the declared counts.
    pub fn with_sizing(sizing: &SizingDescriptor) -> Self {
        Self {
            positions: Vec::with_capacity(sizing.position_count),
            texcoords: Vec::with_capacity(sizing.texcoord_count),
            normals: Vec::with_capacity(sizing.normal_count),
        }
    }

    /// Running counts, used to resolve relative indices.
    pub fn counts(&self) -> AttributeCounts {
        AttributeCounts {
            positions: self.positions.len(),
            texcoords: self.texcoords.len(),
            normals: self.normals.len(),
        }
    }

    /// Append the interleaved row for `key`; absent slots are zero.
    ///
    /// `key` must have been resolved against these arrays.
    fn write_row(&self, key: &CornerKey, layout: VertexLayout, out: &mut Vec<f32>) {
        out.extend_from_slice(&self.positions[key.position]);
        if layout.has_texcoords {
            let uv = key.texcoord.map_or([0.0; 2], |t| self.texcoords[t]);
            out.extend_from_slice(&uv);
        }
        if layout.has_normals {
            let n = key.normal.map_or([0.0; 3], |n| self.normals[n]);
            out.extend_from_slice(&n);
        }
    }
}

/// Mapping from corner tuple to dense output index, in insertion order.
#[derive(Debug, Default)]
pub struct VertexTable {
    map: HashMap<CornerKey, u32>,
}

impl VertexTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    /// Return the index for `key`, calling `on_insert` with the freshly
    /// assigned index when the key is new.
    pub fn intern(&mut self, key: CornerKey, on_insert: impl FnOnce(u32)) -> u32 {
        let next = self.map.len() as u32;
        match self.map.entry(key) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                e.insert(next);
                on_insert(next);
                next
            }
        }
    }
}

/// Accumulator for the build pass.
struct MeshBuilder {
    layout: VertexLayout,
    policy: AttributePolicy,
    raw: RawAttributes,
    table: VertexTable,
    points: Vec<f32>,
    indices: Vec<u32>,
    /// Reused per face line.
    corners: Vec<CornerKey>,
}

impl MeshBuilder {
    fn new(sizing: &SizingDescriptor, options: &LoadOptions) -> Self {
        let layout = sizing.layout();
        Self {
            layout,
            policy: options.attribute_policy,
            raw: RawAttributes::with_sizing(sizing),
            table: VertexTable::with_capacity(sizing.corner_count),
            points: Vec::with_capacity(sizing.corner_count * layout.width()),
            indices: Vec::with_capacity(sizing.index_count()),
            corners: Vec::new(),
        }
    }

    fn add_face(&mut self, args: &str, line: usize) -> Result<()> {
        let counts = self.raw.counts();
        self.corners.clear();
        for token in args.split_ascii_whitespace() {
            let key = index::parse_corner(token, &counts, line)?;
            self.check_policy(&key, line)?;
            self.corners.push(key);
        }

        let k = self.corners.len();
        if k < 3 {
            return Err(ObjError::DegenerateFace { line, corners: k });
        }

        // Fan around corner 0.
        for i in 1..k - 1 {
            let tri = [self.corners[0], self.corners[i], self.corners[i + 1]];
            for key in tri {
                let idx = self.add_vertex(key);
                self.indices.push(idx);
            }
        }
        Ok(())
    }

    /// Dedup by corner tuple, return its output index.
    fn add_vertex(&mut self, key: CornerKey) -> u32 {
        let Self {
            raw,
            table,
            points,
            layout,
            ..
        } = self;
        table.intern(key, |_| raw.write_row(&key, *layout, points))
    }

    fn check_policy(&self, key: &CornerKey, line: usize) -> Result<()> {
        if self.policy != AttributePolicy::Uniform {
            return Ok(());
        }
        if key.texcoord.is_some() != self.layout.has_texcoords {
            return Err(ObjError::MixedAttributes {
                line,
                kind: AttributeKind::Texcoord,
            });
        }
        if key.normal.is_some() != self.layout.has_normals {
            return Err(ObjError::MixedAttributes {
                line,
                kind: AttributeKind::Normal,
            });
        }
        Ok(())
    }

    fn finish(mut self) -> Mesh {
        let reserved = self.points.capacity() / self.layout.width();
        self.points.shrink_to_fit();

        debug!(
            points = self.table.len(),
            released = reserved - self.table.len(),
            triangles = self.indices.len() / 3,
            width = self.layout.width(),
            "Built indexed mesh"
        );

        Mesh::from_parts(self.points, self.indices, self.layout)
    }
}

/// Parse `N` leading floats from `args`; extra components are ignored.
fn parse_floats<const N: usize>(args: &str, line: usize) -> Result<[f32; N]> {
    let mut out = [0.0; N];
    let mut tokens = args.split_ascii_whitespace();
    for slot in &mut out {
        let token = tokens.next().ok_or_else(|| ObjError::MalformedNumber {
            line,
            token: args.trim().to_string(),
        })?;
        *slot = token.parse().map_err(|_| ObjError::MalformedNumber {
            line,
            token: token.to_string(),
        })?;
    }
    Ok(out)
}

/// Run the build pass over `text` using the sizes from the counting pass.
///
/// Any failure drops the partially filled buffers and returns the error.
pub fn build(text: &str, sizing: &SizingDescriptor, options: &LoadOptions) -> Result<Mesh> {
    let mut builder = MeshBuilder::new(sizing, options);

    for line in lines::lines(text, options.max_line_length) {
        let line = line?;
        match line.directive {
            Directive::Position => {
                let p = parse_floats::<3>(line.args, line.number)?;
                builder.raw.positions.push(p);
            }
            Directive::Texcoord => {
                let t = parse_floats::<2>(line.args, line.number)?;
                builder.raw.texcoords.push(t);
            }
            Directive::Normal => {
                let n = parse_floats::<3>(line.args, line.number)?;
                builder.raw.normals.push(n);
            }
            Directive::Face => builder.add_face(line.args, line.number)?,
            Directive::Other => {}
        }
    }

    debug_assert_eq!(builder.indices.len(), sizing.index_count());
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::counter;
    use approx::assert_relative_eq;

    fn run(text: &str, options: &LoadOptions) -> Result<Mesh> {
        let sizing = counter::count(text, options)?;
        build(text, &sizing, options)
    }

    fn run_default(text: &str) -> Result<Mesh> {
        run(text, &LoadOptions::default())
    }

    #[test]
    fn parse_floats_reads_leading_values() {
        let v = parse_floats::<3>("1 -2.5 3e2 1.0", 1).unwrap();
        assert_relative_eq!(v[0], 1.0);
        assert_relative_eq!(v[1], -2.5);
        assert_relative_eq!(v[2], 300.0);
    }

    #[test]
    fn parse_floats_rejects_short_and_bad_input() {
        let err = parse_floats::<3>("1 2", 4).unwrap_err();
        assert!(matches!(err, ObjError::MalformedNumber { line: 4, .. }));

        let err = parse_floats::<2>("0.5 abc", 2).unwrap_err();
        match err {
            ObjError::MalformedNumber { token, .. } => assert_eq!(token, "abc"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn table_interns_in_insertion_order() {
        let mut table = VertexTable::with_capacity(4);
        let a = CornerKey {
            position: 5,
            texcoord: None,
            normal: Some(1),
        };
        let b = CornerKey {
            position: 5,
            texcoord: None,
            normal: None,
        };
        let mut inserted = Vec::new();
        assert_eq!(table.intern(a, |i| inserted.push(i)), 0);
        assert_eq!(table.intern(b, |i| inserted.push(i)), 1);
        assert_eq!(table.intern(a, |i| inserted.push(i)), 0);
        assert_eq!(inserted, vec![0, 1]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.intern(b, |i| inserted.push(i)), 1);
        assert_eq!(inserted, vec![0, 1]);
    }

    #[test]
    fn single_triangle_positions_only() {
        let mesh = run_default("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.attribute_width(), 3);
        assert_eq!(mesh.point_count(), 3);
        assert_eq!(mesh.indices(), &[0, 1, 2]);
        assert_eq!(mesh.point(1), Some(&[1.0, 0.0, 0.0][..]));
    }

    #[test]
    fn quad_is_fanned_from_first_corner() {
        let mesh = run_default("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.point_count(), 4);
    }

    #[test]
    fn negative_indices_resolve_from_end() {
        let mesh = run_default("v 0 0 0\nv 1 1 1\nv 2 2 2\nf -1 -2 -3\n").unwrap();
        assert_eq!(mesh.point(0), Some(&[2.0, 2.0, 2.0][..]));
        assert_eq!(mesh.point(1), Some(&[1.0, 1.0, 1.0][..]));
        assert_eq!(mesh.point(2), Some(&[0.0, 0.0, 0.0][..]));
    }

    #[test]
    fn relative_indices_use_running_count() {
        // -1 on the first face is v3, on the second face v4.
        let text = "v 0 0 0\nv 1 0 0\nv 2 0 0\nf 1 2 -1\nv 3 0 0\nf 1 2 -1\n";
        let mesh = run_default(text).unwrap();
        assert_eq!(mesh.point_count(), 4);
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 1, 3]);
        assert_eq!(mesh.point(3), Some(&[3.0, 0.0, 0.0][..]));
    }

    #[test]
    fn full_triples_interleave_in_layout_order() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0.25 0.75
vn 0 0 1
f 1/1/1 2/1/1 3/1/1
";
        let mesh = run_default(text).unwrap();
        assert_eq!(mesh.attribute_width(), 8);
        assert_eq!(
            mesh.point(1),
            Some(&[1.0, 0.0, 0.0, 0.25, 0.75, 0.0, 0.0, 1.0][..])
        );
    }

    #[test]
    fn shared_corners_are_deduplicated() {
        let text = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
f 1//1 3//1 4//1
";
        let mesh = run_default(text).unwrap();
        assert_eq!(mesh.point_count(), 4);
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.points().len(), 4 * 6);
    }

    #[test]
    fn same_position_different_normal_is_distinct() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
vn 0 0 -1
f 1//1 2//1 3//1
f 1//2 3//2 2//2
";
        let mesh = run_default(text).unwrap();
        assert_eq!(mesh.point_count(), 6);
        let first = mesh.point(0).unwrap();
        let other = mesh.point(3).unwrap();
        assert_eq!(first[..3], other[..3]);
        assert_relative_eq!(other[5], -1.0);
    }

    #[test]
    fn padded_policy_zero_fills_missing_slots() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0.5 0.5
vn 0 1 0
f 1/1/1 2/1/1 3/1/1
f 1 2 3
";
        let mesh = run_default(text).unwrap();
        assert_eq!(mesh.attribute_width(), 8);
        assert_eq!(mesh.point_count(), 6);
        assert_eq!(
            mesh.point(3),
            Some(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0][..])
        );
        assert_eq!(
            mesh.point(0),
            Some(&[0.0, 0.0, 0.0, 0.5, 0.5, 0.0, 1.0, 0.0][..])
        );
    }

    #[test]
    fn uniform_policy_rejects_missing_slots() {
        let options = LoadOptions {
            attribute_policy: AttributePolicy::Uniform,
            ..Default::default()
        };
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0.5 0.5
vn 0 1 0
f 1/1/1 2/1/1 3/1/1
f 1//1 2//1 3//1
";
        let err = run(text, &options).unwrap_err();
        assert!(matches!(
            err,
            ObjError::MixedAttributes {
                line: 7,
                kind: AttributeKind::Texcoord
            }
        ));
    }

    #[test]
    fn uniform_policy_accepts_consistent_file() {
        let options = LoadOptions {
            attribute_policy: AttributePolicy::Uniform,
            ..Default::default()
        };
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2/1 3/1\n";
        let mesh = run(text, &options).unwrap();
        assert_eq!(mesh.attribute_width(), 5);
        assert_eq!(mesh.point_count(), 3);
    }

    #[test]
    fn texcoord_reference_without_declarations_is_out_of_range() {
        let err = run_default("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1 2/1 3/1\n").unwrap_err();
        assert!(matches!(
            err,
            ObjError::IndexOutOfRange {
                kind: AttributeKind::Texcoord,
                count: 0,
                ..
            }
        ));
    }

    #[test]
    fn forward_reference_is_out_of_range() {
        let err = run_default("v 0 0 0\nv 1 0 0\nf 1 2 3\nv 0 1 0\n").unwrap_err();
        assert!(matches!(
            err,
            ObjError::IndexOutOfRange {
                line: 3,
                kind: AttributeKind::Position,
                index: 3,
                count: 2
            }
        ));
    }

    #[test]
    fn malformed_vertex_aborts() {
        let err = run_default("v 0 0 zero\n").unwrap_err();
        assert!(matches!(err, ObjError::MalformedNumber { line: 1, .. }));
    }

    #[test]
    fn points_are_trimmed_to_unique_count() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nf 1 2 3\nf 3 2 1\n";
        let mesh = run_default(text).unwrap();
        assert_eq!(mesh.point_count(), 3);
        assert_eq!(mesh.triangle_count(), 3);
        let (points, _, _) = mesh.into_parts();
        assert_eq!(points.len(), 9);
    }
}
