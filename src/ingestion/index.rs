//! OBJ index resolution and face-corner parsing.

use crate::error::{ObjError, Result};

/// The three independently numbered attribute streams of an OBJ file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Position,
    Texcoord,
    Normal,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Position => "position",
            AttributeKind::Texcoord => "texcoord",
            AttributeKind::Normal => "normal",
        }
    }
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of attributes of each kind declared so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributeCounts {
    pub positions: usize,
    pub texcoords: usize,
    pub normals: usize,
}

impl AttributeCounts {
    pub fn get(&self, kind: AttributeKind) -> usize {
        match kind {
            AttributeKind::Position => self.positions,
            AttributeKind::Texcoord => self.texcoords,
            AttributeKind::Normal => self.normals,
        }
    }
}

/// Resolve a raw OBJ index against `count` declared attributes.
///
/// Positive values are 1-based; zero and negative values count back from
/// the end (`-1` is the latest declaration). Returns `None` when the
/// zero-based offset falls outside `[0, count)`, which includes `0`.
pub fn resolve_index(count: usize, num: i64) -> Option<usize> {
    let offset = if num > 0 {
        num - 1
    } else {
        (count as i64).checked_add(num)?
    };
    usize::try_from(offset).ok().filter(|&o| o < count)
}

/// Resolved attribute offsets of one face corner.
///
/// Identical keys map to the same output vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CornerKey {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

/// Parse one corner token (`p`, `p/t`, `p/t/n` or `p//n`).
///
/// Indices are resolved against `counts`, the running declaration counts at
/// the face's line.
pub fn parse_corner(token: &str, counts: &AttributeCounts, line: usize) -> Result<CornerKey> {
    let mut parts = token.split('/');

    let position = match parts.next() {
        Some(p) if !p.is_empty() => resolve_part(p, AttributeKind::Position, counts, line)?,
        _ => return Err(malformed(token, line)),
    };

    let texcoord = match parts.next() {
        Some(t) if !t.is_empty() => Some(resolve_part(t, AttributeKind::Texcoord, counts, line)?),
        _ => None,
    };

    let normal = match parts.next() {
        Some(n) if !n.is_empty() => Some(resolve_part(n, AttributeKind::Normal, counts, line)?),
        Some(_) => return Err(malformed(token, line)),
        None => None,
    };

    if parts.next().is_some() {
        return Err(malformed(token, line));
    }

    Ok(CornerKey {
        position,
        texcoord,
        normal,
    })
}

fn resolve_part(
    part: &str,
    kind: AttributeKind,
    counts: &AttributeCounts,
    line: usize,
) -> Result<usize> {
    let num: i64 = part.parse().map_err(|_| malformed(part, line))?;
    let count = counts.get(kind);
    resolve_index(count, num).ok_or(ObjError::IndexOutOfRange {
        line,
        kind,
        index: num,
        count,
    })
}

fn malformed(token: &str, line: usize) -> ObjError {
    ObjError::MalformedNumber {
        line,
        token: token.to_string(),
    }
}
