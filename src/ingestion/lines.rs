//! Line splitting and directive classification shared by both passes.

use crate::error::{ObjError, Result};

/// Leading keyword of an OBJ line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `v x y z [w]`
    Position,
    /// `vt u v [w]`
    Texcoord,
    /// `vn x y z`
    Normal,
    /// `f c1 c2 c3 ...`
    Face,
    /// Anything else (comments, groups, materials, smoothing).
    Other,
}

impl Directive {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "v" => Directive::Position,
            "vt" => Directive::Texcoord,
            "vn" => Directive::Normal,
            "f" => Directive::Face,
            _ => Directive::Other,
        }
    }
}

/// One non-blank line with its keyword split off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number in the source text.
    pub number: usize,
    pub directive: Directive,
    /// Everything after the keyword.
    pub args: &'a str,
}

/// Iterate the non-blank lines of `text`.
///
/// `\r\n` endings are normalized. A line longer than `max_line_length`
/// bytes yields `LineTooLong` instead of being truncated.
pub fn lines(text: &str, max_line_length: usize) -> impl Iterator<Item = Result<Line<'_>>> + '_ {
    text.split('\n').enumerate().filter_map(move |(i, raw)| {
        let number = i + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        if raw.len() > max_line_length {
            return Some(Err(ObjError::LineTooLong {
                line: number,
                length: raw.len(),
                max: max_line_length,
            }));
        }

        let trimmed = raw.trim_start();
        let (keyword, args) = trimmed
            .split_once(|c: char| c.is_ascii_whitespace())
            .unwrap_or((trimmed, ""));

        if keyword.is_empty() {
            return None;
        }

        Some(Ok(Line {
            number,
            directive: Directive::from_keyword(keyword),
            args,
        }))
    })
}
