use std::io;
use std::path::PathBuf;

use crate::ingestion::index::AttributeKind;

/// All error types for the OBJ conversion.
///
/// Every variant is fatal to the current load; no partial mesh is produced.
#[derive(thiserror::Error, Debug)]
pub enum ObjError {
    #[error("Cannot read {}: {source}", .path.display())]
    IoUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Line {line}: malformed number '{token}'")]
    MalformedNumber { line: usize, token: String },
    #[error("Line {line}: {kind} index {index} out of range ({count} declared)")]
    IndexOutOfRange {
        line: usize,
        kind: AttributeKind,
        index: i64,
        count: usize,
    },
    #[error("Line {line}: face has {corners} corners, at least 3 required")]
    DegenerateFace { line: usize, corners: usize },
    #[error("Line {line}: length {length} exceeds the {max} byte limit")]
    LineTooLong { line: usize, length: usize, max: usize },
    #[error("Line {line}: corner {kind} presence differs from the file layout")]
    MixedAttributes { line: usize, kind: AttributeKind },
    #[error("{corners} face corners exceed the 32-bit index range")]
    TooLarge { corners: usize },
    #[error("Output error: {0}")]
    Output(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ObjError>;
