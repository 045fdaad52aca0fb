//! Error types for mesh generation and interchange

use thiserror::Error;

/// Result type for fallible geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Errors raised while building or loading a mesh.
///
/// A failed operation never yields a partial mesh.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// A record with too few fields or a token that is not a number.
    #[error("line {line}: {message}")]
    Malformed {
        /// 1-based line number in the source text.
        line: usize,
        /// What was wrong with the record.
        message: String,
    },

    /// A face refers to a vertex that does not exist.
    #[error("line {line}: face index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// 1-based line number in the source text (face number for in-memory meshes).
        line: usize,
        /// The index as written in the file.
        index: i64,
        /// Vertices available when the face was read.
        vertex_count: usize,
    },

    /// A generator parameter outside its accepted range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },

    #[error("unknown shape `{0}` (expected box, sphere, torus, cone or cylinder)")]
    UnknownShape(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeometryError {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
