//! Error types for the GOCAD library.

use crate::util::ElementKind;
use thiserror::Error;

/// Why a buffer cannot be viewed with the requested shape.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferShape {
    /// Item size must be at least 1
    #[error("item size must be > 0 (got {0})")]
    InvalidItemSize(usize),

    /// Buffer length is not a multiple of the item size
    #[error("buffer length ({len}) is not a multiple of item size ({item_size})")]
    InvalidShape { len: usize, item_size: usize },

    /// No buffer was provided
    #[error("a buffer must be provided")]
    MissingBuffer,
}

/// Main error type for GOCAD operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested buffer shape is invalid
    #[error("Malformed buffer: {0}")]
    MalformedBuffer(#[from] BufferShape),

    /// Element access beyond the series count
    #[error("Index {index} out of range (count: {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// Value width does not match the series item size
    #[error("Shape mismatch: expected {expected} components, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Typed access with the wrong element type
    #[error("Kind mismatch: buffer holds {actual}, requested {expected}")]
    KindMismatch {
        expected: ElementKind,
        actual: ElementKind,
    },

    /// ESIZES count disagrees with PROPERTIES count
    #[error("Line {line}: size mismatch between PROPERTIES ({properties}) and ESIZES ({sizes})")]
    AttributeSizeMismatch {
        line: usize,
        properties: usize,
        sizes: usize,
    },

    /// Vertex line carries the wrong number of attribute values
    #[error("Line {line}: wrong number of attributes for vertex, expected {expected} and got {actual}: `{content}`")]
    AttributeArityMismatch {
        line: usize,
        expected: usize,
        actual: usize,
        content: String,
    },

    /// Columns sharing an element space have different counts
    #[error("Column '{column}' has {actual} items, expected {expected}")]
    InconsistentColumnLengths {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Required column is absent
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Column name already present in the table
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// Token that should be numeric does not parse
    #[error("Line {line}: invalid token `{token}`, expected {expected}")]
    InvalidToken {
        line: usize,
        token: String,
        expected: &'static str,
    },

    /// Keyword line is too short for its mandatory fields
    #[error("Line {line}: {keyword} needs {needed} fields, got {got}")]
    MissingToken {
        line: usize,
        keyword: String,
        needed: usize,
        got: usize,
    },

    /// Re-based face index cannot be stored as an unsigned 32-bit index
    #[error("Line {line}: face index {index} out of range after re-basing")]
    InvalidIndex { line: usize, index: i64 },

    /// Layout declaration after vertices of the same part
    #[error("Line {line}: {keyword} must come before the first vertex of a part")]
    MisplacedDeclaration { line: usize, keyword: String },
}

impl Error {
    /// Create an index-out-of-range error.
    pub fn out_of_range(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange { index, count }
    }

    /// Create a shape mismatch error.
    pub fn shape(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// True for errors raised while parsing GOCAD text.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::AttributeSizeMismatch { .. }
                | Self::AttributeArityMismatch { .. }
                | Self::InvalidToken { .. }
                | Self::MissingToken { .. }
                | Self::InvalidIndex { .. }
                | Self::MisplacedDeclaration { .. }
        )
    }

    /// Source line number, for errors tied to a line of input.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::AttributeSizeMismatch { line, .. }
            | Self::AttributeArityMismatch { line, .. }
            | Self::InvalidToken { line, .. }
            | Self::MissingToken { line, .. }
            | Self::InvalidIndex { line, .. }
            | Self::MisplacedDeclaration { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Result type alias for GOCAD operations.
pub type Result<T> = std::result::Result<T, Error>;
