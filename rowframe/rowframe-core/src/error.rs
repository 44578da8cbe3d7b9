//! Error types for the data model and the reader layer.

/// A value did not have the variant an accessor expected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("expected {expected}, found {actual}")]
pub struct ValueTypeError {
    pub expected: String,
    pub actual: String,
}

impl ValueTypeError {
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Violations of the schema invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// Two fields share a name.
    #[error("duplicate field name '{name}'")]
    DuplicateField { name: String },

    /// A referenced field does not exist.
    #[error("field '{name}' not found; available fields: [{}]", available.join(", "))]
    FieldNotFound {
        name: String,
        available: Vec<String>,
    },
}

/// A single input record that could not be decoded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("malformed row at {file}:{line}: {detail}")]
pub struct RowParseError {
    /// Name of the input the record came from.
    pub file: String,
    /// 1-based line number of the record start.
    pub line: u64,
    pub detail: String,
}

impl RowParseError {
    pub fn new(file: impl Into<String>, line: u64, detail: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            detail: detail.into(),
        }
    }
}

/// Error returned by [`FormatReader`](crate::FormatReader) implementations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A malformed record aborted a fail-fast read.
    #[error(transparent)]
    RowParse(#[from] RowParseError),

    /// Records disagree on the shape of a field in a way that has no common
    /// supertype (e.g. object in one record, scalar in another).
    #[error("conflicting types for field '{field}': {existing} vs {found}")]
    SchemaConflict {
        field: String,
        existing: String,
        found: String,
    },

    /// A reader option key or value was not understood.
    #[error("invalid read option '{key}': {detail}")]
    InvalidOption { key: String, detail: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The caller cancelled the read.
    #[error("read cancelled")]
    Cancelled,
}
