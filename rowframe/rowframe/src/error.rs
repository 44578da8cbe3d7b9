//! Error types for sessions, readers, and relations.

use rowframe_arrow::ArrowConvertError;
use rowframe_core::{SchemaError, SourceError, ValueTypeError};
use rowframe_expr::ExprError;

/// Errors produced by [`Session`](crate::Session), [`DataReader`](crate::DataReader)
/// and [`Relation`](crate::Relation).
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// I/O error while listing, opening, or memory-mapping an input.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A format reader failed (malformed row, schema conflict, cancellation, ...).
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Expr(#[from] ExprError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Arrow(#[from] ArrowConvertError),

    /// No [`FormatReader`](rowframe_core::FormatReader) is registered for the
    /// requested format.
    #[error("no reader registered for format '{format}'")]
    NoReader { format: String },

    /// The format was not given and could not be guessed from the path.
    #[error("cannot determine the format of '{path}'; set one with DataReader::format")]
    UnknownFormat { path: String },

    /// A row handed to [`Session::create_relation`](crate::Session::create_relation)
    /// does not fit the schema.
    #[error("row {index} does not match the schema: {source}")]
    RowMismatch {
        index: usize,
        #[source]
        source: ValueTypeError,
    },
}

impl FrameError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
