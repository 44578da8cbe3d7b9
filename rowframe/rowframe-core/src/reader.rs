//! Reader contract implemented by the file format crates.

use crate::{
    cancel::CancellationToken,
    error::{RowParseError, SourceError},
    format::SourceFormat,
    options::{ParseMode, ReadOptions},
    row::Row,
    schema::Schema,
};

/// One input file handed to a [`FormatReader`].
#[derive(Debug, Clone, Copy)]
pub struct SourceInput<'a> {
    /// Display name used in reports and errors (usually the path).
    pub name: &'a str,
    pub data: &'a [u8],
}

impl<'a> SourceInput<'a> {
    pub fn new(name: &'a str, data: &'a [u8]) -> Self {
        Self { name, data }
    }
}

/// Per-file outcome of a read.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileReport {
    pub name: String,
    /// Rows successfully decoded from this file.
    pub rows: usize,
    /// Records skipped under [`ParseMode::DropMalformed`].
    pub malformed: Vec<RowParseError>,
}

impl FileReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn error_count(&self) -> usize {
        self.malformed.len()
    }

    /// Apply the parse mode to a malformed record: fail-fast returns the
    /// error, drop-malformed records it and lets the read continue.
    pub fn reject(&mut self, mode: ParseMode, error: RowParseError) -> Result<(), SourceError> {
        match mode {
            ParseMode::FailFast => Err(error.into()),
            ParseMode::DropMalformed => {
                self.malformed.push(error);
                Ok(())
            }
        }
    }
}

/// Rows decoded from one or more inputs under a single schema.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTable {
    pub schema: Schema,
    pub rows: Vec<Row>,
    /// One report per input, in input order.
    pub files: Vec<FileReport>,
}

/// Decodes raw file bytes into typed rows.
///
/// Implementations are registered with `rowframe::Session` and dispatched
/// by [`SourceFormat`].
pub trait FormatReader: Send + Sync {
    /// Returns the format this reader handles.
    fn format(&self) -> SourceFormat;

    /// Decode all `inputs` into one table with a common schema.
    ///
    /// Implementations check `cancel` at least every
    /// [`ReadOptions::batch_size`] records.
    fn read(
        &self,
        inputs: &[SourceInput<'_>],
        options: &ReadOptions,
        cancel: &CancellationToken,
    ) -> Result<DecodedTable, SourceError>;
}
