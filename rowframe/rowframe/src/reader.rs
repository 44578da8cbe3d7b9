//! File reads: option handling, path expansion, and dispatch to a
//! [`FormatReader`](rowframe_core::FormatReader).

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use memmap2::Mmap;
use rowframe_core::{CancellationToken, ParseMode, ReadOptions, Schema, SourceFormat, SourceInput};
use tracing::{debug, info};

use crate::{error::FrameError, relation::Relation, session::Session};

/// Builder for one read, obtained from [`Session::read`].
///
/// ```no_run
/// # use rowframe::Session;
/// # fn main() -> Result<(), rowframe::FrameError> {
/// let session = Session::new();
/// let retail = session
///     .read()
///     .header(true)
///     .infer_schema(true)
///     .csv("data/retail-data/by-day")?;
/// # Ok(())
/// # }
/// ```
pub struct DataReader<'a> {
    session: &'a Session,
    format: Option<SourceFormat>,
    options: ReadOptions,
    cancel: CancellationToken,
}

impl<'a> DataReader<'a> {
    pub(crate) fn new(session: &'a Session) -> Self {
        let options = ReadOptions {
            batch_size: session.config().batch_size,
            ..ReadOptions::default()
        };
        Self {
            session,
            format: None,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Input format for [`load`](Self::load) (`csv`, `json`, or the name of
    /// a registered custom reader).
    pub fn format(mut self, name: &str) -> Self {
        self.format = Some(SourceFormat::from(name));
        self
    }

    /// Treat the first CSV record of each file as column names.
    pub fn header(mut self, header: bool) -> Self {
        self.options.header = header;
        self
    }

    /// Scan CSV values to infer column types.
    pub fn infer_schema(mut self, infer: bool) -> Self {
        self.options.infer_schema = infer;
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.options.delimiter = delimiter;
        self
    }

    pub fn quote(mut self, quote: u8) -> Self {
        self.options.quote = quote;
        self
    }

    pub fn mode(mut self, mode: ParseMode) -> Self {
        self.options.mode = mode;
        self
    }

    /// Use `schema` instead of inferring one.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.options.schema = Some(schema);
        self
    }

    /// Infer the schema from at most `limit` records.
    pub fn sample_limit(mut self, limit: usize) -> Self {
        self.options.sample_limit = Some(limit);
        self
    }

    /// Apply a string option (`header`, `inferSchema`, `sep`, `quote`,
    /// `mode`, `samplingLimit`).
    pub fn option(mut self, key: &str, value: &str) -> Result<Self, FrameError> {
        self.options.set(key, value)?;
        Ok(self)
    }

    /// Token checked while decoding; cancelling it aborts the read.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn csv(self, path: impl AsRef<Path>) -> Result<Relation, FrameError> {
        self.format("csv").load(path)
    }

    pub fn json(self, path: impl AsRef<Path>) -> Result<Relation, FrameError> {
        self.format("json").load(path)
    }

    /// Read a file, or every file of a directory, as one relation.
    ///
    /// Without an explicit [`format`](Self::format) the format is guessed
    /// from the file extension.
    pub fn load(self, path: impl AsRef<Path>) -> Result<Relation, FrameError> {
        let path = path.as_ref();
        let files = list_files(path)?;
        let format = match &self.format {
            Some(format) => format.clone(),
            None => guess_format(&files).ok_or_else(|| FrameError::UnknownFormat {
                path: path.display().to_string(),
            })?,
        };
        let reader = self.session.format_reader(&format)?;

        let names: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
        let maps = files
            .iter()
            .map(|file| mmap_file(file))
            .collect::<Result<Vec<_>, _>>()?;
        let inputs: Vec<SourceInput<'_>> = names
            .iter()
            .zip(&maps)
            .map(|(name, map)| SourceInput::new(name, map.as_deref().unwrap_or(&[])))
            .collect();

        debug!(path = %path.display(), %format, files = inputs.len(), "reading");
        let table = reader.read(&inputs, &self.options, &self.cancel)?;
        let malformed: usize = table.files.iter().map(|f| f.error_count()).sum();
        info!(
            path = %path.display(),
            %format,
            rows = table.rows.len(),
            fields = table.schema.len(),
            malformed,
            "read complete"
        );

        Ok(Relation::from_rows(
            Arc::clone(self.session.shared_config()),
            table.schema,
            table.rows,
            table.files,
        ))
    }
}

/// A file path as-is, or the visible regular files of a directory sorted by
/// name. Names starting with `.` or `_` (checksums, markers) are skipped.
fn list_files(path: &Path) -> Result<Vec<PathBuf>, FrameError> {
    let metadata = fs::metadata(path).map_err(|e| FrameError::io(path, e))?;
    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| FrameError::io(path, e))? {
        let entry = entry.map_err(|e| FrameError::io(path, e))?;
        let hidden = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || name.starts_with('_'));
        let is_file = entry
            .file_type()
            .map_err(|e| FrameError::io(&entry.path(), e))?
            .is_file();
        if is_file && !hidden {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn guess_format(files: &[PathBuf]) -> Option<SourceFormat> {
    files
        .iter()
        .filter_map(|f| f.extension()?.to_str())
        .find_map(SourceFormat::from_extension)
}

/// Empty files are not mapped.
fn mmap_file(path: &Path) -> Result<Option<Mmap>, FrameError> {
    let file = fs::File::open(path).map_err(|e| FrameError::io(path, e))?;
    let len = file.metadata().map_err(|e| FrameError::io(path, e))?.len();
    if len == 0 {
        return Ok(None);
    }
    let map = unsafe { Mmap::map(&file) }.map_err(|e| FrameError::io(path, e))?;
    Ok(Some(map))
}
