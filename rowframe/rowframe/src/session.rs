//! Session entry point and configuration.

use std::{collections::HashMap, sync::Arc};

use rowframe_core::{FormatReader, Row, Schema, SourceFormat};
#[cfg(feature = "csv")]
use rowframe_csv::CsvReader;
#[cfg(feature = "json")]
use rowframe_json::JsonLinesReader;

use crate::{error::FrameError, reader::DataReader, relation::Relation};

/// Settings shared by every relation created from a [`Session`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub app_name: String,
    /// Records decoded between cancellation checks.
    pub batch_size: usize,
    /// Number of row ranges aggregating actions split a scan into.
    pub target_partitions: usize,
    /// Rows printed by [`Relation::show_default`].
    pub show_rows: usize,
    /// Cells longer than this are cut when `show` truncates.
    pub truncate_width: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_name: "rowframe".to_string(),
            batch_size: 1024,
            target_partitions: rayon::current_num_threads(),
            show_rows: 20,
            truncate_width: 20,
        }
    }
}

/// Entry point: holds the configuration and the registered format readers.
pub struct Session {
    config: Arc<SessionConfig>,
    readers: HashMap<SourceFormat, Arc<dyn FormatReader>>,
}

/// Builder for configuring [`Session`].
pub struct SessionBuilder {
    config: SessionConfig,
    readers: Vec<Arc<dyn FormatReader>>,
}

impl Session {
    /// Create a builder for [`Session`].
    pub fn builder() -> SessionBuilder {
        SessionBuilder {
            config: SessionConfig::default(),
            readers: Vec::new(),
        }
    }

    /// A session with default settings and the built-in readers.
    pub fn new() -> Self {
        Self::builder().with_default_readers().build()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Register a reader, replacing any reader for the same format.
    pub fn register_format_reader(&mut self, reader: Box<dyn FormatReader>) {
        self.register_shared_format_reader(Arc::from(reader));
    }

    pub fn register_shared_format_reader(&mut self, reader: Arc<dyn FormatReader>) {
        self.readers.insert(reader.format(), reader);
    }

    pub(crate) fn format_reader(
        &self,
        format: &SourceFormat,
    ) -> Result<&Arc<dyn FormatReader>, FrameError> {
        self.readers.get(format).ok_or_else(|| FrameError::NoReader {
            format: format.to_string(),
        })
    }

    pub(crate) fn shared_config(&self) -> &Arc<SessionConfig> {
        &self.config
    }

    /// Start configuring a file read.
    pub fn read(&self) -> DataReader<'_> {
        DataReader::new(self)
    }

    /// Build a relation from in-memory rows. Every row must conform to
    /// `schema`.
    pub fn create_relation(&self, schema: Schema, rows: Vec<Row>) -> Result<Relation, FrameError> {
        for (index, row) in rows.iter().enumerate() {
            row.conforms_to(&schema)
                .map_err(|source| FrameError::RowMismatch { index, source })?;
        }
        Ok(Relation::from_rows(
            Arc::clone(&self.config),
            schema,
            rows,
            Vec::new(),
        ))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.config.app_name = name.into();
        self
    }

    /// Set the number of records between cancellation checks (default: 1024).
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size.max(1);
        self
    }

    /// Set how many partitions aggregations use (default: rayon thread count).
    pub fn with_target_partitions(mut self, partitions: usize) -> Self {
        self.config.target_partitions = partitions.max(1);
        self
    }

    pub fn with_show_rows(mut self, rows: usize) -> Self {
        self.config.show_rows = rows;
        self
    }

    pub fn with_truncate_width(mut self, width: usize) -> Self {
        self.config.truncate_width = width;
        self
    }

    /// Register a format reader.
    pub fn with_format_reader(mut self, reader: Box<dyn FormatReader>) -> Self {
        self.readers.push(Arc::from(reader));
        self
    }

    /// Register all built-in readers (CSV, JSON lines).
    pub fn with_default_readers(self) -> Self {
        let s = self;
        #[cfg(feature = "csv")]
        let s = s.with_format_reader(Box::new(CsvReader::new()));
        #[cfg(feature = "json")]
        let s = s.with_format_reader(Box::new(JsonLinesReader::new()));
        s
    }

    /// Build the session.
    pub fn build(self) -> Session {
        let mut session = Session {
            config: Arc::new(self.config),
            readers: HashMap::new(),
        };
        for reader in self.readers {
            session.register_shared_format_reader(reader);
        }
        session
    }
}
