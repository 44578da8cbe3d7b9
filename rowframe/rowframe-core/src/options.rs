//! Reader configuration shared by all format readers.

use std::str::FromStr;

use crate::{error::SourceError, schema::Schema};

/// What a reader does with a malformed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Abort the read on the first malformed record.
    #[default]
    FailFast,
    /// Skip malformed records, recording each in the file's report.
    DropMalformed,
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "failfast" | "fail-fast" => Ok(Self::FailFast),
            "dropmalformed" | "drop-malformed" => Ok(Self::DropMalformed),
            _ => Err(format!(
                "unknown parse mode '{raw}', expected FAILFAST or DROPMALFORMED"
            )),
        }
    }
}

/// Options recognised by the format readers.
///
/// Formats ignore options that do not apply to them (JSON has no header or
/// delimiter, and always infers).
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOptions {
    /// Treat the first record of each CSV file as column names.
    pub header: bool,
    /// Scan CSV values to infer column types instead of reading strings.
    pub infer_schema: bool,
    pub delimiter: u8,
    pub quote: u8,
    pub mode: ParseMode,
    /// Explicit schema; disables inference.
    pub schema: Option<Schema>,
    /// Infer from at most this many records. Fields are then always nullable.
    pub sample_limit: Option<usize>,
    /// Records decoded between cancellation checks.
    pub batch_size: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            header: false,
            infer_schema: false,
            delimiter: b',',
            quote: b'"',
            mode: ParseMode::default(),
            schema: None,
            sample_limit: None,
            batch_size: 1024,
        }
    }
}

impl ReadOptions {
    /// Apply a string option using the Spark-style key names
    /// (`header`, `inferSchema`, `sep`/`delimiter`, `quote`, `mode`,
    /// `samplingLimit`). Keys are case-insensitive.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SourceError> {
        let invalid = |detail: String| SourceError::InvalidOption {
            key: key.to_string(),
            detail,
        };

        match key.to_ascii_lowercase().as_str() {
            "header" => self.header = parse_bool(value).map_err(invalid)?,
            "inferschema" => self.infer_schema = parse_bool(value).map_err(invalid)?,
            "sep" | "delimiter" => self.delimiter = parse_byte(value).map_err(invalid)?,
            "quote" => self.quote = parse_byte(value).map_err(invalid)?,
            "mode" => self.mode = value.parse().map_err(invalid)?,
            "samplinglimit" => {
                let limit = value
                    .parse::<usize>()
                    .map_err(|e| invalid(e.to_string()))?;
                self.sample_limit = Some(limit);
            }
            _ => return Err(invalid("unknown option".to_string())),
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("expected true or false, got '{raw}'")),
    }
}

fn parse_byte(raw: &str) -> Result<u8, String> {
    match raw {
        "\\t" => Ok(b'\t'),
        s if s.len() == 1 => Ok(s.as_bytes()[0]),
        _ => Err(format!("expected a single ASCII character, got '{raw}'")),
    }
}
