use std::fmt;

/// Input file formats understood by the registered readers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Delimited text (`csv`)
    Csv,
    /// One JSON object per line (`json`)
    JsonLines,
    /// Unknown/custom format
    Unknown(String),
}

impl SourceFormat {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::JsonLines => "json",
            Self::Unknown(s) => s,
        }
    }

    /// Guess the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "jsonl" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

impl From<&str> for SourceFormat {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Self::Csv,
            "json" | "jsonl" | "ndjson" => Self::JsonLines,
            _ => Self::Unknown(s.to_string()),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
