use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use rowframe::{Relation, Session};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Csv => "csv",
            InputFormat::Json => "json",
        }
    }
}

/// Input selection shared by every subcommand.
#[derive(Args)]
pub struct SourceArgs {
    /// File or directory to read
    input: PathBuf,

    /// Input format (guessed from the extension if not specified)
    #[arg(short, long, value_enum)]
    format: Option<InputFormat>,

    /// Reader option such as `sep=;` or `mode=DROPMALFORMED` (repeatable)
    #[arg(short = 'o', long = "option", value_parser = parse_key_value)]
    options: Vec<(String, String)>,
}

impl SourceArgs {
    /// Read the input. CSV files default to `header=true` and
    /// `inferSchema=true`; `-o` overrides either.
    pub fn open(&self, session: &Session) -> Result<Relation> {
        let mut reader = session.read().header(true).infer_schema(true);
        if let Some(format) = self.format {
            reader = reader.format(format.as_str());
        }
        for (key, value) in &self.options {
            reader = reader.option(key, value)?;
        }
        let relation = reader.load(&self.input)?;

        for report in relation.read_report() {
            if report.error_count() > 0 {
                eprintln!(
                    "Warning: {} malformed record(s) skipped in {}",
                    report.error_count(),
                    report.name
                );
            }
        }
        Ok(relation)
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    Ok((key.trim().to_string(), value.to_string()))
}
