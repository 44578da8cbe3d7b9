//! Per-column type inference over string cells.

use rowframe_core::DataType;

/// Narrowest type that fits every non-empty value seen so far in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CandidateType {
    /// No non-empty value seen yet.
    #[default]
    Empty,
    Boolean,
    Int64,
    Float64,
    /// Encompasses any field.
    Utf8,
}

impl CandidateType {
    pub(crate) fn as_datatype(&self) -> DataType {
        match self {
            // An all-empty column reads as nullable strings.
            Self::Empty | Self::Utf8 => DataType::String,
            Self::Boolean => DataType::Bool,
            Self::Int64 => DataType::I64,
            Self::Float64 => DataType::F64,
        }
    }

    fn classify(input: &str) -> Self {
        if parse_bool(input).is_some() {
            Self::Boolean
        } else if input.parse::<i64>().is_ok() {
            Self::Int64
        } else if input.parse::<f64>().is_ok() {
            Self::Float64
        } else {
            Self::Utf8
        }
    }

    /// Widen this candidate to also accept `input`.
    pub(crate) fn update_from_input(&mut self, input: &str) {
        if *self == Self::Utf8 {
            return;
        }
        *self = self.merge(Self::classify(input));
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Empty, t) | (t, Self::Empty) => t,
            (a, b) if a == b => a,
            (Self::Int64, Self::Float64) | (Self::Float64, Self::Int64) => Self::Float64,
            // Booleans mixed with numbers, or anything mixed with text.
            _ => Self::Utf8,
        }
    }
}

pub(crate) fn parse_bool(input: &str) -> Option<bool> {
    if input.eq_ignore_ascii_case("true") {
        Some(true)
    } else if input.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Column inference state: candidate type plus whether an empty cell was
/// seen.
#[derive(Debug, Clone, Default)]
pub(crate) struct ColumnInference {
    pub(crate) candidate: CandidateType,
    pub(crate) saw_empty: bool,
}

impl ColumnInference {
    pub(crate) fn observe(&mut self, input: &str) {
        if input.is_empty() {
            self.saw_empty = true;
        } else {
            self.candidate.update_from_input(input);
        }
    }
}
