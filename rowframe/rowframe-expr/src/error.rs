use rowframe_core::ValueTypeError;

/// Errors raised while binding or evaluating an expression.
#[derive(Debug, thiserror::Error)]
pub enum ExprError {
    /// A column reference names a field the input schema does not have.
    #[error("field '{name}' not found; available fields: [{}]", available.join(", "))]
    FieldNotFound {
        name: String,
        available: Vec<String>,
    },

    /// An operator or function was applied to operands of the wrong type.
    #[error("type mismatch in {op}: {detail}")]
    TypeMismatch { op: String, detail: String },

    #[error("{function} expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        function: &'static str,
        expected: String,
        actual: usize,
    },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("invalid argument to {function}: {detail}")]
    InvalidArgument {
        function: &'static str,
        detail: String,
    },

    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Checked `long` arithmetic overflowed.
    #[error("long overflow in {op}")]
    Overflow { op: String },

    /// A row is narrower than the schema the expression was bound to.
    #[error("column index {index} out of range for row of width {width}")]
    RowWidth { index: usize, width: usize },

    #[error("failed to parse expression '{input}': {detail}")]
    Parse { input: String, detail: String },

    #[error("value type mismatch: {0}")]
    ValueType(#[from] ValueTypeError),
}

impl ExprError {
    pub(crate) fn mismatch(op: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::TypeMismatch {
            op: op.into(),
            detail: detail.into(),
        }
    }
}
