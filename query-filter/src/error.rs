/// Whose fault a failed search is. The web layer maps `Client` to a bad
/// request and `Internal` to a server error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Client,
    Internal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    UnknownField(String),
    UnknownOperator(String),
    ComparisonToNull,
    UnexpectedArgument(String),
    InvalidArgument {
        field: String,
        op: String,
        reason: String,
    },
    MalformedFilter(String),
    Internal(String),
}

impl FilterError {
    pub(crate) fn invalid_argument(field: &str, op: &str, reason: impl Into<String>) -> Self {
        FilterError::InvalidArgument {
            field: field.to_string(),
            op: op.to_string(),
            reason: reason.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            FilterError::Internal(_) => ErrorClass::Internal,
            _ => ErrorClass::Client,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.class() == ErrorClass::Client
    }

    /// Stable machine-readable name of the error kind.
    pub fn cause(&self) -> &'static str {
        match self {
            FilterError::UnknownField(_) => "unknown_field",
            FilterError::UnknownOperator(_) => "unknown_operator",
            FilterError::ComparisonToNull => "comparison_to_null",
            FilterError::UnexpectedArgument(_) => "unexpected_argument",
            FilterError::InvalidArgument { .. } => "invalid_argument",
            FilterError::MalformedFilter(_) => "malformed_filter",
            FilterError::Internal(_) => "internal_compilation_error",
        }
    }
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::UnknownField(field) => {
                write!(f, "Invalid filter object: No such field \"{}\"", field)
            }
            FilterError::UnknownOperator(op) => {
                write!(f, "Invalid filter object: Unknown operator \"{}\"", op)
            }
            FilterError::ComparisonToNull => write!(
                f,
                "To compare a value to NULL, use the is_null/is_not_null operators."
            ),
            FilterError::UnexpectedArgument(op) => {
                write!(f, "Operator \"{}\" does not take an argument", op)
            }
            FilterError::InvalidArgument { field, op, reason } => write!(
                f,
                "Invalid argument for \"{}\" {}: {}",
                field, op, reason
            ),
            FilterError::MalformedFilter(msg) => write!(f, "Malformed filter object: {}", msg),
            FilterError::Internal(msg) => write!(f, "Unable to construct query: {}", msg),
        }
    }
}

impl std::error::Error for FilterError {}
