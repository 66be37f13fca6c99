//! Error types for moneygrowth-core
//!
//! Input-shape errors are raised before any request reaches the store.
//! Store failures are wrapped unchanged in [`CoreError::Store`].

use moneygrowth_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnsupportedInput,
    ColumnsRequired,
    LengthMismatch,
    InvalidIndex,
    InvalidPosition,
    PositionExhausted,
    InvalidPage,
    UnknownSnippet,
    InvalidFormat,
    StoreError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::UnsupportedInput => write!(f, "UNSUPPORTED_INPUT"),
            ErrorCode::ColumnsRequired => write!(f, "COLUMNS_REQUIRED"),
            ErrorCode::LengthMismatch => write!(f, "LENGTH_MISMATCH"),
            ErrorCode::InvalidIndex => write!(f, "INVALID_INDEX"),
            ErrorCode::InvalidPosition => write!(f, "INVALID_POSITION"),
            ErrorCode::PositionExhausted => write!(f, "POSITION_EXHAUSTED"),
            ErrorCode::InvalidPage => write!(f, "INVALID_PAGE"),
            ErrorCode::UnknownSnippet => write!(f, "UNKNOWN_SNIPPET"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::StoreError => write!(f, "STORE_ERROR"),
        }
    }
}

/// Detailed error information shown to the operator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Bad operator input, nothing was sent
    Warning,
    /// A request failed or returned something unusable
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for moneygrowth-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unsupported input: {message}")]
    UnsupportedInput { message: String },

    #[error("Columns must be provided for non-mapping row data")]
    ColumnsRequired,

    #[error("Data has {values} values but {columns} columns were given")]
    LengthMismatch { values: usize, columns: usize },

    #[error("Invalid index: '{index}'")]
    InvalidIndex { index: String },

    #[error("Position column holds a non-numeric value: {value}")]
    InvalidPosition { value: String },

    #[error("No free position left between {after} and {before}")]
    PositionExhausted { after: f64, before: f64 },

    #[error("Invalid page {page} with page size {page_size}")]
    InvalidPage { page: usize, page_size: usize },

    #[error("Unknown snippet: {name}")]
    UnknownSnippet { name: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::UnsupportedInput { .. } => ErrorCode::UnsupportedInput,
            CoreError::ColumnsRequired => ErrorCode::ColumnsRequired,
            CoreError::LengthMismatch { .. } => ErrorCode::LengthMismatch,
            CoreError::InvalidIndex { .. } => ErrorCode::InvalidIndex,
            CoreError::InvalidPosition { .. } => ErrorCode::InvalidPosition,
            CoreError::PositionExhausted { .. } => ErrorCode::PositionExhausted,
            CoreError::InvalidPage { .. } => ErrorCode::InvalidPage,
            CoreError::UnknownSnippet { .. } => ErrorCode::UnknownSnippet,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::Store(_) => ErrorCode::StoreError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::InvalidPosition { .. }
            | CoreError::InvalidFormat { .. }
            | CoreError::Store(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Warning,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::ColumnsRequired => details
                .with_suggestion("Pass the column names with --columns a,b,c.".to_string())
                .with_suggestion("Or pass the row as a JSON object with --json.".to_string()),
            CoreError::LengthMismatch { values, columns } => details
                .with_detail(serde_json::json!({ "values": values, "columns": columns }))
                .with_suggestion("Check the separator used to split the row text.".to_string()),
            CoreError::InvalidIndex { .. } => details.with_suggestion(
                "Use '-' to append, or '<n>+' to insert after the row at index n.".to_string(),
            ),
            CoreError::PositionExhausted { .. } => details.with_suggestion(
                "Renumber the position column before inserting here again.".to_string(),
            ),
            CoreError::UnknownSnippet { name } => details.with_suggestion(format!(
                "Declare a snippet named '{}' under `snippets:` in the config.",
                name
            )),
            CoreError::Store(e) => {
                details.with_detail(serde_json::json!({ "store_message": e.to_string() }))
            }
            _ => details,
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Command being performed
    pub operation: String,
    /// Table the command targeted
    pub table: Option<String>,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            table: None,
        }
    }

    /// Add the target table
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        let table = context.table.as_deref().unwrap_or("-");
        match error.severity() {
            ErrorSeverity::Warning => log::warn!(
                target: "moneygrowth::error",
                "{} - Operation: {} - Table: {}",
                error.to_details(),
                context.operation,
                table
            ),
            ErrorSeverity::Error => log::error!(
                target: "moneygrowth::error",
                "{} - Operation: {} - Table: {}",
                error.to_details(),
                context.operation,
                table
            ),
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::ColumnsRequired.to_string(), "COLUMNS_REQUIRED");
        assert_eq!(ErrorCode::InvalidIndex.to_string(), "INVALID_INDEX");
        assert_eq!(ErrorCode::StoreError.to_string(), "STORE_ERROR");
    }

    #[test]
    fn test_error_severity() {
        assert_eq!(CoreError::ColumnsRequired.severity(), ErrorSeverity::Warning);
        let store = CoreError::from(StoreError::LockPoisoned);
        assert_eq!(store.severity(), ErrorSeverity::Error);
        assert_eq!(store.code(), ErrorCode::StoreError);
    }

    #[test]
    fn test_length_mismatch_details() {
        let details = CoreError::LengthMismatch { values: 2, columns: 3 }.to_details();
        assert_eq!(details.code, ErrorCode::LengthMismatch);
        assert!(details.details.is_some());
        assert!(details.message.contains("2 values"));
    }

    #[test]
    fn test_details_display() {
        let details = CoreError::InvalidIndex { index: "x".to_string() }.to_details();
        let text = details.to_string();
        assert!(text.starts_with("[INVALID_INDEX]"));
        assert!(text.contains("Suggestions:"));
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("add").with_table("transactions");
        assert_eq!(context.operation, "add");
        assert_eq!(context.table.as_deref(), Some("transactions"));
    }
}
