//! Error types for sheetscan.
//!
//! - [`LookupError`] - argument validation and comparator errors from the lookup core
//! - [`TableError`] - CSV reading, decoding and column addressing errors
//! - [`ConfigError`] - invalid environment configuration
//! - [`CliError`] - top-level errors surfaced by the `sheetscan` binary
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Lookup Errors
// =============================================================================

/// Errors raised by the lookup core.
///
/// Every variant terminates the call before a result is produced. A lookup
/// that finds nothing is not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    /// Wrong argument count or unpaired criteria.
    #[error("{0}")]
    Arity(String),

    /// Wrong kind of value at an argument position (1-indexed).
    #[error("Argument {position} must be {expected}")]
    Type {
        position: usize,
        expected: &'static str,
    },

    /// Criteria range length differs from the search range.
    #[error("Range in argument {position} must be the same length as search_range (expected {expected} rows, got {actual})")]
    Shape {
        position: usize,
        expected: usize,
        actual: usize,
    },

    /// No recognized operator prefix.
    #[error("Invalid comparator in '{0}'.")]
    InvalidComparator(String),
}

impl LookupError {
    pub(crate) fn too_few_arguments() -> Self {
        Self::Arity("At least 2 arguments required: match number and search range.".into())
    }

    pub(crate) fn unmatched_criteria_range() -> Self {
        Self::Arity(
            "Each criteria range must have a matching criteria (unmatched criteria range).".into(),
        )
    }
}

// =============================================================================
// Table Errors
// =============================================================================

/// Errors while reading, decoding or addressing a table.
#[derive(Debug, Error)]
pub enum TableError {
    /// Failed to read or write a file.
    #[error("Failed to access file: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid CSV content.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Delimiter must be a single-byte character.
    #[error("Invalid delimiter '{0}': must be an ASCII character")]
    InvalidDelimiter(char),

    /// Column reference matches no header, letter or index.
    #[error("Unknown column '{column}' (available: {available})")]
    UnknownColumn { column: String, available: String },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable holds an unusable value.
    #[error("Invalid value '{value}' for {key}: {message}")]
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },
}

// =============================================================================
// CLI Errors (top-level)
// =============================================================================

/// Top-level errors of the command-line host.
#[derive(Debug, Error)]
pub enum CliError {
    /// Lookup core error.
    #[error("{0}")]
    Lookup(#[from] LookupError),

    /// Table error.
    #[error("{0}")]
    Table(#[from] TableError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON rendering failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error outside table handling.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for lookup operations.
pub type ScanResult<T> = Result<T, LookupError>;

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let lookup_err = LookupError::InvalidComparator("foo".into());
        let cli_err: CliError = lookup_err.into();
        assert!(cli_err.to_string().contains("'foo'"));

        let table_err = TableError::EmptyFile;
        let cli_err: CliError = table_err.into();
        assert!(cli_err.to_string().contains("empty"));
    }

    #[test]
    fn test_shape_error_names_position() {
        let err = LookupError::Shape {
            position: 3,
            expected: 5,
            actual: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("argument 3"));
        assert!(msg.contains("expected 5 rows, got 4"));
    }

    #[test]
    fn test_arity_messages() {
        assert!(LookupError::too_few_arguments()
            .to_string()
            .contains("At least 2 arguments"));
        assert!(LookupError::unmatched_criteria_range()
            .to_string()
            .contains("unmatched criteria range"));
    }
}
