//! Error types for poml.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages:
//! parse errors carry a source position, data errors the file path, and
//! template errors the binding name.

use crate::document::Position;
use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for poml operations.
///
/// Every variant is terminal for the current render pass.
#[derive(Error, Debug)]
pub enum PomlError {
    // =========================================================================
    // Parse-time (structural)
    // =========================================================================
    /// Root tags absent or mismatched, or any other structural defect.
    #[error("malformed markup at {position}: {reason}")]
    MalformedMarkup { reason: String, position: Position },

    /// A tag outside the recognized set, rejected in strict mode.
    #[error("unknown section tag <{tag}> at {position}")]
    UnknownSectionTag { tag: String, position: Position },

    /// A `{{` opened without a closing `}}`, or a block left open.
    #[error("unterminated template expression at {position}: {detail}")]
    UnterminatedExpression { detail: String, position: Position },

    // =========================================================================
    // Bind-time (data layer)
    // =========================================================================
    /// A data source file does not exist under the base directory.
    #[error("data source not found: {}", path.display())]
    DataSourceNotFound { path: PathBuf },

    /// The `format` attribute names a format we cannot read.
    #[error("unsupported data format '{format}' for {}", path.display())]
    UnsupportedFormat { format: String, path: PathBuf },

    /// The file exists but its content is invalid for the declared format.
    #[error("failed to parse {format} data in {}: {source}", path.display())]
    DataParse {
        path: PathBuf,
        format: String,
        #[source]
        source: anyhow::Error,
    },

    /// Two data sources declare the same binding name under the `error` policy.
    #[error("duplicate binding '{name}' (declared again by {})", path.display())]
    DuplicateBinding { name: String, path: PathBuf },

    /// Reading a file failed for a reason other than it being absent.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Expand-time (template layer)
    // =========================================================================
    /// An expression references a name that is neither bound nor in scope.
    #[error("unresolved binding '{name}' at {position}")]
    UnresolvedBinding { name: String, position: Position },

    /// `#each` targets a value that is not a sequence of records.
    #[error("cannot iterate over '{name}' at {position}: bound value is {found}, not a sequence of records")]
    InvalidIterationTarget {
        name: String,
        found: &'static str,
        position: Position,
    },

    // =========================================================================
    // Ambient
    // =========================================================================
    /// Invalid configuration file or value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// User provided invalid arguments or input.
    #[error("{0}")]
    UserError(String),

    /// The structural pre-check reported problems.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The render pass was cancelled before the named stage.
    #[error("render cancelled before {stage}")]
    Cancelled { stage: &'static str },

    /// The caller-supplied deadline passed before the named stage.
    #[error("render deadline exceeded before {stage}")]
    DeadlineExceeded { stage: &'static str },
}

impl PomlError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            PomlError::MalformedMarkup { .. }
            | PomlError::UnknownSectionTag { .. }
            | PomlError::UnterminatedExpression { .. } => exit_codes::PARSE_FAILURE,
            PomlError::DataSourceNotFound { .. }
            | PomlError::UnsupportedFormat { .. }
            | PomlError::DataParse { .. }
            | PomlError::DuplicateBinding { .. }
            | PomlError::Io { .. } => exit_codes::DATA_FAILURE,
            PomlError::UnresolvedBinding { .. } | PomlError::InvalidIterationTarget { .. } => {
                exit_codes::TEMPLATE_FAILURE
            }
            PomlError::Config(_) | PomlError::UserError(_) => exit_codes::USER_ERROR,
            PomlError::ValidationFailed(_) => exit_codes::VALIDATION_FAILURE,
            PomlError::Cancelled { .. } | PomlError::DeadlineExceeded { .. } => {
                exit_codes::CANCELLED
            }
        }
    }
}

/// Result type alias for poml operations.
pub type Result<T> = std::result::Result<T, PomlError>;
