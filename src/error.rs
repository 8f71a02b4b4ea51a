//! # Errors
//!
//! One error type for the whole library, [`SwapError`], plus the recoverable
//! [`ParseError`] that describes a single embedding record skipped during a
//! load. Parse errors are never returned from [`VectorStore::load`]; they are
//! collected into its [`LoadReport`] so one bad line cannot sink a load.
//!
//! [`VectorStore::load`]: crate::vector_store::VectorStore::load
//! [`LoadReport`]: crate::vector_store::LoadReport

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SwapError>;

/// Errors that abort an operation (load / resolve / substitute).
#[derive(Debug, Error)]
pub enum SwapError {
    /// The source could not be read or the sink could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file was present but not valid YAML for [`SwapConfig`](crate::config::SwapConfig).
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Two vectors of different length were compared.
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// A dispatched unit of work returned an error; the batch is considered failed.
    #[error("task {index} failed: {source}")]
    TaskFailure {
        index: usize,
        #[source]
        source: Box<SwapError>,
    },

    /// A dispatched unit of work panicked or was cancelled before it produced a result.
    #[error("task aborted: {reason}")]
    TaskAborted { reason: String },

    /// The batch finished without producing a result for every position.
    #[error("batch incomplete: {missing} of {total} results missing")]
    IncompleteBatch { missing: usize, total: usize },
}

/// Why a single embedding record was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    /// The line held fewer than two comma-separated fields, or an empty word.
    #[error("expected `<word>, <num>, ...`")]
    Malformed,

    /// The line was not valid UTF-8.
    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    /// A vector field was not a finite floating-point number.
    #[error("field {field} is not a finite number: {value:?}")]
    NotANumber { field: usize, value: String },
}

/// A skipped embedding record, tagged with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn is_malformed(&self) -> bool {
        matches!(self.kind, ParseErrorKind::Malformed)
    }
}
