//! Error module
//!
//! Defines the error type shared by the DSV reader and writer using `thiserror`.
//! Clean end of input is never an error: the reader reports it as `Ok(None)`.

use thiserror::Error;

use crate::codec::Record;

/// The error type for every fallible DSV operation.
///
/// # Error Categories
///
/// - **Source errors**: the character source failed while a record was being
///   decoded. The fields decoded up to that point travel with the error.
/// - **Sink errors**: writing or flushing encoded output failed.
/// - **Configuration errors**: a separator/escape pair was rejected, or a
///   configuration file could not be parsed.
///
/// # Example
///
/// ```
/// use dsv_codec::codec::DsvConfig;
/// use dsv_codec::error::DsvError;
///
/// let err = DsvConfig::new(':', ':').unwrap_err();
/// assert!(matches!(err, DsvError::InvalidConfig(_)));
/// ```
#[derive(Error, Debug)]
pub enum DsvError {
    /// Sink I/O error.
    ///
    /// Returned by the writer when the underlying sink rejects a write or a
    /// flush. Bytes accepted before the failure stay written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Character source failure in the middle of a record.
    ///
    /// `partial` holds every field closed before the failure plus the field
    /// that was being accumulated, so callers can keep a best-effort decode.
    #[error("source error at line {line}: {source}")]
    Source {
        /// 1-based physical line the reader was on when the source failed.
        line: u64,
        /// Fields decoded before the failure.
        partial: Record,
        /// The underlying source failure.
        #[source]
        source: std::io::Error,
    },

    /// Rejected separator/escape configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed JSON configuration.
    #[error("Configuration parsing error: {0}")]
    Config(#[from] serde_json::Error),
}

impl DsvError {
    /// Returns the partially decoded record carried by a source error.
    pub fn partial_record(&self) -> Option<&Record> {
        match self {
            DsvError::Source { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// Consumes the error, returning the partially decoded record if any.
    pub fn into_partial_record(self) -> Option<Record> {
        match self {
            DsvError::Source { partial, .. } => Some(partial),
            _ => None,
        }
    }
}
