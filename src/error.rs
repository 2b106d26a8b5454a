//! Error types.
//!
//! Internally the crate works with `anyhow` through the `Res<T>` alias so that context can be
//! attached freely. At the public boundary an `anyhow::Error` is wrapped in `Error` together with
//! an `ErrorType`, which lets callers decide how to react (e.g. show a validation message versus
//! treat a stale index as a bug) without matching on strings.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// Result type used inside the crate.
pub(crate) type Res<T> = std::result::Result<T, anyhow::Error>;

/// Result type returned by the public API.
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of an `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Required input was missing or not understandable. Nothing was changed.
    Validation,
    /// A positional index did not exist in the collection. This means the caller is working from a
    /// stale view of the collection.
    OutOfBounds,
    /// An expense id (or id prefix) did not match any record.
    NotFound,
    /// The backing blob store could not be read or written.
    Storage,
    /// The configuration or home directory is missing or invalid.
    Config,
    /// Building or writing an export failed.
    Export,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The public error type.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Converts an internal result into a public `Result` by tagging the error with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}
