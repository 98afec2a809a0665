//! Error types for each layer of the console
//!
//! Validation failures never reach the network. Transport failures and
//! server rejections share one `ApiError` type so callers can report them
//! the same way.

use crate::model::ResourceKind;

/// Local input problems, caught before any request is sent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0} responses need a file")]
    MissingFile(&'static str),

    #[error("no file selected")]
    NoFileSelected,

    #[error("{0} responses do not take a file")]
    UnexpectedFile(&'static str),

    #[error("cannot read {path}: {reason}")]
    UnreadableFile { path: String, reason: String },

    #[error("{0} is empty")]
    EmptyFile(String),

    #[error("{path} is {size} bytes, the limit is {limit}")]
    FileTooLarge { path: String, size: u64, limit: u64 },
}

/// Failure of a single request against the backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Network error, timeout, or a non-2xx answer without an envelope
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with an envelope whose status is not success
    #[error("rejected by server: {0}")]
    Rejected(String),

    /// The body could not be decoded into the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Human-readable cause, without the category prefix
    pub fn reason(&self) -> &str {
        match self {
            ApiError::Transport(reason) | ApiError::Rejected(reason) | ApiError::Decode(reason) => {
                reason
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Failure of a create/update submission, tagged with the phase that failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("upload failed: {0}")]
    Upload(#[source] ApiError),

    #[error("{0}")]
    Record(#[from] ApiError),
}

/// Session-level error returned by `Console` operations
///
/// By the time one of these is returned the user has already been shown a
/// notification for it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} '{key}' not found")]
    NotFound { kind: ResourceKind, key: String },
}
