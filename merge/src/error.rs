//! Error types for merge runs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use imaginarium::ImageDesc;

/// Errors that abort a merge run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Neither basename nor --all given")]
    NoBasename,

    #[error("Invalid slice '{0}', expected \"start:stop:step\"")]
    InvalidSlice(String),

    #[error("Slice step must be positive, got {0}")]
    NonPositiveStep(i64),

    #[error("Index {0} is too large to merge")]
    IndexOverflow(i64),

    #[error("Invalid index '{0}' in exclude list")]
    InvalidExclude(String),

    #[error("Invalid filename pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Filename pattern '{pattern}' has no named group '{group}'")]
    MissingCaptureGroup { pattern: String, group: &'static str },

    #[error("Invalid filename template '{template}': {reason}")]
    Template { template: String, reason: String },

    #[error("Verbatim mode needs at least two files, got {0}")]
    TooFewFiles(usize),

    #[error("Verbatim mode requires an explicit --avg or --sum filename")]
    NoOutput,

    #[error(
        "There exist multiple files for the following indices of '{basename}': {indices:?}"
    )]
    DuplicateIndices { basename: String, indices: Vec<i64> },

    #[error("Value does not match the accumulated shape: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Failed to read directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to save '{path}': {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: imaginarium::Error,
    },
}

impl Error {
    /// True for errors caused by invalid settings rather than by the data.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::NoBasename
                | Error::InvalidSlice(_)
                | Error::NonPositiveStep(_)
                | Error::InvalidExclude(_)
                | Error::Pattern(_)
                | Error::MissingCaptureGroup { .. }
                | Error::Template { .. }
                | Error::TooFewFiles(_)
                | Error::NoOutput
        )
    }

    pub(crate) fn shape_mismatch(expected: &ImageDesc, actual: &ImageDesc) -> Self {
        Error::ShapeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
