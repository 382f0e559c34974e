//! Error type shared by all phases of a streaming unit run.

use thiserror::Error;

/// Errors raised while configuring or executing a streaming unit.
///
/// Every error aborts the current run; nothing is retried.
#[derive(Debug, Error)]
pub enum StreamingError {
    /// Invalid parameters, detected before any input line is processed.
    #[error("Streaming configuration error: {0}")]
    Configuration(String),

    #[error("Input line does not have enough fields. expected at least {expected}, line={line:?}")]
    MalformedLine { expected: usize, line: String },

    #[error(
        "Group values can only be enumerated once. To enumerate them multiple times, \
         collect them into a buffer first, e.g. `let values: Vec<String> = group.values()?.collect();`"
    )]
    GroupReenumerated,

    /// Failure reported by user supplied mapper/combiner/reducer code.
    #[error("Task failed: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse parameter file: {0}")]
    ParameterFile(#[from] toml::de::Error),
}

impl StreamingError {
    /// Convenience constructor for errors raised from user code.
    pub fn task<S: Into<String>>(msg: S) -> StreamingError {
        StreamingError::Task(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, StreamingError>;
