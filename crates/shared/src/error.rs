use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body shape the graph service emits on non-success responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

/// Controller-boundary error taxonomy. `Validation` failures are detected
/// locally and never reach the network; `Retrieval` covers any non-success
/// or transport failure from the graph service. Both are recoverable: the
/// in-flight action terminates without mutating graph/history/view state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExplorerError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("retrieval failed: {0}")]
    Retrieval(String),
}

impl ExplorerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }
}
