//! Error taxonomy of the execution engine.
//!
//! `BackendError` is what a callback reports when a statement fails against
//! its backend; `ExecutorError` is the engine's caller-facing surface.

use shardflow_error::{ErrorCode, ShardflowError};

/// A backend-reported statement failure: constraint violation, network
/// fault, dialect incompatibility, and the like.
#[derive(Debug, Clone, thiserror::Error)]
#[error("backend failure on '{data_source}': {message}")]
pub struct BackendError {
    pub data_source: String,
    pub message: String,
}

impl BackendError {
    pub fn new(data_source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            message: message.into(),
        }
    }
}

/// Errors escalated to the caller of [`crate::ExecutorEngine::execute`].
///
/// A returned `ExecutorError` always means the whole logical execution was
/// aborted; no partial result sequence accompanies it.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("failed to acquire connection for '{data_source}': {message}")]
    Acquisition { data_source: String, message: String },

    #[error("failed to probe dialect of '{data_source}': {message}")]
    Probe { data_source: String, message: String },

    #[error("execution worker failed: {0}")]
    Worker(String),
}

impl From<ExecutorError> for ShardflowError {
    fn from(err: ExecutorError) -> Self {
        match &err {
            ExecutorError::Backend(cause) => {
                ShardflowError::new(ErrorCode::BackendFailure, err.to_string()).with_details(
                    serde_json::json!({ "data_source": cause.data_source }),
                )
            }
            ExecutorError::Acquisition { data_source, .. } => {
                ShardflowError::new(ErrorCode::AcquisitionFailed, err.to_string())
                    .with_details(serde_json::json!({ "data_source": data_source }))
                    .with_hint("Check pool sizing and backend availability")
            }
            ExecutorError::Probe { data_source, .. } => {
                ShardflowError::new(ErrorCode::ProbeFailed, err.to_string())
                    .with_details(serde_json::json!({ "data_source": data_source }))
            }
            ExecutorError::Worker(_) => {
                ShardflowError::new(ErrorCode::WorkerFailed, err.to_string())
            }
        }
    }
}
