//! # shardflow-error
//!
//! Unified error types for the shardflow distributed SQL executor.
//!
//! All errors carry:
//! - Numeric error codes (SHARDFLOW-XXXX)
//! - Structured JSON details
//! - Actionable hints where we can produce one

mod code;

pub use code::{ErrorCategory, ErrorCode};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The unified error type surfaced at shardflow API boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardflowError {
    /// Numeric error code (e.g., "SHARDFLOW-2001")
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Structured details for programmatic handling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Actionable suggestion for the operator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ShardflowError {
    /// Create a new error with code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            hint: None,
        }
    }

    /// Add structured details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Add an actionable hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Serialize to JSON for API responses
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::warn!("Failed to serialize ShardflowError: {}", e);
            format!(
                r#"{{"code":"{}","message":"Serialization failed"}}"#,
                self.code
            )
        })
    }
}

impl fmt::Display for ShardflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (Hint: {})", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for ShardflowError {}

/// Result type alias for shardflow operations
pub type Result<T> = std::result::Result<T, ShardflowError>;
