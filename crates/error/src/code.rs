use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error codes following SHARDFLOW-XXXX format.
///
/// ## Code Ranges
/// - **1000-1999**: Connection/resource errors
/// - **2000-2999**: Execution errors
/// - **3000-3999**: Configuration errors
/// - **5000-5999**: Internal/System errors
///
/// Codes are stable across versions (semver contract).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
#[non_exhaustive]
pub enum ErrorCode {
    // === Connection/Resource Errors (1000-1999) ===
    /// SHARDFLOW-1001: Data source not known to the connection layer
    DataSourceNotFound = 1001,
    /// SHARDFLOW-1002: Failed to acquire a connection/statement handle
    AcquisitionFailed = 1002,
    /// SHARDFLOW-1003: Backend identity probe failed
    ProbeFailed = 1003,
    /// SHARDFLOW-1004: Connection pool exhausted
    PoolExhausted = 1004,

    // === Execution Errors (2000-2999) ===
    /// SHARDFLOW-2001: Backend reported a statement failure
    BackendFailure = 2001,
    /// SHARDFLOW-2002: Logical execution aborted by a non-tolerable failure
    ExecutionAborted = 2002,
    /// SHARDFLOW-2003: Execution cancelled before completion
    ExecutionCancelled = 2003,

    // === Configuration Errors (3000-3999) ===
    /// SHARDFLOW-3001: Configuration failed validation
    InvalidConfig = 3001,
    /// SHARDFLOW-3002: Missing required field in config
    MissingRequiredField = 3002,

    // === Internal Errors (5000-5999) ===
    /// SHARDFLOW-5001: Execution worker panicked or was lost
    WorkerFailed = 5001,
    /// SHARDFLOW-5002: Unexpected internal state
    Internal = 5002,

    /// SHARDFLOW-9999: Unknown/unclassified error
    Unknown = 9999,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the formatted code string (e.g., "SHARDFLOW-2001")
    pub fn as_str(&self) -> String {
        format!("SHARDFLOW-{:04}", self.as_u16())
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self.as_u16() {
            1000..=1999 => ErrorCategory::Connection,
            2000..=2999 => ErrorCategory::Execution,
            3000..=3999 => ErrorCategory::Config,
            _ => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> String {
        code.as_str()
    }
}

impl TryFrom<String> for ErrorCode {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        // Parse "SHARDFLOW-XXXX" format
        let num: u16 = s
            .strip_prefix("SHARDFLOW-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| "Invalid format".to_string())?;
        Self::try_from(num).map_err(|_| "Unknown code".to_string())
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(n: u16) -> std::result::Result<Self, Self::Error> {
        match n {
            1001 => Ok(Self::DataSourceNotFound),
            1002 => Ok(Self::AcquisitionFailed),
            1003 => Ok(Self::ProbeFailed),
            1004 => Ok(Self::PoolExhausted),
            2001 => Ok(Self::BackendFailure),
            2002 => Ok(Self::ExecutionAborted),
            2003 => Ok(Self::ExecutionCancelled),
            3001 => Ok(Self::InvalidConfig),
            3002 => Ok(Self::MissingRequiredField),
            5001 => Ok(Self::WorkerFailed),
            5002 => Ok(Self::Internal),
            9999 => Ok(Self::Unknown),
            _ => Err(format!("Unknown error code: {}", n)),
        }
    }
}

/// High-level error category for client-facing classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorCategory {
    Connection,
    Execution,
    Config,
    Internal,
}
