//! Process-wide exception policy.
//!
//! A plain shared flag: fail-fast on (first failure aborts the logical
//! execution) or off (tolerable failures are substituted with sane results).
//! The engine snapshots the flag when an execution starts, so flipping it
//! never changes the policy of an in-flight execution.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared fail-fast switch. Cloning shares the underlying flag.
#[derive(Debug, Clone)]
pub struct ExceptionPolicy {
    fail_fast: Arc<AtomicBool>,
}

impl ExceptionPolicy {
    pub fn new(fail_fast: bool) -> Self {
        Self {
            fail_fast: Arc::new(AtomicBool::new(fail_fast)),
        }
    }

    pub fn set_fail_fast(&self, fail_fast: bool) {
        self.fail_fast.store(fail_fast, Ordering::SeqCst);
    }

    /// Read the current flag value. Callers snapshot this once per logical
    /// execution and hold it for the execution's lifetime.
    pub fn is_fail_fast(&self) -> bool {
        self.fail_fast.load(Ordering::SeqCst)
    }
}

impl Default for ExceptionPolicy {
    /// Fail-fast disabled: tolerate and substitute.
    fn default() -> Self {
        Self::new(false)
    }
}
