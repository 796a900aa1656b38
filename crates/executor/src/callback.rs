//! The per-statement-kind execution strategy.
//!
//! The engine knows how to schedule units; callbacks know how to run one unit
//! against a backend and how to synthesize a neutral substitute when a
//! tolerated failure leaves a hole in the result sequence. One implementation
//! per statement category (query, update, ...), supplied by the caller.

use async_trait::async_trait;

use crate::connection::StatementHandle;
use crate::error::BackendError;
use crate::metadata::DatabaseDialect;
use crate::unit::{ConnectionMode, ExecutionUnit};

#[async_trait]
pub trait ExecutorCallback: Send + Sync {
    type Output: Send + 'static;

    /// The declared protocol dialect of the logical statement.
    ///
    /// When a unit's backend resolves to the same dialect, a failure there is
    /// a genuine backend error and is always escalated; only a cross-dialect
    /// failure may be tolerated.
    fn protocol_dialect(&self) -> DatabaseDialect;

    /// Run one unit over its bound statement handle.
    ///
    /// Must be safe to invoke concurrently across independent handles; the
    /// engine never calls it concurrently on the same handle.
    async fn execute_sql(
        &self,
        unit: &ExecutionUnit,
        statement: &dyn StatementHandle,
        mode: ConnectionMode,
        storage_dialect: DatabaseDialect,
    ) -> Result<Self::Output, BackendError>;

    /// Produce a semantically neutral substitute for a failed unit, e.g. an
    /// empty result set. `None` means the failure is not tolerable and must
    /// propagate, aborting the logical execution.
    fn sane_result(&self, unit: &ExecutionUnit, cause: &BackendError) -> Option<Self::Output>;
}
