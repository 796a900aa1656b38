//! Interfaces to the external connection layer.
//!
//! The engine never opens connections itself: it asks a [`ConnectionProvider`]
//! for one bound statement handle per group, and the handle is released when
//! its owning group task drops it. Ownership is the release discipline; there
//! is no separate `release` call that could be missed on an error path.

use anyhow::Result;
use async_trait::async_trait;
use std::any::Any;

use crate::metadata::DatabaseDialect;
use crate::unit::ConnectionMode;

/// An opaque bound statement resource obtained from the connection layer.
///
/// Dropping the handle returns the underlying connection to its pool.
/// Callbacks downcast via `as_any` to reach their concrete statement type.
pub trait StatementHandle: Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// The external connection/driver layer, interface only.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Acquire a live connection/statement handle for one group.
    ///
    /// Exactly one handle is requested per group key; the engine never shares
    /// a handle across groups.
    async fn acquire(
        &self,
        data_source_name: &str,
        mode: ConnectionMode,
    ) -> Result<Box<dyn StatementHandle>>;

    /// Introspect the backend's real product type over a live connection.
    ///
    /// Called at most once per data source per engine instance; the result is
    /// memoized by [`crate::DataSourceMetadataCache`].
    async fn probe_dialect(
        &self,
        data_source_name: &str,
        handle: &dyn StatementHandle,
    ) -> Result<DatabaseDialect>;
}
