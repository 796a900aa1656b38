//! Distributed SQL execution engine.
//!
//! A logical statement routed into per-data-source execution units is run
//! here against live backend connections, under a caller-supplied connection
//! reuse policy, and comes back as one ordered result sequence.
//!
//! The crate is the orchestration layer only: parsing, routing, the
//! connection pool, and result merging are external collaborators reached
//! through the traits in [`connection`] and [`callback`].
//!
//! - **`unit`**: execution unit/group model and the connection mode.
//! - **`metadata`**: per-data-source dialect cache (single-flight).
//! - **`policy`**: process-wide fail-fast switch.
//! - **`callback`**: per-statement-kind execution strategy.
//! - **`engine`**: the concurrency/ordering/failure orchestration itself.
pub mod callback;
pub mod connection;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod policy;
pub mod unit;

pub use callback::ExecutorCallback;
pub use connection::{ConnectionProvider, StatementHandle};
pub use engine::ExecutorEngine;
pub use error::{BackendError, ExecutorError};
pub use metadata::{DataSourceMetadataCache, DataSourceMetadataEntry, DatabaseDialect};
pub use policy::ExceptionPolicy;
pub use unit::{ConnectionMode, ExecutionGroup, ExecutionUnit, ParamValue, SqlUnit};
