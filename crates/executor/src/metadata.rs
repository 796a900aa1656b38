//! Per-data-source metadata resolution and caching.
//!
//! A unit's failure policy depends on the backend's real product type, which
//! costs one round trip to discover. The cache pays that cost once per data
//! source per engine instance; backend identity is assumed stable for the
//! process lifetime, so there is no eviction or re-verification.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

use crate::connection::{ConnectionProvider, StatementHandle};
use crate::error::ExecutorError;

/// The effective backend database flavor a unit is targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDialect {
    MySql,
    Postgres,
    Sqlite,
    Clickhouse,
    #[serde(alias = "duckdb")]
    DuckDb,
}

impl fmt::Display for DatabaseDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseDialect::MySql => write!(f, "mysql"),
            DatabaseDialect::Postgres => write!(f, "postgres"),
            DatabaseDialect::Sqlite => write!(f, "sqlite"),
            DatabaseDialect::Clickhouse => write!(f, "clickhouse"),
            DatabaseDialect::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Resolved facts about one data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceMetadataEntry {
    pub data_source_name: String,
    pub dialect: DatabaseDialect,
}

/// Memoizes [`DataSourceMetadataEntry`] per data source name.
///
/// Concurrent first calls for the same name trigger exactly one probe; the
/// losers wait for the winner's result (single-flight). Scoped to one engine
/// instance, invalidated only by discarding it.
#[derive(Debug, Default)]
pub struct DataSourceMetadataCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<Arc<DataSourceMetadataEntry>>>>>,
}

impl DataSourceMetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the metadata entry for `data_source_name`, probing over
    /// `handle` on first use.
    pub async fn resolve(
        &self,
        provider: &dyn ConnectionProvider,
        data_source_name: &str,
        handle: &dyn StatementHandle,
    ) -> Result<Arc<DataSourceMetadataEntry>, ExecutorError> {
        let cell = {
            let mut entries = self
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            entries
                .entry(data_source_name.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let entry = cell
            .get_or_try_init(|| async {
                let dialect = provider
                    .probe_dialect(data_source_name, handle)
                    .await
                    .map_err(|e| ExecutorError::Probe {
                        data_source: data_source_name.to_string(),
                        message: format!("{e:#}"),
                    })?;
                tracing::debug!(data_source = data_source_name, dialect = %dialect, "resolved data source metadata");
                Ok::<_, ExecutorError>(Arc::new(DataSourceMetadataEntry {
                    data_source_name: data_source_name.to_string(),
                    dialect,
                }))
            })
            .await?;

        Ok(entry.clone())
    }

    /// Number of resolved data sources.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::unit::ConnectionMode;

    struct NullStatement;

    impl StatementHandle for NullStatement {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    struct CountingProvider {
        probes: AtomicUsize,
        fail: bool,
    }

    impl CountingProvider {
        fn new(fail: bool) -> Self {
            Self {
                probes: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl ConnectionProvider for CountingProvider {
        async fn acquire(
            &self,
            _data_source_name: &str,
            _mode: ConnectionMode,
        ) -> anyhow::Result<Box<dyn StatementHandle>> {
            Ok(Box::new(NullStatement))
        }

        async fn probe_dialect(
            &self,
            _data_source_name: &str,
            _handle: &dyn StatementHandle,
        ) -> anyhow::Result<DatabaseDialect> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            // Yield so concurrent resolvers overlap inside the initializer
            tokio::task::yield_now().await;
            if self.fail {
                Err(anyhow!("backend unreachable"))
            } else {
                Ok(DatabaseDialect::Postgres)
            }
        }
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let provider = CountingProvider::new(false);
        let cache = DataSourceMetadataCache::new();
        let handle = NullStatement;

        let first = cache.resolve(&provider, "ds_0", &handle).await.unwrap();
        let second = cache.resolve(&provider, "ds_0", &handle).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.probes.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_use_probes_once() {
        let provider = Arc::new(CountingProvider::new(false));
        let cache = Arc::new(DataSourceMetadataCache::new());

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let provider = provider.clone();
                let cache = cache.clone();
                tokio::spawn(async move {
                    let handle = NullStatement;
                    cache.resolve(provider.as_ref(), "ds_0", &handle).await
                })
            })
            .collect();

        for task in tasks {
            let entry = task.await.unwrap().unwrap();
            assert_eq!(entry.dialect, DatabaseDialect::Postgres);
        }
        assert_eq!(provider.probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_names_probe_separately() {
        let provider = CountingProvider::new(false);
        let cache = DataSourceMetadataCache::new();
        let handle = NullStatement;

        cache.resolve(&provider, "ds_0", &handle).await.unwrap();
        cache.resolve(&provider, "ds_1", &handle).await.unwrap();

        assert_eq!(provider.probes.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_probe_is_not_cached() {
        let provider = CountingProvider::new(true);
        let cache = DataSourceMetadataCache::new();
        let handle = NullStatement;

        let err = cache.resolve(&provider, "ds_0", &handle).await.unwrap_err();
        assert!(matches!(err, ExecutorError::Probe { .. }));
        assert!(cache.is_empty());

        // A later attempt may probe again
        let _ = cache.resolve(&provider, "ds_0", &handle).await;
        assert_eq!(provider.probes.load(Ordering::SeqCst), 2);
    }
}
