//! The execution engine.
//!
//! Takes the ordered unit sequence one logical statement was routed into,
//! fans it out across backend connections under the caller's connection mode,
//! applies the exception policy per unit, and reassembles results in input
//! order. The caller receives either a complete, order-correct sequence or
//! the first non-tolerable failure; never a partially filled sequence.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use shardflow_common::config::{ExecutorSettings, RetrySettings};
use shardflow_common::retry::retry_async;

use crate::callback::ExecutorCallback;
use crate::connection::ConnectionProvider;
use crate::error::{BackendError, ExecutorError};
use crate::metadata::DataSourceMetadataCache;
use crate::policy::ExceptionPolicy;
use crate::unit::{ConnectionMode, ExecutionGroup, ExecutionUnit};

/// The result of dispatching one unit, before policy is applied.
///
/// Failure handling is a decision over this value rather than unwind-based
/// control flow, which keeps ordering and cancellation explicit.
enum ExecutionOutcome<T> {
    Success(T),
    Failure {
        cause: BackendError,
        unit: ExecutionUnit,
    },
}

/// Orchestrates one logical execution at a time (any number concurrently).
///
/// Holds the engine-scoped state: the metadata cache, the exception policy,
/// and the worker budget bounding concurrent groups.
pub struct ExecutorEngine {
    provider: Arc<dyn ConnectionProvider>,
    metadata: Arc<DataSourceMetadataCache>,
    policy: ExceptionPolicy,
    worker_budget: Arc<Semaphore>,
    retry: RetrySettings,
    active_executions: Arc<AtomicUsize>,
}

impl ExecutorEngine {
    pub fn new(provider: Arc<dyn ConnectionProvider>, settings: &ExecutorSettings) -> Self {
        Self {
            provider,
            metadata: Arc::new(DataSourceMetadataCache::new()),
            policy: ExceptionPolicy::new(settings.fail_fast),
            worker_budget: Arc::new(Semaphore::new(settings.max_workers)),
            retry: settings.retry,
            active_executions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The process-wide exception policy. Mutations apply to executions
    /// started after the change, never to in-flight ones.
    pub fn policy(&self) -> &ExceptionPolicy {
        &self.policy
    }

    pub fn metadata(&self) -> &DataSourceMetadataCache {
        &self.metadata
    }

    pub fn active_executions(&self) -> usize {
        self.active_executions.load(Ordering::Relaxed)
    }

    /// Execute `units` under the policy flag as currently configured.
    pub async fn execute<C>(
        &self,
        units: Vec<ExecutionUnit>,
        mode: ConnectionMode,
        callback: Arc<C>,
    ) -> Result<Vec<C::Output>, ExecutorError>
    where
        C: ExecutorCallback + 'static,
    {
        let fail_fast = self.policy.is_fail_fast();
        self.execute_with_policy(units, mode, fail_fast, callback)
            .await
    }

    /// Execute `units` with an explicit fail-fast snapshot.
    ///
    /// The snapshot is held for the whole execution; a concurrent policy flip
    /// cannot change it mid-flight.
    pub async fn execute_with_policy<C>(
        &self,
        units: Vec<ExecutionUnit>,
        mode: ConnectionMode,
        fail_fast: bool,
        callback: Arc<C>,
    ) -> Result<Vec<C::Output>, ExecutorError>
    where
        C: ExecutorCallback + 'static,
    {
        if units.is_empty() {
            return Ok(Vec::new());
        }

        let total = units.len();
        let started = Instant::now();
        self.active_executions.fetch_add(1, Ordering::Relaxed);
        let result = self.run(units, mode, fail_fast, callback).await;
        self.active_executions.fetch_sub(1, Ordering::Relaxed);

        let degraded = match &result {
            Ok((_, degraded)) => *degraded,
            Err(_) => 0,
        };
        info!(
            target: "executions",
            units = total,
            mode = %mode,
            fail_fast,
            duration_ms = started.elapsed().as_millis() as u64,
            degraded,
            success = result.is_ok()
        );

        result.map(|(values, _)| values)
    }

    async fn run<C>(
        &self,
        units: Vec<ExecutionUnit>,
        mode: ConnectionMode,
        fail_fast: bool,
        callback: Arc<C>,
    ) -> Result<(Vec<C::Output>, usize), ExecutorError>
    where
        C: ExecutorCallback + 'static,
    {
        let total = units.len();
        let groups = ExecutionGroup::build(units, mode);

        let mut tasks: JoinSet<Result<(Vec<(usize, C::Output)>, usize), ExecutorError>> =
            JoinSet::new();
        for group in groups {
            let provider = Arc::clone(&self.provider);
            let metadata = Arc::clone(&self.metadata);
            let callback = Arc::clone(&callback);
            let budget = Arc::clone(&self.worker_budget);
            let retry = self.retry;
            tasks.spawn(async move {
                let _permit = budget
                    .acquire_owned()
                    .await
                    .map_err(|e| ExecutorError::Worker(e.to_string()))?;
                run_group(provider, metadata, callback, retry, group, fail_fast).await
            });
        }

        // Completion order is arbitrary; positions pin results to input order.
        let mut slots: Vec<Option<C::Output>> = (0..total).map(|_| None).collect();
        let mut degraded = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok((entries, group_degraded))) => {
                    degraded += group_degraded;
                    for (index, value) in entries {
                        slots[index] = Some(value);
                    }
                }
                Ok(Err(err)) => {
                    // Best-effort: in-flight dispatches stop at their next
                    // await point; we do not wait for them to wind down.
                    tasks.abort_all();
                    return Err(err);
                }
                Err(join_err) => {
                    tasks.abort_all();
                    return Err(ExecutorError::Worker(join_err.to_string()));
                }
            }
        }

        let mut output = Vec::with_capacity(total);
        for slot in slots {
            output.push(slot.ok_or_else(|| {
                ExecutorError::Worker("missing result for a dispatched unit".to_string())
            })?);
        }
        Ok((output, degraded))
    }
}

/// Run one group on its own connection: acquire, resolve metadata, dispatch
/// members strictly in order, release on drop.
async fn run_group<C>(
    provider: Arc<dyn ConnectionProvider>,
    metadata: Arc<DataSourceMetadataCache>,
    callback: Arc<C>,
    retry: RetrySettings,
    group: ExecutionGroup,
    fail_fast: bool,
) -> Result<(Vec<(usize, C::Output)>, usize), ExecutorError>
where
    C: ExecutorCallback + 'static,
{
    let data_source = group.data_source_name().to_string();
    let mode = group.mode();

    // Acquisition failures are never eligible for sane-result substitution.
    let handle = retry_async("acquire connection", retry, || {
        provider.acquire(&data_source, mode)
    })
    .await
    .map_err(|e| ExecutorError::Acquisition {
        data_source: data_source.clone(),
        message: format!("{e:#}"),
    })?;

    let entry = metadata
        .resolve(provider.as_ref(), &data_source, handle.as_ref())
        .await?;

    let mut resolved = Vec::with_capacity(group.members().len());
    let mut degraded = 0;
    for (index, unit) in group.into_members() {
        let outcome = match callback
            .execute_sql(&unit, handle.as_ref(), mode, entry.dialect)
            .await
        {
            Ok(value) => ExecutionOutcome::Success(value),
            Err(cause) => ExecutionOutcome::Failure { cause, unit },
        };

        match outcome {
            ExecutionOutcome::Success(value) => resolved.push((index, value)),
            ExecutionOutcome::Failure { cause, unit } => {
                // Same dialect on both sides means the failure is a genuine
                // backend error, not a translation gap: always escalate.
                let homogeneous = callback.protocol_dialect() == entry.dialect;
                if homogeneous || fail_fast {
                    return Err(cause.into());
                }
                match callback.sane_result(&unit, &cause) {
                    Some(substitute) => {
                        warn!(
                            data_source = %data_source,
                            sql = %unit.sql_unit.sql,
                            error = %cause,
                            "substituting sane result for tolerated failure"
                        );
                        degraded += 1;
                        resolved.push((index, substitute));
                    }
                    None => return Err(cause.into()),
                }
            }
        }
    }

    // `handle` drops here, returning the connection to its pool. Error paths
    // above and task aborts release it the same way.
    Ok((resolved, degraded))
}
