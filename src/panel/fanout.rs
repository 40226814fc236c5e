//! Fan-out coordinator.
//!
//! Runs every worker against the same input concurrently and joins them.
//! Results are index-aligned with the worker list regardless of completion
//! order. The first failure aborts the join and drops the workers still in
//! flight.

use crate::error::{TaskError, TaskResult};
use futures::future::try_join_all;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Something that can be named in logs and timeout errors.
pub trait WorkerId {
    fn worker_id(&self) -> &str;
}

impl WorkerId for super::Persona {
    fn worker_id(&self) -> &str {
        &self.id
    }
}

/// Invoke `call` once per worker and wait for all of them.
///
/// Each call is bounded by `limit` when set.
pub async fn fan_out<'a, W, T, F, Fut>(
    workers: &'a [W],
    limit: Option<Duration>,
    call: F,
) -> TaskResult<Vec<T>>
where
    W: WorkerId,
    F: Fn(&'a W) -> Fut,
    Fut: Future<Output = TaskResult<T>>,
{
    debug!("Fanning out to {} workers", workers.len());

    let calls = workers.iter().enumerate().map(|(index, worker)| {
        let fut = call(worker);
        async move {
            let result = match limit {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(TaskError::Timeout {
                        task: worker.worker_id().to_string(),
                        seconds: limit.as_secs(),
                    }),
                },
                None => fut.await,
            };

            match &result {
                Ok(_) => debug!("Worker {} ({}) finished", index, worker.worker_id()),
                Err(e) => warn!("Worker {} ({}) failed: {}", index, worker.worker_id(), e),
            }
            result
        }
    });

    try_join_all(calls).await
}
