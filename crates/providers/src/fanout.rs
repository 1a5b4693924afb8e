use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time;
use tracing::debug;

use crate::ApiError;

/// Bounded-parallel query coordinator for partitioned inventory sources
/// (cloud regions, zones).
///
/// Every partition query runs as its own task gated by a semaphore, and the
/// call returns only after each dispatched query has reported - a join
/// barrier, not a race. Merged output order across partitions is
/// unspecified; order within one partition's result list is preserved.
///
/// One partition's failure fails the whole fan-out; the remaining tasks are
/// aborted when the set drops.
#[derive(Clone, Debug)]
pub struct FanOutExecutor {
    max_concurrency: usize,
    deadline: Option<Duration>,
}

impl Default for FanOutExecutor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_CONCURRENCY)
    }
}

impl FanOutExecutor {
    pub const DEFAULT_MAX_CONCURRENCY: usize = 15;

    pub fn new(max_concurrency: usize) -> Self {
        Self { max_concurrency: max_concurrency.max(1), deadline: None }
    }

    /// Bound the whole fan-out's wall-clock time. Exceeding the deadline
    /// surfaces as an `ApiError` and cancels still-running workers.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub async fn run<T, Q, F>(&self, partitions: Vec<String>, query: Q) -> Result<Vec<T>, ApiError>
    where
        T: Send + 'static,
        Q: Fn(String) -> F,
        F: Future<Output = Result<Vec<T>, ApiError>> + Send + 'static,
    {
        let barrier = self.join_all(partitions, query);
        match self.deadline {
            Some(deadline) => time::timeout(deadline, barrier)
                .await
                .map_err(|_| ApiError::msg("fan-out deadline exceeded"))?,
            None => barrier.await,
        }
    }

    async fn join_all<T, Q, F>(&self, partitions: Vec<String>, query: Q) -> Result<Vec<T>, ApiError>
    where
        T: Send + 'static,
        Q: Fn(String) -> F,
        F: Future<Output = Result<Vec<T>, ApiError>> + Send + 'static,
    {
        let dispatched = partitions.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut workers = JoinSet::new();

        for partition in partitions {
            let gate = Arc::clone(&semaphore);
            // The future is created here but does no work until its task
            // holds a permit.
            let work = query(partition);
            workers.spawn(async move {
                let _permit = gate
                    .acquire_owned()
                    .await
                    .map_err(|_| ApiError::msg("fan-out semaphore closed"))?;
                work.await
            });
        }

        let mut merged = Vec::new();
        while let Some(joined) = workers.join_next().await {
            let results =
                joined.map_err(|error| ApiError(format!("fan-out worker panicked: {error}")))??;
            merged.extend(results);
        }

        debug!(dispatched, merged = merged.len(), "fan-out complete");
        Ok(merged)
    }
}
