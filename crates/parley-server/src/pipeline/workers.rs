//! Bounded blocking pool for engine calls.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

/// Why a job did not produce a value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    /// The job outlived its deadline. It keeps running to completion on its
    /// thread; its result is discarded.
    #[error("timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
    /// The job panicked.
    #[error("worker failed: {0}")]
    Panicked(String),
    /// The pool was closed.
    #[error("worker pool closed")]
    Closed,
}

/// Runs blocking jobs on `spawn_blocking`, at most `workers` at a time.
///
/// A permit is held by the blocking thread itself, so a timed-out job still
/// counts against the bound until it actually returns.
#[derive(Clone, Debug)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
    call_timeout: Duration,
}

impl WorkerPool {
    /// Create a pool of `workers` slots with a per-call deadline.
    pub fn new(workers: usize, call_timeout: Duration) -> Self {
        let size = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
            call_timeout,
        }
    }

    /// Pool size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Slots not currently in use.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `job` on a blocking thread once a slot is free.
    ///
    /// The deadline starts when the job is dispatched, not while it waits
    /// for a slot.
    pub async fn run<F, T>(&self, job: F) -> Result<T, WorkerError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| WorkerError::Closed)?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        match tokio::time::timeout(self.call_timeout, handle).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(join)) => Err(WorkerError::Panicked(join.to_string())),
            Err(_) => Err(WorkerError::TimedOut(self.call_timeout)),
        }
    }
}
