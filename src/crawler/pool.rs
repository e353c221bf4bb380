//! Bounded worker pool for city tasks
//!
//! Tasks are spawned onto the tokio runtime immediately but only run while
//! holding a permit of the pool's semaphore, so at most `width` of them make
//! progress at once. Joining drains every submitted task exactly once,
//! including those that panicked.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// How a pool shutdown ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every outstanding task finished within the grace period
    Graceful,

    /// Outstanding tasks had to be aborted and unwound in time
    Aborted { tasks: usize },

    /// Some aborted tasks were still running when the force period elapsed
    Abandoned { tasks: usize },
}

/// A fixed-width pool of async workers
pub struct WorkerPool<T> {
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<T>,
    width: usize,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Creates a pool running at most `width` tasks concurrently
    ///
    /// A width of zero is treated as one.
    pub fn new(width: usize) -> Self {
        let width = width.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(width)),
            tasks: JoinSet::new(),
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of submitted tasks not yet joined
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Queues a task; it starts as soon as a permit is free
    pub fn submit<F>(&mut self, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let semaphore = Arc::clone(&self.semaphore);
        self.tasks.spawn(async move {
            // Never closed, so acquiring can only wait
            let _permit = semaphore.acquire_owned().await.ok();
            task.await
        });
    }

    /// Waits for every submitted task and returns their results in completion order
    pub async fn join_all(&mut self) -> Vec<Result<T, JoinError>> {
        let mut results = Vec::with_capacity(self.tasks.len());
        while let Some(result) = self.tasks.join_next().await {
            results.push(result);
        }
        results
    }

    /// Shuts the pool down, consuming it
    ///
    /// Outstanding tasks get `grace` to finish. Past that they are aborted and
    /// get `force` to unwind; whatever still runs afterwards is abandoned.
    pub async fn shutdown(mut self, grace: Duration, force: Duration) -> ShutdownOutcome {
        if self.tasks.is_empty() {
            return ShutdownOutcome::Graceful;
        }

        if tokio::time::timeout(grace, drain(&mut self.tasks)).await.is_ok() {
            return ShutdownOutcome::Graceful;
        }

        let outstanding = self.tasks.len();
        tracing::warn!(
            "Worker pool did not drain within {:?}, aborting {} tasks",
            grace,
            outstanding
        );
        self.tasks.abort_all();

        if tokio::time::timeout(force, drain(&mut self.tasks)).await.is_ok() {
            ShutdownOutcome::Aborted { tasks: outstanding }
        } else {
            let remaining = self.tasks.len();
            tracing::error!("Worker pool failed to shut down, {} tasks abandoned", remaining);
            ShutdownOutcome::Abandoned { tasks: remaining }
        }
    }
}

async fn drain<T: 'static>(tasks: &mut JoinSet<T>) {
    while tasks.join_next().await.is_some() {}
}
