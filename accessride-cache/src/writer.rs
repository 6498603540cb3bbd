//! Fire-and-forget execution of cache writes.
//!
//! [`WriteBehind`] owns a small Tokio runtime and runs each submitted job on
//! its blocking pool, so a slow or unreachable backend never delays the
//! caller. Jobs report their own failures through the logger.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use log::warn;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

/// Threads the writer may use for concurrent backend calls.
const MAX_WRITE_THREADS: usize = 4;

/// Failure to start the background writer.
#[derive(Debug, Error)]
pub enum WriteBehindError {
    /// The Tokio runtime could not be built.
    #[error("failed to build cache writer runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Background executor for cache writes.
pub struct WriteBehind {
    // `Option` so `Drop` can hand the runtime to `shutdown_background`.
    runtime: Option<Runtime>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl fmt::Debug for WriteBehind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteBehind")
            .field("runtime", &"<tokio::runtime::Runtime>")
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl WriteBehind {
    /// Start the writer.
    ///
    /// # Errors
    /// Returns [`WriteBehindError::Runtime`] when the runtime cannot start.
    pub fn new() -> Result<Self, WriteBehindError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(MAX_WRITE_THREADS)
            .thread_name("accessride-cache-writer")
            .build()?;
        Ok(Self {
            runtime: Some(runtime),
            pending: Mutex::new(Vec::new()),
        })
    }

    /// Queue `job` and return immediately.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let Some(runtime) = &self.runtime else {
            warn!("cache writer has shut down; dropping write");
            return;
        };
        let handle = runtime.spawn_blocking(job);
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|task| !task.is_finished());
        pending.push(handle);
    }

    /// Jobs submitted and not yet observed as finished.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|task| !task.is_finished());
        pending.len()
    }

    /// Block until every job submitted so far has finished.
    ///
    /// Intended for shutdown and tests. Must not be called from inside an
    /// async context.
    pub fn flush(&self) {
        let Some(runtime) = &self.runtime else {
            return;
        };
        let handles = std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
        );
        runtime.block_on(async {
            for handle in handles {
                if let Err(err) = handle.await {
                    warn!("cache write task failed: {err}");
                }
            }
        });
    }
}

impl Drop for WriteBehind {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    #[fixture]
    fn writer() -> WriteBehind {
        WriteBehind::new().expect("runtime should build")
    }

    #[rstest]
    fn flush_waits_for_submitted_jobs(writer: WriteBehind) {
        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let counter = Arc::clone(&done);
            writer.submit(move || {
                std::thread::sleep(Duration::from_millis(5));
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        writer.flush();
        assert_eq!(done.load(Ordering::SeqCst), 5);
        assert_eq!(writer.pending_count(), 0);
    }

    #[rstest]
    fn submit_does_not_wait_for_the_job(writer: WriteBehind) {
        let (release, gate) = mpsc::channel::<()>();
        writer.submit(move || {
            // Blocks until the test lets it go.
            let _released = gate.recv();
        });
        assert_eq!(writer.pending_count(), 1);
        release.send(()).expect("job is waiting");
        writer.flush();
    }

    #[rstest]
    fn panicking_job_is_contained(writer: WriteBehind) {
        writer.submit(|| panic!("backend exploded"));
        writer.flush();
        let done = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&done);
        writer.submit(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        writer.flush();
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }
}
