use parking_lot::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Result returned by background tasks owned by a scope.
type TaskResult = anyhow::Result<()>;

/// Reason why a scope finished stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every task had already returned before cancellation was requested.
    Finished,
    /// Tasks returned after the scope's token was cancelled.
    Cancelled,
    /// At least one task missed the deadline and was aborted.
    Timeout,
}

/// A scoped set of cancellable background tasks.
///
/// Tasks spawned on the scope share one `CancellationToken` and are
/// released deterministically by `stop`: the token is cancelled first,
/// then every handle is awaited up to the deadline, and stragglers are
/// aborted. Dropping the scope cancels and aborts whatever is left.
///
/// Concurrency notes:
/// - The handle list is behind a `Mutex` with minimal locking scope.
/// - `stop` may be called once; later calls see an empty handle list and
///   return `Finished`.
pub struct TaskScope {
    cancel: CancellationToken,
    handles: Mutex<Vec<(String, JoinHandle<()>)>>,
}

impl TaskScope {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Child token sharing the scope's cancellation lifetime.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Spawn a named task using `make(cancel)`.
    ///
    /// The task must return when its token is cancelled. Errors are logged,
    /// not propagated: a scope task failing is an operational event, and the
    /// scope keeps running.
    pub fn spawn<F, Fut>(&self, name: &str, make: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = TaskResult> + Send + 'static,
    {
        let token = self.cancel.child_token();
        let task_name = name.to_string();
        let handle = tokio::spawn(async move {
            tracing::debug!(task = %task_name, "scope task started");
            if let Err(e) = make(token).await {
                tracing::error!(task = %task_name, error = %e, "scope task error");
            } else {
                tracing::debug!(task = %task_name, "scope task finished");
            }
        });
        self.handles.lock().push((name.to_string(), handle));
    }

    /// Number of tasks spawned and not yet reaped by `stop`.
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }

    /// Request cancellation and wait up to `timeout` for every task.
    #[tracing::instrument(skip(self, timeout), level = "debug")]
    pub async fn stop(&self, timeout: Duration) -> StopReason {
        let handles = { std::mem::take(&mut *self.handles.lock()) };

        let all_finished_before = handles.iter().all(|(_, h)| h.is_finished());
        self.cancel.cancel();

        let deadline = tokio::time::Instant::now() + timeout;
        let mut timed_out = false;

        for (name, mut handle) in handles {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.is_cancelled() => tracing::debug!(task = %name, "task aborted"),
                Ok(Err(e)) => tracing::warn!(task = %name, error = %e, "task join error"),
                Err(_elapsed) => {
                    tracing::warn!(task = %name, "scope stop timed out; aborting task");
                    handle.abort();
                    timed_out = true;
                    // Reap the abort; a cancelled join is expected here.
                    match handle.await {
                        Ok(()) => {}
                        Err(e) if e.is_cancelled() => {
                            tracing::debug!(task = %name, "task aborted")
                        }
                        Err(e) => tracing::warn!(task = %name, error = %e, "task join error"),
                    }
                }
            }
        }

        let reason = if timed_out {
            StopReason::Timeout
        } else if all_finished_before {
            StopReason::Finished
        } else {
            StopReason::Cancelled
        };
        tracing::info!(?reason, "task scope stopped");
        reason
    }
}

impl Default for TaskScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskScope {
    /// Best-effort cleanup to avoid orphaned tasks if the caller forgot `stop`.
    fn drop(&mut self) {
        self.cancel.cancel();
        for (_, handle) in self.handles.get_mut().drain(..) {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    #[tokio::test]
    async fn stop_cancels_running_tasks() {
        let scope = TaskScope::new();
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_clone = cancelled.clone();

        scope.spawn("waiter", move |cancel| async move {
            cancel.cancelled().await;
            cancelled_clone.store(true, Ordering::SeqCst);
            Ok(())
        });

        let reason = scope.stop(Duration::from_secs(1)).await;
        assert_eq!(reason, StopReason::Cancelled);
        assert!(cancelled.load(Ordering::SeqCst));
        assert!(scope.is_empty());
    }

    #[tokio::test]
    async fn stop_after_tasks_finished_reports_finished() {
        let scope = TaskScope::new();
        scope.spawn("quick", |_cancel| async move { Ok(()) });

        // Let the task run to completion before stopping.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let reason = scope.stop(Duration::from_secs(1)).await;
        assert_eq!(reason, StopReason::Finished);
    }

    #[tokio::test]
    async fn stop_aborts_tasks_that_ignore_cancellation() {
        let scope = TaskScope::new();
        scope.spawn("stubborn", |_cancel| async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        });

        let reason = scope.stop(Duration::from_millis(50)).await;
        assert_eq!(reason, StopReason::Timeout);
    }

    #[tokio::test]
    async fn task_errors_do_not_poison_the_scope() {
        let scope = TaskScope::new();
        scope.spawn("failing", |_cancel| async move { anyhow::bail!("boom") });
        scope.spawn("healthy", move |cancel| async move {
            cancel.cancelled().await;
            Ok(())
        });

        let reason = scope.stop(Duration::from_secs(1)).await;
        assert!(matches!(reason, StopReason::Cancelled | StopReason::Finished));
    }
}
