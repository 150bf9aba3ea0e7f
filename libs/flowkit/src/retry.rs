use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Fixed wait between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Total attempts the policy will make, first attempt included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// What to do once every attempt has failed.
///
/// `Fail` surfaces the terminal error. `Fallback` substitutes a
/// pre-constructed value instead; callers opting into it trade visibility
/// of the failure for availability of stale/synthetic data.
#[derive(Debug, Clone)]
pub enum ExhaustionPolicy<T> {
    Fail,
    Fallback(T),
}

impl<T> Default for ExhaustionPolicy<T> {
    fn default() -> Self {
        Self::Fail
    }
}

/// Terminal retry failure: every attempt failed and no fallback applied.
#[derive(Debug, thiserror::Error)]
#[error("retries exhausted after {attempts} attempts: {last}")]
pub struct RetriesExhausted<E: Display + std::fmt::Debug> {
    pub attempts: u32,
    pub last: E,
}

/// Run `op` under `policy`, consulting `on_exhausted` once attempts run out.
///
/// `op` receives the 1-based attempt number. Attempt starts, failures and
/// retry waits are all traced before the final outcome is known.
pub async fn run_with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    on_exhausted: ExhaustionPolicy<T>,
    mut op: F,
) -> Result<T, RetriesExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display + std::fmt::Debug,
{
    let mut attempt = 1;
    loop {
        debug!(attempt, max_attempts = policy.max_attempts(), "attempt starting");
        match op(attempt).await {
            Ok(value) => {
                debug!(attempt, "attempt succeeded");
                return Ok(value);
            }
            Err(e) if attempt >= policy.max_attempts() => {
                warn!(attempts = attempt, error = %e, "retries exhausted");
                return match on_exhausted {
                    ExhaustionPolicy::Fallback(value) => {
                        warn!("substituting fallback value after exhaustion");
                        Ok(value)
                    }
                    ExhaustionPolicy::Fail => Err(RetriesExhausted {
                        attempts: attempt,
                        last: e,
                    }),
                };
            }
            Err(e) => {
                warn!(attempt, error = %e, delay = ?policy.delay, "attempt failed; retrying");
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
