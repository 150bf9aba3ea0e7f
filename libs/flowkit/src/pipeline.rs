//! Debounced search pipeline.
//!
//! An explicit state machine replacing the usual reactive-operator chain
//! (`debounce -> distinct -> filter -> switch-to-latest`): one task owns
//! the quiet-window timer, the dedup memory and a monotonically increasing
//! fetch generation. A fetch result is applied only while its generation
//! is still current, which gives switch-to-latest semantics without
//! aborting in-flight work.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::rules::QueryRules;
use crate::scope::TaskScope;

/// Failure of one logical search fetch.
#[derive(Debug, Clone, thiserror::Error)]
#[error("search fetch failed: {message}")]
pub struct FetchFailed {
    pub message: String,
}

impl FetchFailed {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Port for issuing one logical search; swappable for real transport.
#[async_trait]
pub trait SearchFetcher: Send + Sync + 'static {
    type Item: Send + Clone + 'static;

    async fn search(&self, query: &str) -> Result<Vec<Self::Item>, FetchFailed>;
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Quiet window an input must survive before it proceeds.
    pub quiet_window: Duration,
    pub rules: QueryRules,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quiet_window: Duration::from_millis(400),
            rules: QueryRules::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Pending,
    Validating,
    Fetching,
}

/// Handle to a running pipeline: submit raw text-change events, observe
/// result lists and the loading flag through `watch` channels.
pub struct SearchPipeline<T> {
    input: mpsc::UnboundedSender<String>,
    results: watch::Receiver<Vec<T>>,
    loading: watch::Receiver<bool>,
}

impl<T> SearchPipeline<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Spawn the pipeline task on `scope` and return the handle.
    ///
    /// `initial` seeds the result list shown before any search ran.
    pub fn spawn(
        scope: &TaskScope,
        config: PipelineConfig,
        fetcher: Arc<dyn SearchFetcher<Item = T>>,
        initial: Vec<T>,
    ) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (results_tx, results_rx) = watch::channel(initial);
        let (loading_tx, loading_rx) = watch::channel(false);

        let task = PipelineTask {
            config,
            fetcher,
            input: input_rx,
            results: results_tx,
            loading: loading_tx,
            state: State::Idle,
            pending: None,
            deadline: None,
            last_debounced: None,
            generation: 0,
            inflight: JoinSet::new(),
        };
        scope.spawn("search-pipeline", move |cancel| task.run(cancel));

        Self {
            input: input_tx,
            results: results_rx,
            loading: loading_rx,
        }
    }

    /// Feed one raw text-change event into the pipeline.
    pub fn submit(&self, query: impl Into<String>) {
        // A closed channel only means the task is gone (scope shut down).
        let _ = self.input.send(query.into());
    }

    pub fn results(&self) -> watch::Receiver<Vec<T>> {
        self.results.clone()
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.clone()
    }
}

struct PipelineTask<T> {
    config: PipelineConfig,
    fetcher: Arc<dyn SearchFetcher<Item = T>>,
    input: mpsc::UnboundedReceiver<String>,
    results: watch::Sender<Vec<T>>,
    loading: watch::Sender<bool>,
    state: State,
    /// Latest raw input while the quiet window is open.
    pending: Option<String>,
    deadline: Option<tokio::time::Instant>,
    /// Dedup memory: the last value that survived the quiet window,
    /// whether or not it validated.
    last_debounced: Option<String>,
    /// Stamp of the most recently dispatched fetch.
    generation: u64,
    /// In-flight fetches; dropped (and thereby aborted) with the task.
    inflight: JoinSet<(u64, Result<Vec<T>, FetchFailed>)>,
}

impl<T> PipelineTask<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn run(mut self, cancel: CancellationToken) -> anyhow::Result<()> {
        loop {
            let deadline = self.deadline;
            let quiet_elapsed = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("search pipeline cancelled");
                    break;
                }
                ev = self.input.recv() => match ev {
                    Some(query) => self.on_input(query),
                    None => {
                        debug!("input channel closed; search pipeline exiting");
                        break;
                    }
                },
                _ = quiet_elapsed => self.on_quiet_window_elapsed(),
                Some(joined) = self.inflight.join_next() => match joined {
                    Ok((generation, result)) => self.on_fetch_settled(generation, result),
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => warn!(error = %e, "search fetch task panicked"),
                },
            }
        }
        Ok(())
    }

    /// Any input supersedes whatever the pipeline was doing and re-opens
    /// the quiet window with the newest value.
    fn on_input(&mut self, query: String) {
        self.transition(State::Pending);
        self.pending = Some(query);
        self.deadline = Some(tokio::time::Instant::now() + self.config.quiet_window);
    }

    fn on_quiet_window_elapsed(&mut self) {
        self.deadline = None;
        let Some(query) = self.pending.take() else {
            return;
        };

        if self.last_debounced.as_deref() == Some(query.as_str()) {
            debug!(query = %query, "duplicate query suppressed");
            self.transition(State::Idle);
            return;
        }
        self.last_debounced = Some(query.clone());

        self.transition(State::Validating);
        if let Err(rejected) = self.config.rules.check(&query) {
            debug!(query = %query, %rejected, "query rejected; pipeline blocked");
            self.transition(State::Idle);
            return;
        }

        self.generation += 1;
        let generation = self.generation;
        self.transition(State::Fetching);
        self.loading.send_replace(true);
        debug!(generation, query = %query, "dispatching search fetch");

        let fetcher = self.fetcher.clone();
        self.inflight.spawn(async move {
            let result = fetcher.search(&query).await;
            (generation, result)
        });
    }

    fn on_fetch_settled(&mut self, generation: u64, result: Result<Vec<T>, FetchFailed>) {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "stale search result discarded"
            );
            return;
        }

        self.loading.send_replace(false);
        if self.state == State::Fetching {
            self.transition(State::Idle);
        }
        match result {
            Ok(items) => {
                debug!(generation, count = items.len(), "search results applied");
                self.results.send_replace(items);
            }
            Err(e) => warn!(generation, error = %e, "search fetch failed"),
        }
    }

    fn transition(&mut self, next: State) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "pipeline state");
            self.state = next;
        }
    }
}
