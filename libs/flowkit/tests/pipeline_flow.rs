//! End-to-end behavior of the debounced search pipeline under a paused
//! clock: debounce, dedup, validation gate, switch-to-latest.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use flowkit::{FetchFailed, PipelineConfig, SearchFetcher, SearchPipeline, TaskScope};

struct RecordingFetcher {
    calls: Mutex<Vec<String>>,
    default_latency: Duration,
    latency_overrides: HashMap<String, Duration>,
}

impl RecordingFetcher {
    fn new(default_latency: Duration) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            default_latency,
            latency_overrides: HashMap::new(),
        }
    }

    fn with_latency(mut self, query: &str, latency: Duration) -> Self {
        self.latency_overrides.insert(query.to_string(), latency);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SearchFetcher for RecordingFetcher {
    type Item = String;

    async fn search(&self, query: &str) -> Result<Vec<String>, FetchFailed> {
        self.calls.lock().push(query.to_string());
        let latency = self
            .latency_overrides
            .get(query)
            .copied()
            .unwrap_or(self.default_latency);
        tokio::time::sleep(latency).await;
        Ok(vec![format!("result:{query}")])
    }
}

fn start_pipeline(
    scope: &TaskScope,
    fetcher: Arc<RecordingFetcher>,
) -> SearchPipeline<String> {
    SearchPipeline::spawn(scope, PipelineConfig::default(), fetcher, Vec::new())
}

#[tokio::test(start_paused = true)]
async fn only_the_last_value_of_a_burst_triggers_a_fetch() {
    let scope = TaskScope::new();
    let fetcher = Arc::new(RecordingFetcher::new(Duration::from_millis(10)));
    let pipeline = start_pipeline(&scope, fetcher.clone());

    pipeline.submit("mou");
    tokio::time::sleep(Duration::from_millis(100)).await;
    pipeline.submit("moun");
    tokio::time::sleep(Duration::from_millis(100)).await;
    pipeline.submit("mountains");
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(fetcher.calls(), vec!["mountains"]);
    assert_eq!(
        *pipeline.results().borrow(),
        vec!["result:mountains".to_string()]
    );

    scope.stop(Duration::from_secs(1)).await;
}

#[tokio::test(start_paused = true)]
async fn duplicate_of_the_preceding_query_is_suppressed() {
    let scope = TaskScope::new();
    let fetcher = Arc::new(RecordingFetcher::new(Duration::from_millis(10)));
    let pipeline = start_pipeline(&scope, fetcher.clone());

    pipeline.submit("abc");
    tokio::time::sleep(Duration::from_millis(600)).await;
    pipeline.submit("abc");
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(fetcher.calls(), vec!["abc"]);

    // Only *consecutive* duplicates are suppressed.
    pipeline.submit("abcd");
    tokio::time::sleep(Duration::from_millis(600)).await;
    pipeline.submit("abc");
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(fetcher.calls(), vec!["abc", "abcd", "abc"]);

    scope.stop(Duration::from_secs(1)).await;
}

#[tokio::test(start_paused = true)]
async fn validation_gate_blocks_short_queries_but_passes_empty() {
    let scope = TaskScope::new();
    let fetcher = Arc::new(RecordingFetcher::new(Duration::from_millis(10)));
    let pipeline = start_pipeline(&scope, fetcher.clone());

    pipeline.submit("ab");
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(fetcher.calls().is_empty());

    pipeline.submit("abc");
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(fetcher.calls(), vec!["abc"]);

    // Clearing the input is an explicit reset and always fetches.
    pipeline.submit("");
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(fetcher.calls(), vec!["abc", ""]);

    scope.stop(Duration::from_secs(1)).await;
}

#[tokio::test(start_paused = true)]
async fn superseded_fetch_result_is_never_applied() {
    let scope = TaskScope::new();
    let fetcher = Arc::new(
        RecordingFetcher::new(Duration::from_millis(10))
            .with_latency("first", Duration::from_secs(2)),
    );
    let pipeline = start_pipeline(&scope, fetcher.clone());

    pipeline.submit("first");
    tokio::time::sleep(Duration::from_millis(450)).await;
    // "first" is in flight (slow); a newer query supersedes it.
    pipeline.submit("second");
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(fetcher.calls(), vec!["first", "second"]);
    assert_eq!(
        *pipeline.results().borrow(),
        vec!["result:second".to_string()]
    );
    assert!(!*pipeline.loading().borrow());

    // The stale "first" result settles much later and must be discarded.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(
        *pipeline.results().borrow(),
        vec!["result:second".to_string()]
    );
    assert!(!*pipeline.loading().borrow());

    scope.stop(Duration::from_secs(1)).await;
}

#[tokio::test(start_paused = true)]
async fn loading_flag_follows_the_current_fetch() {
    let scope = TaskScope::new();
    let fetcher = Arc::new(
        RecordingFetcher::new(Duration::from_millis(10))
            .with_latency("abc", Duration::from_secs(1)),
    );
    let pipeline = start_pipeline(&scope, fetcher.clone());

    pipeline.submit("abc");
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(*pipeline.loading().borrow());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!*pipeline.loading().borrow());

    scope.stop(Duration::from_secs(1)).await;
}

#[tokio::test(start_paused = true)]
async fn short_query_replaced_within_the_quiet_window_fetches_once() {
    let scope = TaskScope::new();
    let fetcher = Arc::new(RecordingFetcher::new(Duration::from_millis(10)));
    let pipeline = start_pipeline(&scope, fetcher.clone());

    pipeline.submit("ab");
    tokio::time::sleep(Duration::from_millis(200)).await;
    // Arrives inside the quiet window: the debounce restarts and "ab"
    // never reaches validation.
    pipeline.submit("abc");
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(fetcher.calls(), vec!["abc"]);
    assert_eq!(*pipeline.results().borrow(), vec!["result:abc".to_string()]);

    scope.stop(Duration::from_secs(1)).await;
}

#[tokio::test(start_paused = true)]
async fn blocked_input_does_not_disturb_an_inflight_fetch() {
    let scope = TaskScope::new();
    let fetcher = Arc::new(
        RecordingFetcher::new(Duration::from_millis(10))
            .with_latency("abc", Duration::from_secs(1)),
    );
    let pipeline = start_pipeline(&scope, fetcher.clone());

    pipeline.submit("abc");
    tokio::time::sleep(Duration::from_millis(450)).await;
    // Too short: blocked at the validation gate, no new generation.
    pipeline.submit("ab");
    tokio::time::sleep(Duration::from_secs(2)).await;

    // The in-flight "abc" generation stayed current, so its result landed.
    assert_eq!(fetcher.calls(), vec!["abc"]);
    assert_eq!(*pipeline.results().borrow(), vec!["result:abc".to_string()]);
    assert!(!*pipeline.loading().borrow());

    scope.stop(Duration::from_secs(1)).await;
}
