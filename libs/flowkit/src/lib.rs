//! # Flowkit - Explicit Async Coordination
//!
//! Small building blocks for event-loop-driven pipelines, written as plain
//! state machines over tokio primitives instead of a reactive-streams
//! runtime:
//!
//! - **Scoped tasks**: a [`TaskScope`] owns named cancellable background
//!   tasks and releases them deterministically on shutdown.
//! - **Debounced search**: [`SearchPipeline`] debounces, dedups, validates
//!   and fetches with switch-to-latest semantics via a generation counter.
//! - **Bounded retry**: [`run_with_retry`] with a fixed delay and an
//!   explicit [`ExhaustionPolicy`].
//! - **Error accumulation**: [`ErrorLog`] keeps structured error events and
//!   renders the accumulated display string at the boundary.

pub mod errlog;
pub mod pipeline;
pub mod retry;
pub mod rules;
pub mod scope;
pub mod shutdown;

pub use errlog::{ErrorEvent, ErrorLog};
pub use shutdown::wait_for_shutdown;
pub use pipeline::{FetchFailed, PipelineConfig, SearchFetcher, SearchPipeline};
pub use retry::{run_with_retry, ExhaustionPolicy, RetriesExhausted, RetryPolicy};
pub use rules::{QueryRules, ValidationRejected};
pub use scope::{StopReason, TaskScope};
