/// Transport-agnostic domain event.
///
/// Attempt-level events fire before the corresponding outcome is known,
/// so telemetry sees every try, not just the final result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedDomainEvent {
    UsersFetchAttempted { attempt: u32 },
    UsersFetchSucceeded { attempt: u32, count: usize },
    UsersFetchFailed { attempt: u32 },
    UsersRetriesExhausted { attempts: u32 },
    CombinedLoadSucceeded { posts: usize },
    CombinedLoadFailed,
}
