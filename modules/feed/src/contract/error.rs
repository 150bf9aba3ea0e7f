use thiserror::Error;

/// Feed-module errors surfaced through the public contract.
///
/// Display strings are user-facing: they are what the presentation layer
/// accumulates and shows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// One fetch attempt failed; recoverable via the retry policy.
    #[error("Failed to fetch user data.")]
    FetchFailed,

    /// Terminal: every attempt failed and no fallback was applied.
    #[error("All retries failed, fallback not available.")]
    RetriesExhausted { attempts: u32 },

    /// A branch of the combined fan-in failed; the whole join collapses.
    #[error("Data could not be fully loaded. Please try again later.")]
    PartialJoinFailure,

    /// Anything else; kept user-presentable.
    #[error("An unexpected error occurred. Please try again later.")]
    Unexpected,
}

impl FeedError {
    pub fn fetch_failed() -> Self {
        Self::FetchFailed
    }

    pub fn retries_exhausted(attempts: u32) -> Self {
        Self::RetriesExhausted { attempts }
    }

    pub fn partial_join_failure() -> Self {
        Self::PartialJoinFailure
    }
}
