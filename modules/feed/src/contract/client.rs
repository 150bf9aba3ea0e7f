use async_trait::async_trait;

use crate::contract::{
    error::FeedError,
    model::{UserDetails, UserPost},
};

/// Public API trait for the users side of the feed module.
///
/// One call is one fetch attempt; retrying is the caller's policy, not the
/// transport's. Implementations are in-process simulations today and must
/// stay swappable for real transport without changing this contract.
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// Fetch the user list. A transient failure surfaces as
    /// `FeedError::FetchFailed`.
    async fn fetch_users(&self) -> Result<Vec<UserDetails>, FeedError>;
}

/// Public API trait for the posts side of the feed module.
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// Fetch the profile record backing the combined view.
    async fn user_details(&self) -> Result<UserDetails, FeedError>;

    /// Fetch the full post list backing the combined view.
    async fn user_posts(&self) -> Result<Vec<UserPost>, FeedError>;

    /// One logical search: case-insensitive substring match of `query`
    /// against post titles. No ranking, no pagination.
    async fn search_posts(&self, query: &str) -> Result<Vec<UserPost>, FeedError>;
}
