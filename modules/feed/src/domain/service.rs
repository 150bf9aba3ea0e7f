use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::contract::client::{FeedApi, UsersApi};
use crate::contract::error::FeedError;
use crate::contract::model::{CombinedData, UserDetails, UserPost};
use crate::domain::events::FeedDomainEvent;
use crate::domain::ports::EventPublisher;
use flowkit::{run_with_retry, ExhaustionPolicy, RetryPolicy};

/// Domain service coordinating the feed module's fetch policies.
/// Depends only on the client ports, not on gateway types.
#[derive(Clone)]
pub struct FeedService {
    users: Arc<dyn UsersApi>,
    feed: Arc<dyn FeedApi>,
    events: Arc<dyn EventPublisher<FeedDomainEvent>>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub retry: RetryPolicy,
    /// On exhaustion, substitute the constructed fallback users instead of
    /// surfacing the terminal error.
    pub return_fallback_on_exhaustion: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            return_fallback_on_exhaustion: false,
        }
    }
}

impl FeedService {
    /// Create a service with dependencies.
    pub fn new(
        users: Arc<dyn UsersApi>,
        feed: Arc<dyn FeedApi>,
        events: Arc<dyn EventPublisher<FeedDomainEvent>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            feed,
            events,
            config,
        }
    }

    /// Fetch the user list under the bounded retry policy.
    ///
    /// Every attempt is announced through the event port before its outcome
    /// is known. The fallback payload is always constructed; whether it is
    /// ever returned is an explicit policy choice, off by default.
    #[instrument(name = "feed.service.fetch_users", skip(self))]
    pub async fn fetch_users(&self) -> Result<Vec<UserDetails>, FeedError> {
        // Constructed regardless of policy; the default policy discards it.
        let fallback = fallback_users();
        let on_exhausted = if self.config.return_fallback_on_exhaustion {
            ExhaustionPolicy::Fallback(fallback)
        } else {
            ExhaustionPolicy::Fail
        };

        let users = self.users.clone();
        let events = self.events.clone();
        let result = run_with_retry(&self.config.retry, on_exhausted, move |attempt| {
            let users = users.clone();
            let events = events.clone();
            async move {
                events.publish(&FeedDomainEvent::UsersFetchAttempted { attempt });
                match users.fetch_users().await {
                    Ok(list) => {
                        events.publish(&FeedDomainEvent::UsersFetchSucceeded {
                            attempt,
                            count: list.len(),
                        });
                        Ok(list)
                    }
                    Err(e) => {
                        events.publish(&FeedDomainEvent::UsersFetchFailed { attempt });
                        Err(e)
                    }
                }
            }
        })
        .await;

        match result {
            Ok(list) => {
                info!(count = list.len(), "users fetch completed");
                Ok(list)
            }
            Err(exhausted) => {
                self.events.publish(&FeedDomainEvent::UsersRetriesExhausted {
                    attempts: exhausted.attempts,
                });
                Err(FeedError::retries_exhausted(exhausted.attempts))
            }
        }
    }

    /// Join the details and posts fetches, collapsing any branch failure
    /// into the `Failed` variant. The result is never partially populated.
    #[instrument(name = "feed.service.load_combined", skip(self))]
    pub async fn load_combined(&self) -> CombinedData {
        debug!("loading combined user details and posts");
        let (details, posts) = tokio::join!(self.feed.user_details(), self.feed.user_posts());

        let user_details = details.unwrap_or_else(|e| {
            warn!(error = %e, "user details branch failed");
            UserDetails::degraded("User details could not be loaded.")
        });
        let user_posts = posts.unwrap_or_else(|e| {
            warn!(error = %e, "user posts branch failed");
            vec![UserPost::load_failed()]
        });

        if user_details.is_degraded() || user_posts.first().is_some_and(UserPost::is_load_failed) {
            self.events.publish(&FeedDomainEvent::CombinedLoadFailed);
            return CombinedData::Failed {
                error: FeedError::partial_join_failure().to_string(),
            };
        }

        self.events.publish(&FeedDomainEvent::CombinedLoadSucceeded {
            posts: user_posts.len(),
        });
        info!(posts = user_posts.len(), "combined load completed");
        CombinedData::Complete {
            user_details,
            user_posts,
        }
    }

    /// One logical search through the posts client.
    #[instrument(name = "feed.service.search", skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<UserPost>, FeedError> {
        debug!("searching posts");
        self.feed.search_posts(query).await
    }
}

/// The payload the retry policy constructs for its exhaustion decision.
fn fallback_users() -> Vec<UserDetails> {
    vec![
        UserDetails::new(101, "fallbackuser1", "fallback1@example.com"),
        UserDetails::new(102, "fallbackuser2", "fallback2@example.com"),
    ]
}
