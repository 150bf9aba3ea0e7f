//! In-process simulated gateways: artificial latency plus controllable
//! failure, standing in for real transport behind the contract traits.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, warn};

use crate::contract::client::{FeedApi, UsersApi};
use crate::contract::error::FeedError;
use crate::contract::model::{UserDetails, UserPost};

/// Simulated users endpoint: fixed latency, then a coin flip.
pub struct SimUsersClient {
    latency: Duration,
    failure_probability: f64,
}

impl SimUsersClient {
    pub fn new(latency: Duration, failure_probability: f64) -> Self {
        Self {
            latency,
            failure_probability: failure_probability.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl UsersApi for SimUsersClient {
    async fn fetch_users(&self) -> Result<Vec<UserDetails>, FeedError> {
        debug!("users request initiated");
        tokio::time::sleep(self.latency).await;

        let failed = rand::thread_rng().gen_bool(self.failure_probability);
        if failed {
            warn!("simulated users fetch failure");
            return Err(FeedError::fetch_failed());
        }
        let users = mock_users();
        debug!(count = users.len(), "users request succeeded");
        Ok(users)
    }
}

/// Simulated posts/details endpoint over the in-memory catalog.
///
/// The failure toggles force the corresponding branch to fail, exercising
/// the join's collapse path.
pub struct SimFeedClient {
    details_latency: Duration,
    posts_latency: Duration,
    search_latency: Duration,
    fail_details: bool,
    fail_posts: bool,
    catalog: Vec<UserPost>,
}

impl SimFeedClient {
    pub fn new(
        details_latency: Duration,
        posts_latency: Duration,
        search_latency: Duration,
        fail_details: bool,
        fail_posts: bool,
    ) -> Self {
        Self {
            details_latency,
            posts_latency,
            search_latency,
            fail_details,
            fail_posts,
            catalog: post_catalog(),
        }
    }
}

#[async_trait]
impl FeedApi for SimFeedClient {
    async fn user_details(&self) -> Result<UserDetails, FeedError> {
        debug!("user details request initiated");
        tokio::time::sleep(self.details_latency).await;
        if self.fail_details {
            warn!("simulated user details failure");
            return Err(FeedError::fetch_failed());
        }
        Ok(UserDetails::new(1, "john_doe", "john@example.com"))
    }

    async fn user_posts(&self) -> Result<Vec<UserPost>, FeedError> {
        debug!("user posts request initiated");
        tokio::time::sleep(self.posts_latency).await;
        if self.fail_posts {
            warn!("simulated user posts failure");
            return Err(FeedError::fetch_failed());
        }
        Ok(self.catalog.clone())
    }

    async fn search_posts(&self, query: &str) -> Result<Vec<UserPost>, FeedError> {
        debug!(query, "search request initiated");
        tokio::time::sleep(self.search_latency).await;
        let needle = query.to_lowercase();
        let matches = self
            .catalog
            .iter()
            .filter(|post| post.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(matches)
    }
}

fn mock_users() -> Vec<UserDetails> {
    vec![
        UserDetails::new(1, "johndoe", "johndoe@example.com"),
        UserDetails::new(2, "janedoe", "janedoe@example.com"),
        UserDetails::new(3, "mikesmith", "mike.smith@example.com"),
    ]
}

fn post_catalog() -> Vec<UserPost> {
    vec![
        UserPost::new(
            1,
            "Exploring the Mountains",
            "A thrilling adventure through the rocky mountains, capturing the essence of nature.",
            "https://images.unsplash.com/photo-1506748686214-e9df14d4d9d0",
        ),
        UserPost::new(
            2,
            "The Art of Minimalism",
            "Understanding how minimalism can change your life and bring more clarity.",
            "https://images.unsplash.com/photo-1494438639946-1ebd1d20bf85",
        ),
        UserPost::new(
            3,
            "Culinary Wonders",
            "Exploring the world's best dishes and the stories behind them.",
            "https://images.unsplash.com/photo-1567620905732-2d1ec7ab7445",
        ),
        UserPost::new(
            4,
            "Tech Innovations 2024",
            "A look at the most groundbreaking tech advancements expected in 2024.",
            "https://images.unsplash.com/photo-1518770660439-4636190af475",
        ),
        UserPost::new(
            5,
            "Urban Jungle",
            "How cities are transforming into green paradises with urban farming.",
            "https://images.unsplash.com/photo-1529156069898-49953e39b3ac",
        ),
        UserPost::new(
            6,
            "The Future of AI",
            "Exploring how artificial intelligence is reshaping industries and our lives.",
            "https://images.unsplash.com/photo-1504384308090-c894fdcc538d",
        ),
        UserPost::new(
            7,
            "Traveling on a Budget",
            "Top tips and destinations for those looking to explore the world without breaking the bank.",
            "https://images.unsplash.com/photo-1506748686214-e9df14d4d9d0",
        ),
        UserPost::new(
            8,
            "Sustainable Fashion",
            "How the fashion industry is embracing sustainability and what it means for consumers.",
            "https://images.unsplash.com/photo-1503342217505-b0a15ec3261c",
        ),
        UserPost::new(
            9,
            "Mindfulness and Meditation",
            "The benefits of mindfulness practices and how to incorporate them into your daily routine.",
            "https://images.unsplash.com/photo-1514996937319-344454492b37",
        ),
        UserPost::new(
            10,
            "The Gig Economy",
            "Understanding the rise of the gig economy and its impact on the workforce.",
            "https://images.unsplash.com/photo-1503023345310-bd7c1de61c7d",
        ),
    ]
}
