use std::sync::Arc;

use async_trait::async_trait;

use crate::contract::model::UserPost;
use crate::domain::service::FeedService;
use flowkit::{FetchFailed, SearchFetcher};

/// Local adapter exposing the feed service to the search pipeline port.
pub struct ServiceSearchFetcher {
    service: Arc<FeedService>,
}

impl ServiceSearchFetcher {
    pub fn new(service: Arc<FeedService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SearchFetcher for ServiceSearchFetcher {
    type Item = UserPost;

    async fn search(&self, query: &str) -> Result<Vec<UserPost>, FetchFailed> {
        self.service
            .search(query)
            .await
            .map_err(|e| FetchFailed::new(e.to_string()))
    }
}
