//! Pure feed models for inter-module communication (no serde).

/// Profile record for one user.
///
/// A present `error` marks the record as a degraded placeholder standing in
/// for real data; `user_id`/`username`/`email` are then meaningless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    pub user_id: u32,
    pub username: String,
    pub email: String,
    pub error: Option<String>,
}

impl UserDetails {
    pub fn new(user_id: u32, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            email: email.into(),
            error: None,
        }
    }

    /// Degraded placeholder carrying only the failure message.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            user_id: 0,
            username: String::new(),
            email: String::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// One post in the feed.
///
/// `post_id == 0` is the in-band "load failed" sentinel, paired with a
/// placeholder `content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPost {
    pub post_id: u32,
    pub title: String,
    pub content: String,
    pub image: String,
}

impl UserPost {
    pub fn new(
        post_id: u32,
        title: impl Into<String>,
        content: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            post_id,
            title: title.into(),
            content: content.into(),
            image: image.into(),
        }
    }

    /// Sentinel row signalling that the posts branch failed to load.
    pub fn load_failed() -> Self {
        Self {
            post_id: 0,
            title: String::new(),
            content: "Posts could not be loaded.".to_string(),
            image: String::new(),
        }
    }

    pub fn is_load_failed(&self) -> bool {
        self.post_id == 0
    }
}

/// Joined outcome of the details + posts fan-in: exactly one variant,
/// never partially populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombinedData {
    Complete {
        user_details: UserDetails,
        user_posts: Vec<UserPost>,
    },
    Failed {
        error: String,
    },
}

impl CombinedData {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
