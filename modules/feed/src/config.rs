use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the feed module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    /// Quiet window a search input must survive before it proceeds.
    #[serde(with = "humantime_serde", default = "default_quiet_window")]
    pub quiet_window: Duration,
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    #[serde(default)]
    pub reject_embedded_space: bool,
    #[serde(with = "humantime_serde", default = "default_search_latency")]
    pub search_latency: Duration,
    #[serde(default)]
    pub users: UsersFetchConfig,
    #[serde(default)]
    pub sim: SimConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            quiet_window: default_quiet_window(),
            min_query_len: default_min_query_len(),
            reject_embedded_space: false,
            search_latency: default_search_latency(),
            users: UsersFetchConfig::default(),
            sim: SimConfig::default(),
        }
    }
}

/// Users fetch + retry policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersFetchConfig {
    #[serde(with = "humantime_serde", default = "default_users_latency")]
    pub latency: Duration,
    /// Probability one attempt fails; clamped to [0, 1].
    #[serde(default = "default_failure_probability")]
    pub failure_probability: f64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(with = "humantime_serde", default = "default_retry_delay")]
    pub retry_delay: Duration,
    /// Substitute the constructed fallback users once retries are exhausted
    /// instead of surfacing the terminal error.
    #[serde(default)]
    pub return_fallback_on_exhaustion: bool,
}

impl Default for UsersFetchConfig {
    fn default() -> Self {
        Self {
            latency: default_users_latency(),
            failure_probability: default_failure_probability(),
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
            return_fallback_on_exhaustion: false,
        }
    }
}

/// Simulated details/posts endpoint knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    #[serde(with = "humantime_serde", default = "default_details_latency")]
    pub details_latency: Duration,
    #[serde(with = "humantime_serde", default = "default_posts_latency")]
    pub posts_latency: Duration,
    /// Force the details branch to fail (join-collapse demonstration).
    #[serde(default)]
    pub fail_details: bool,
    /// Force the posts branch to fail.
    #[serde(default)]
    pub fail_posts: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            details_latency: default_details_latency(),
            posts_latency: default_posts_latency(),
            fail_details: false,
            fail_posts: false,
        }
    }
}

fn default_quiet_window() -> Duration {
    Duration::from_millis(400)
}

fn default_min_query_len() -> usize {
    3
}

fn default_search_latency() -> Duration {
    Duration::from_secs(1)
}

fn default_users_latency() -> Duration {
    Duration::from_secs(2)
}

fn default_failure_probability() -> f64 {
    0.5
}

fn default_max_retries() -> u32 {
    1
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_details_latency() -> Duration {
    Duration::from_secs(2)
}

fn default_posts_latency() -> Duration {
    Duration::from_secs(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timings_and_policy() {
        let config = FeedConfig::default();
        assert_eq!(config.quiet_window, Duration::from_millis(400));
        assert_eq!(config.min_query_len, 3);
        assert_eq!(config.users.max_retries, 1);
        assert_eq!(config.users.retry_delay, Duration::from_secs(1));
        assert_eq!(config.sim.posts_latency, Duration::from_secs(3));
        assert!(!config.users.return_fallback_on_exhaustion);
    }

    #[test]
    fn durations_decode_from_humantime_strings() {
        let config: FeedConfig = serde_json::from_value(serde_json::json!({
            "quiet_window": "250ms",
            "users": { "latency": "1s", "failure_probability": 1.0 }
        }))
        .unwrap();
        assert_eq!(config.quiet_window, Duration::from_millis(250));
        assert_eq!(config.users.latency, Duration::from_secs(1));
        assert_eq!(config.users.failure_probability, 1.0);
    }
}
