//! Fan-in join behavior: any branch failure collapses the whole load.

use std::sync::Arc;
use std::time::Duration;

use feed::domain::ports::TracingEventPublisher;
use feed::domain::service::{FeedService, ServiceConfig};
use feed::gateways::sim::{SimFeedClient, SimUsersClient};
use feed::model::CombinedData;
use feed::state::FeedState;

fn service(fail_details: bool, fail_posts: bool) -> FeedService {
    let users = Arc::new(SimUsersClient::new(Duration::ZERO, 0.0));
    let posts = Arc::new(SimFeedClient::new(
        Duration::ZERO,
        Duration::ZERO,
        Duration::ZERO,
        fail_details,
        fail_posts,
    ));
    FeedService::new(
        users,
        posts,
        Arc::new(TracingEventPublisher),
        ServiceConfig::default(),
    )
}

#[tokio::test]
async fn clean_branches_yield_the_complete_variant() {
    let combined = service(false, false).load_combined().await;

    match combined {
        CombinedData::Complete {
            user_details,
            user_posts,
        } => {
            assert_eq!(user_details.username, "john_doe");
            assert!(!user_details.is_degraded());
            assert_eq!(user_posts.len(), 10);
            assert!(user_posts.iter().all(|p| !p.is_load_failed()));
        }
        CombinedData::Failed { error } => panic!("unexpected failure: {error}"),
    }
}

#[tokio::test]
async fn failed_details_branch_collapses_the_join() {
    let combined = service(true, false).load_combined().await;
    assert_eq!(
        combined,
        CombinedData::Failed {
            error: "Data could not be fully loaded. Please try again later.".to_string()
        }
    );
}

#[tokio::test]
async fn failed_posts_branch_collapses_the_join() {
    let combined = service(false, true).load_combined().await;
    assert!(combined.is_failed());
}

#[tokio::test]
async fn both_branches_failing_still_yields_one_error() {
    let combined = service(true, true).load_combined().await;
    assert!(combined.is_failed());
}

#[tokio::test]
async fn repeated_failures_accumulate_in_the_state_error_text() {
    let svc = service(false, true);
    let state = FeedState::new();

    assert!(state.apply_combined(svc.load_combined().await).is_none());
    assert!(state.apply_combined(svc.load_combined().await).is_none());

    assert_eq!(
        state.error_text(),
        "Data could not be fully loaded. Please try again later.\
         Data could not be fully loaded. Please try again later."
    );
    assert!(state.details_seen().is_empty());
}

#[tokio::test]
async fn successful_loads_accumulate_details_across_reloads() {
    let svc = service(false, false);
    let state = FeedState::new();

    let posts = state.apply_combined(svc.load_combined().await);
    assert_eq!(posts.map(|p| p.len()), Some(10));
    let _ = state.apply_combined(svc.load_combined().await);

    assert_eq!(state.details_seen().len(), 2);
    assert!(state.error_text().is_empty());
}

#[tokio::test(start_paused = true)]
async fn the_join_waits_for_the_slower_branch() {
    let users = Arc::new(SimUsersClient::new(Duration::ZERO, 0.0));
    let posts = Arc::new(SimFeedClient::new(
        Duration::from_secs(2),
        Duration::from_secs(3),
        Duration::ZERO,
        false,
        false,
    ));
    let svc = FeedService::new(
        users,
        posts,
        Arc::new(TracingEventPublisher),
        ServiceConfig::default(),
    );

    let start = tokio::time::Instant::now();
    let combined = svc.load_combined().await;
    // Branches run concurrently: total wait is the slower branch, not the sum.
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert!(!combined.is_failed());
}
