use parking_lot::Mutex;
use tokio::sync::watch;

use crate::contract::error::FeedError;
use crate::contract::model::{CombinedData, UserDetails, UserPost};
use flowkit::ErrorLog;

/// Shared state read by the presentation layer.
///
/// Mutated only by the pipelines that own the corresponding operations;
/// presentation code observes via `watch` receivers and snapshots.
pub struct FeedState {
    /// User details accumulated across successful combined loads.
    details_seen: Mutex<Vec<UserDetails>>,
    /// Result of the most recent users fetch, if any succeeded.
    users: Mutex<Option<Vec<UserDetails>>>,
    /// Last users-fetch error; cleared on the next success.
    users_error: Mutex<Option<String>>,
    /// Accumulated user-visible errors; never cleared implicitly.
    errors: ErrorLog,
    loading: watch::Sender<bool>,
    button_loading: watch::Sender<bool>,
}

impl FeedState {
    pub fn new() -> Self {
        Self {
            details_seen: Mutex::new(Vec::new()),
            users: Mutex::new(None),
            users_error: Mutex::new(None),
            errors: ErrorLog::new(),
            loading: watch::Sender::new(false),
            button_loading: watch::Sender::new(false),
        }
    }

    // --- loading flags ---

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn set_loading(&self, value: bool) {
        self.loading.send_replace(value);
    }

    pub fn button_loading(&self) -> watch::Receiver<bool> {
        self.button_loading.subscribe()
    }

    pub fn set_button_loading(&self, value: bool) {
        self.button_loading.send_replace(value);
    }

    // --- combined load ---

    /// Apply a combined-load outcome.
    ///
    /// On success the details record is appended to `details_seen` and the
    /// post list is returned for display/seeding. On failure the error is
    /// appended to the accumulated log and nothing else changes.
    pub fn apply_combined(&self, combined: CombinedData) -> Option<Vec<UserPost>> {
        match combined {
            CombinedData::Complete {
                user_details,
                user_posts,
            } => {
                self.details_seen.lock().push(user_details);
                Some(user_posts)
            }
            CombinedData::Failed { error } => {
                self.errors.record(error);
                None
            }
        }
    }

    pub fn details_seen(&self) -> Vec<UserDetails> {
        self.details_seen.lock().clone()
    }

    // --- users fetch ---

    /// Apply a users-fetch outcome: success stores the list and clears the
    /// command's error slot; failure clears the list and stores the message.
    pub fn apply_users(&self, result: Result<Vec<UserDetails>, FeedError>) {
        let mut users = self.users.lock();
        let mut users_error = self.users_error.lock();
        match result {
            Ok(list) => {
                *users = Some(list);
                *users_error = None;
            }
            Err(e) => {
                *users = None;
                *users_error = Some(e.to_string());
            }
        }
    }

    pub fn users(&self) -> Option<Vec<UserDetails>> {
        self.users.lock().clone()
    }

    pub fn users_error(&self) -> Option<String> {
        self.users_error.lock().clone()
    }

    // --- accumulated errors ---

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// Accumulated error text for display.
    pub fn error_text(&self) -> String {
        self.errors.render()
    }
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(posts: Vec<UserPost>) -> CombinedData {
        CombinedData::Complete {
            user_details: UserDetails::new(1, "john_doe", "john@example.com"),
            user_posts: posts,
        }
    }

    #[test]
    fn successful_loads_accumulate_details_and_return_posts() {
        let state = FeedState::new();
        let posts = vec![UserPost::new(1, "Urban Jungle", "c", "i")];

        let returned = state.apply_combined(complete(posts.clone()));
        assert_eq!(returned, Some(posts));
        assert_eq!(state.details_seen().len(), 1);

        state.apply_combined(complete(Vec::new()));
        assert_eq!(state.details_seen().len(), 2);
        assert!(state.error_text().is_empty());
    }

    #[test]
    fn failed_loads_append_to_the_error_text() {
        let state = FeedState::new();
        let failed = CombinedData::Failed {
            error: FeedError::partial_join_failure().to_string(),
        };

        assert_eq!(state.apply_combined(failed.clone()), None);
        state.apply_combined(failed);

        // Accumulates rather than replaces, and is never cleared implicitly.
        assert_eq!(
            state.error_text(),
            "Data could not be fully loaded. Please try again later.\
             Data could not be fully loaded. Please try again later."
        );
        assert_eq!(state.errors().len(), 2);
    }

    #[test]
    fn users_error_slot_is_cleared_on_success() {
        let state = FeedState::new();

        state.apply_users(Err(FeedError::retries_exhausted(2)));
        assert_eq!(
            state.users_error().as_deref(),
            Some("All retries failed, fallback not available.")
        );
        assert!(state.users().is_none());

        state.apply_users(Ok(vec![UserDetails::new(1, "johndoe", "j@example.com")]));
        assert!(state.users_error().is_none());
        assert_eq!(state.users().unwrap().len(), 1);
    }
}
