use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// One recorded error occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Append-only, ordered log of user-visible errors.
///
/// Events are kept structured; `render` flattens them for display by
/// concatenating messages in arrival order with no separator. The log is
/// never cleared implicitly, only by an explicit `reset`.
#[derive(Debug, Default)]
pub struct ErrorLog {
    events: Mutex<Vec<ErrorEvent>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, message: impl Into<String>) {
        let event = ErrorEvent {
            at: Utc::now(),
            message: message.into(),
        };
        tracing::debug!(message = %event.message, "error recorded");
        self.events.lock().push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Snapshot of the recorded events in arrival order.
    pub fn events(&self) -> Vec<ErrorEvent> {
        self.events.lock().clone()
    }

    /// Display form: accumulated messages, concatenated in order.
    pub fn render(&self) -> String {
        self.events
            .lock()
            .iter()
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn reset(&self) {
        self.events.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_concatenates_in_arrival_order() {
        let log = ErrorLog::new();
        log.record("Data could not be fully loaded. ");
        log.record("Please try again later.");
        assert_eq!(
            log.render(),
            "Data could not be fully loaded. Please try again later."
        );
    }

    #[test]
    fn repeated_errors_accumulate_rather_than_replace() {
        let log = ErrorLog::new();
        log.record("failure");
        log.record("failure");
        assert_eq!(log.len(), 2);
        assert_eq!(log.render(), "failurefailure");
    }

    #[test]
    fn reset_is_the_only_way_to_clear() {
        let log = ErrorLog::new();
        log.record("failure");
        assert!(!log.is_empty());
        log.reset();
        assert!(log.is_empty());
        assert_eq!(log.render(), "");
    }
}
