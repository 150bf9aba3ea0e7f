use crate::domain::events::FeedDomainEvent;

/// Output port: publish domain events (no knowledge of transport).
pub trait EventPublisher<E>: Send + Sync + 'static {
    fn publish(&self, event: &E);
}

/// Publisher that forwards feed events to the tracing subsystem.
#[derive(Debug, Default)]
pub struct TracingEventPublisher;

impl EventPublisher<FeedDomainEvent> for TracingEventPublisher {
    fn publish(&self, event: &FeedDomainEvent) {
        tracing::info!(?event, "feed domain event");
    }
}
