//! Where drained price list events go
//!
//! Services publish events only after the aggregate has been saved, except
//! for audit-only violations, which are published even though nothing was
//! written.

use std::sync::Mutex;

use tracing::{info, warn};

use domain_pricing::PriceListEvent;

pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &PriceListEvent);
}

/// Writes each event to the log as a structured record
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    fn publish(&self, event: &PriceListEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(
                    error = %e,
                    event_type = event.event_type(),
                    price_list_id = %event.price_list_id(),
                    "price list event payload not serializable"
                );
                String::new()
            }
        };
        info!(
            event_type = event.event_type(),
            price_list_id = %event.price_list_id(),
            actor = %event.actor(),
            timestamp = %event.timestamp(),
            %payload,
            "price list event"
        );
    }
}

/// Keeps every event in memory; for tests and replays
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<PriceListEvent>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, oldest first
    pub fn events(&self) -> Vec<PriceListEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events().iter().map(PriceListEvent::event_type).collect()
    }
}

impl EventPublisher for RecordingEventPublisher {
    fn publish(&self, event: &PriceListEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    use chrono::Utc;
    use core_kernel::{ActorId, PriceListId};
    use domain_pricing::LifecycleChange;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn activated() -> PriceListEvent {
        PriceListEvent::LifecycleChanged {
            price_list_id: PriceListId::new_v7(),
            change: LifecycleChange::Activated,
            actor: ActorId::new(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_tracing_publisher_logs_the_payload() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let event = activated();
        tracing::subscriber::with_default(subscriber, || {
            TracingEventPublisher.publish(&event);
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("price list event"));
        assert!(output.contains(&event.price_list_id().to_string()));
        assert!(output.contains("activated"));
        assert!(!output.contains("not serializable"));
    }

    #[test]
    fn test_recording_publisher_keeps_order() {
        let publisher = RecordingEventPublisher::new();
        let first = activated();
        let second = activated();
        publisher.publish(&first);
        publisher.publish(&second);

        assert_eq!(publisher.events(), vec![first, second]);
        assert_eq!(publisher.event_types().len(), 2);
    }
}
