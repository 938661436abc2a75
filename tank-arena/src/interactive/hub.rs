//! Fan-out of interactive events to registered subscriptions

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use super::InteractiveEvent;

#[derive(Debug, Default)]
struct HubInner {
    next_id: u64,
    subscribers: Vec<(u64, flume::Sender<InteractiveEvent>)>,
}

/// Delivers every published event to each live subscription
///
/// Cloning the hub shares the subscriber list.
#[derive(Debug, Clone, Default)]
pub struct EventHub {
    inner: Arc<Mutex<HubInner>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new subscription
    pub fn subscribe(&self) -> EventSubscription {
        let (sender, receiver) = flume::unbounded();
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, sender));
        tracing::debug!("Event subscription {} registered", id);

        EventSubscription {
            id,
            receiver,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Publish an event, returning how many subscriptions received it
    pub fn publish(&self, event: InteractiveEvent) -> usize {
        let mut inner = self.lock();
        inner
            .subscribers
            .retain(|(_, sender)| sender.send(event.clone()).is_ok());
        inner.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

/// Registration token for interactive events
///
/// Unregisters from the hub when dropped.
#[derive(Debug)]
pub struct EventSubscription {
    id: u64,
    receiver: flume::Receiver<InteractiveEvent>,
    hub: Weak<Mutex<HubInner>>,
}

impl EventSubscription {
    pub fn receiver(&self) -> &flume::Receiver<InteractiveEvent> {
        &self.receiver
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            inner.subscribers.retain(|(id, _)| *id != self.id);
            tracing::debug!("Event subscription {} released", self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Participant, ParticipantId};

    fn joined(id: u32) -> InteractiveEvent {
        InteractiveEvent::ParticipantJoined(
            Participant::from_name(ParticipantId(id), format!("viewer{id}")).unwrap(),
        )
    }

    #[test]
    fn test_publish_reaches_every_subscription() {
        let hub = EventHub::new();
        let first = hub.subscribe();
        let second = hub.subscribe();

        assert_eq!(hub.publish(joined(1)), 2);
        assert_eq!(first.receiver().try_recv().unwrap(), joined(1));
        assert_eq!(second.receiver().try_recv().unwrap(), joined(1));
    }

    #[test]
    fn test_drop_unregisters() {
        let hub = EventHub::new();
        let subscription = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);

        drop(subscription);
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hub.publish(joined(1)), 0);
    }

    #[test]
    fn test_events_before_subscription_are_not_replayed() {
        let hub = EventHub::new();
        hub.publish(joined(1));
        let subscription = hub.subscribe();
        assert!(subscription.receiver().try_recv().is_err());
    }
}
