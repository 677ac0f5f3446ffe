//! Tracking ingest: persist the signal, then publish its change event.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{ActivityEntry, ChangeEvent, EventBus, SessionId};
use crate::error::GatewayError;
use crate::persistence::Store;

/// Ingest pipeline for tracking signals.
///
/// Every method follows the same pattern: build the change event, persist
/// the underlying row plus its activity entry, then publish the event on
/// the bus. Persist-before-publish keeps the seeded totals and the
/// streamed deltas consistent.
#[derive(Debug)]
pub struct TrackingService<S> {
    store: Arc<S>,
    event_bus: EventBus,
}

impl<S: Store> TrackingService<S> {
    /// Creates a new `TrackingService`.
    #[must_use]
    pub fn new(store: Arc<S>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Records a page view.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure; no
    /// event is published in that case.
    pub async fn record_view(
        &self,
        session: SessionId,
        page: &str,
        referrer: Option<&str>,
    ) -> Result<(), GatewayError> {
        let event = ChangeEvent::ViewRecorded {
            entry_id: uuid::Uuid::new_v4(),
            session_id: session,
            page: page.to_string(),
            timestamp: Utc::now(),
        };
        let entry = ActivityEntry::from_change(&event);

        self.store
            .insert_page_view(session, page, referrer, event.timestamp())
            .await?;
        self.store.append_activity(&entry).await?;

        let _ = self.event_bus.publish(event);
        Ok(())
    }

    /// Records a generic user event.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    pub async fn record_event(
        &self,
        session: SessionId,
        name: &str,
        details: &str,
    ) -> Result<(), GatewayError> {
        let event = ChangeEvent::EventRecorded {
            entry_id: uuid::Uuid::new_v4(),
            session_id: session,
            name: name.to_string(),
            details: details.to_string(),
            timestamp: Utc::now(),
        };
        let entry = ActivityEntry::from_change(&event);

        self.store
            .insert_user_event(session, name, details, event.timestamp())
            .await?;
        self.store.append_activity(&entry).await?;

        let _ = self.event_bus.publish(event);
        Ok(())
    }

    /// Increments the click counter for `target` by one and publishes the
    /// before/after values.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    pub async fn record_click(&self, target: &str) -> Result<(), GatewayError> {
        let (old_value, new_value) = self.store.bump_click_counter(target, 1).await?;

        let event = ChangeEvent::ClickCounterUpdated {
            entry_id: uuid::Uuid::new_v4(),
            target: target.to_string(),
            old_value,
            new_value,
            timestamp: Utc::now(),
        };
        let entry = ActivityEntry::from_change(&event);
        self.store.append_activity(&entry).await?;

        let _ = self.event_bus.publish(event);
        Ok(())
    }

    /// Records a conversion.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    pub async fn record_conversion(
        &self,
        session: SessionId,
        goal: &str,
    ) -> Result<(), GatewayError> {
        let event = ChangeEvent::ConversionRecorded {
            entry_id: uuid::Uuid::new_v4(),
            session_id: session,
            goal: goal.to_string(),
            timestamp: Utc::now(),
        };
        let entry = ActivityEntry::from_change(&event);

        self.store
            .insert_conversion(session, goal, event.timestamp())
            .await?;
        self.store.append_activity(&entry).await?;

        let _ = self.event_bus.publish(event);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ActivityKind;
    use crate::persistence::memory::MemoryStore;

    fn make_service() -> (TrackingService<MemoryStore>, Arc<MemoryStore>, EventBus) {
        let store = Arc::new(MemoryStore::new());
        let bus = EventBus::new(100);
        let service = TrackingService::new(Arc::clone(&store), bus.clone());
        (service, store, bus)
    }

    #[tokio::test]
    async fn record_view_persists_and_publishes() {
        let (service, store, bus) = make_service();
        let mut rx = bus.subscribe();

        let result = service
            .record_view(SessionId::new(), "/reviews/royal", None)
            .await;
        assert!(result.is_ok());

        assert_eq!(store.total_page_views().await.unwrap_or(0), 1);

        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected event");
        };
        assert_eq!(event.kind(), ActivityKind::View);
    }

    #[tokio::test]
    async fn record_click_carries_before_after_values() {
        let (service, _store, bus) = make_service();
        let mut rx = bus.subscribe();

        let _ = service.record_click("casino-royal").await;
        let _ = service.record_click("casino-royal").await;

        let Ok(first) = rx.recv().await else {
            panic!("expected first event");
        };
        let Ok(second) = rx.recv().await else {
            panic!("expected second event");
        };

        let ChangeEvent::ClickCounterUpdated {
            old_value: 0,
            new_value: 1,
            ..
        } = first
        else {
            panic!("unexpected first event: {first:?}");
        };
        let ChangeEvent::ClickCounterUpdated {
            old_value: 1,
            new_value: 2,
            ..
        } = second
        else {
            panic!("unexpected second event: {second:?}");
        };
    }

    #[tokio::test]
    async fn activity_feed_receives_every_signal() {
        let (service, store, _bus) = make_service();
        let session = SessionId::new();

        let _ = service.record_view(session, "/", None).await;
        let _ = service.record_event(session, "scroll", "").await;
        let _ = service.record_click("casino-royal").await;
        let _ = service.record_conversion(session, "deposit").await;

        let recent = store.recent_activities(10).await.unwrap_or_default();
        assert_eq!(recent.len(), 4);
    }
}
