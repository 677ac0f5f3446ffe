//! Notification campaign management and targeting.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    DisplayFrequency, NotificationCatalog, NotificationDefinition, NotificationDraft,
    NotificationId, SessionId, ViewRecord, select_notification,
};
use crate::error::GatewayError;
use crate::persistence::Store;

/// Owns the notification catalog and the select/dismiss/click flow.
///
/// Admin mutations write through to storage first and only then update
/// the in-memory catalog, so a failed write never leaves the catalog
/// ahead of the database.
#[derive(Debug)]
pub struct NotificationService<S> {
    store: Arc<S>,
    catalog: Arc<NotificationCatalog>,
}

impl<S: Store> NotificationService<S> {
    /// Creates a new `NotificationService`.
    #[must_use]
    pub fn new(store: Arc<S>, catalog: Arc<NotificationCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Creates a notification from a draft.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the write fails; the
    /// catalog is left untouched in that case.
    pub async fn create(
        &self,
        draft: NotificationDraft,
    ) -> Result<NotificationDefinition, GatewayError> {
        let definition = NotificationDefinition::from_draft(draft);
        self.store.upsert_notification(&definition).await?;
        self.catalog.upsert(definition.clone()).await;
        Ok(definition)
    }

    /// Applies a draft over an existing notification.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotificationNotFound`] if no notification
    /// has the given ID, or [`GatewayError::PersistenceError`] if the
    /// write fails.
    pub async fn update(
        &self,
        id: NotificationId,
        draft: NotificationDraft,
    ) -> Result<NotificationDefinition, GatewayError> {
        let Some(existing) = self.catalog.get(id).await else {
            return Err(GatewayError::NotificationNotFound(*id.as_uuid()));
        };
        let updated = existing.with_draft(draft);
        self.store.upsert_notification(&updated).await?;
        self.catalog.upsert(updated.clone()).await;
        Ok(updated)
    }

    /// Deletes a notification.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotificationNotFound`] if no notification
    /// has the given ID, or [`GatewayError::PersistenceError`] if the
    /// delete fails.
    pub async fn delete(&self, id: NotificationId) -> Result<(), GatewayError> {
        if !self.store.delete_notification(id).await? {
            return Err(GatewayError::NotificationNotFound(*id.as_uuid()));
        }
        self.catalog.remove(id).await;
        Ok(())
    }

    /// Fetches a single notification.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotificationNotFound`] if no notification
    /// has the given ID.
    pub async fn get(&self, id: NotificationId) -> Result<NotificationDefinition, GatewayError> {
        self.catalog
            .get(id)
            .await
            .ok_or_else(|| GatewayError::NotificationNotFound(*id.as_uuid()))
    }

    /// Lists all notifications in catalog order.
    pub async fn list(&self) -> Vec<NotificationDefinition> {
        self.catalog.list().await
    }

    /// Picks at most one notification for a session on a page, recording
    /// the presentation when one is selected.
    ///
    /// Selection fails closed: any storage error yields `None` rather than
    /// surfacing a notification whose frequency rules could not be
    /// checked.
    pub async fn select_for_page(
        &self,
        session: SessionId,
        page: &str,
    ) -> Option<NotificationDefinition> {
        let now = Utc::now();
        let candidates = self.catalog.candidates_for(page, now).await;
        if candidates.is_empty() {
            return None;
        }

        let mut history = match self.store.view_records_for_session(session).await {
            Ok(records) => records,
            Err(error) => {
                tracing::debug!(%error, "view history unavailable, selecting nothing");
                return None;
            }
        };
        // once-frequency rules look across sessions, so pull the full
        // record set for just those candidates.
        for candidate in candidates
            .iter()
            .filter(|c| c.frequency == DisplayFrequency::Once)
        {
            match self.store.view_records_for_notification(candidate.id).await {
                Ok(records) => {
                    history.extend(records.into_iter().filter(|r| r.session_id != session));
                }
                Err(error) => {
                    tracing::debug!(%error, "view history unavailable, selecting nothing");
                    return None;
                }
            }
        }

        let chosen = select_notification(&candidates, &history, session, now)?.clone();

        let record = ViewRecord {
            notification_id: chosen.id,
            session_id: session,
            viewed_at: now,
            dismissed: false,
            clicked: false,
        };
        if let Err(error) = self.store.insert_view_record(&record).await {
            tracing::debug!(%error, "could not record presentation, selecting nothing");
            return None;
        }

        Some(chosen)
    }

    /// Marks the session's latest presentation of a notification as
    /// dismissed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ViewRecordNotFound`] if the session has no
    /// presentation of this notification, or
    /// [`GatewayError::PersistenceError`] if the update fails.
    pub async fn dismiss(
        &self,
        id: NotificationId,
        session: SessionId,
    ) -> Result<(), GatewayError> {
        if !self.store.mark_dismissed(id, session).await? {
            return Err(GatewayError::ViewRecordNotFound(*id.as_uuid()));
        }
        Ok(())
    }

    /// Marks the session's latest presentation as clicked and returns the
    /// notification's link URL, if any.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ViewRecordNotFound`] if the session has no
    /// presentation of this notification, or
    /// [`GatewayError::PersistenceError`] if the update fails.
    pub async fn click(
        &self,
        id: NotificationId,
        session: SessionId,
    ) -> Result<Option<String>, GatewayError> {
        if !self.store.mark_clicked(id, session).await? {
            return Err(GatewayError::ViewRecordNotFound(*id.as_uuid()));
        }
        Ok(self.catalog.get(id).await.and_then(|d| d.link_url))
    }
}
