//! In-memory notification catalog.
//!
//! [`NotificationCatalog`] holds all configured notification definitions
//! behind a [`tokio::sync::RwLock`]. Definitions are small immutable
//! values, stored in creation order because selection tie-break depends
//! on catalog order. Loaded from the database at startup and kept in sync
//! by the admin CRUD operations.

use tokio::sync::RwLock;

use super::ids::NotificationId;
use super::notification::NotificationDefinition;

/// Insertion-ordered store for all configured notifications.
///
/// # Concurrency
///
/// Reads (selection, listing) take a shared lock; admin mutations take
/// the exclusive lock. Catalogs are small, so linear scans are fine.
#[derive(Debug, Default)]
pub struct NotificationCatalog {
    entries: RwLock<Vec<NotificationDefinition>>,
}

impl NotificationCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the full catalog contents, preserving the given order.
    pub async fn load(&self, definitions: Vec<NotificationDefinition>) {
        *self.entries.write().await = definitions;
    }

    /// Inserts a definition, or replaces the one with the same ID in place.
    pub async fn upsert(&self, definition: NotificationDefinition) {
        let mut entries = self.entries.write().await;
        if let Some(existing) = entries.iter_mut().find(|d| d.id == definition.id) {
            *existing = definition;
        } else {
            entries.push(definition);
        }
    }

    /// Removes a definition, returning `true` if it existed.
    pub async fn remove(&self, id: NotificationId) -> bool {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|d| d.id != id);
        entries.len() != before
    }

    /// Returns a copy of the definition with the given ID.
    pub async fn get(&self, id: NotificationId) -> Option<NotificationDefinition> {
        self.entries
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    /// Returns all definitions in catalog order.
    pub async fn list(&self) -> Vec<NotificationDefinition> {
        self.entries.read().await.clone()
    }

    /// Returns the definitions eligible for page filtering: active at
    /// `now` and covering `page`, in catalog order.
    pub async fn candidates_for(
        &self,
        page: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Vec<NotificationDefinition> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|d| d.is_active_at(now) && d.applies_to_page(page))
            .cloned()
            .collect()
    }

    /// Returns the number of definitions in the catalog.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if the catalog is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::notification::{
        DisplayFrequency, DisplayPages, NotificationDraft, NotificationKind,
    };
    use chrono::{Duration, Utc};

    fn make_definition(pages: DisplayPages) -> NotificationDefinition {
        NotificationDefinition::from_draft(NotificationDraft {
            title: "Weekly cashback".to_string(),
            content: "10% back every Monday".to_string(),
            kind: NotificationKind::Banner,
            frequency: DisplayFrequency::Daily,
            pages,
            priority: 1,
            starts_at: None,
            ends_at: None,
            link_url: None,
        })
    }

    #[tokio::test]
    async fn upsert_and_get() {
        let catalog = NotificationCatalog::new();
        let def = make_definition(DisplayPages::All);
        let id = def.id;

        catalog.upsert(def).await;
        assert!(catalog.get(id).await.is_some());
        assert_eq!(catalog.len().await, 1);
    }

    #[tokio::test]
    async fn upsert_replaces_in_place() {
        let catalog = NotificationCatalog::new();
        let def = make_definition(DisplayPages::All);
        let id = def.id;
        catalog.upsert(def.clone()).await;

        let mut updated = def;
        updated.title = "New title".to_string();
        catalog.upsert(updated).await;

        assert_eq!(catalog.len().await, 1);
        let fetched = catalog.get(id).await;
        assert_eq!(fetched.map(|d| d.title), Some("New title".to_string()));
    }

    #[tokio::test]
    async fn remove_returns_whether_it_existed() {
        let catalog = NotificationCatalog::new();
        let def = make_definition(DisplayPages::All);
        let id = def.id;
        catalog.upsert(def).await;

        assert!(catalog.remove(id).await);
        assert!(!catalog.remove(id).await);
        assert!(catalog.is_empty().await);
    }

    #[tokio::test]
    async fn candidates_respect_page_and_window() {
        let catalog = NotificationCatalog::new();
        let everywhere = make_definition(DisplayPages::All);
        let bonuses_only =
            make_definition(DisplayPages::Pages(vec!["/bonuses".to_string()]));
        let mut expired = make_definition(DisplayPages::All);
        expired.ends_at = Some(Utc::now() - Duration::hours(1));

        catalog.upsert(everywhere.clone()).await;
        catalog.upsert(bonuses_only.clone()).await;
        catalog.upsert(expired).await;

        let on_home = catalog.candidates_for("/", Utc::now()).await;
        assert_eq!(on_home.len(), 1);
        assert_eq!(on_home.first().map(|d| d.id), Some(everywhere.id));

        let on_bonuses = catalog.candidates_for("/bonuses", Utc::now()).await;
        assert_eq!(on_bonuses.len(), 2);
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let catalog = NotificationCatalog::new();
        let first = make_definition(DisplayPages::All);
        let second = make_definition(DisplayPages::All);
        catalog.upsert(first.clone()).await;
        catalog.upsert(second.clone()).await;

        let listed = catalog.list().await;
        assert_eq!(listed.first().map(|d| d.id), Some(first.id));
        assert_eq!(listed.last().map(|d| d.id), Some(second.id));
    }
}
