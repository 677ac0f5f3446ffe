//! Per-connection subscription manager.
//!
//! Tracks which activity streams a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::ActivityKind;

/// Manages the stream subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed activity kinds. Ignored while `subscribe_all` is true.
    kinds: HashSet<ActivityKind>,
    /// Whether the client subscribes to all streams (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds activity kinds to the subscription set. `wildcard` enables the
    /// catch-all.
    pub fn subscribe(&mut self, kinds: &[ActivityKind], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        for kind in kinds {
            self.kinds.insert(*kind);
        }
    }

    /// Removes activity kinds from the subscription set. `wildcard`
    /// disables the catch-all.
    pub fn unsubscribe(&mut self, kinds: &[ActivityKind], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for kind in kinds {
            self.kinds.remove(kind);
        }
    }

    /// Returns `true` if events of the given kind should be forwarded.
    #[must_use]
    pub fn matches(&self, kind: ActivityKind) -> bool {
        self.subscribe_all || self.kinds.contains(&kind)
    }

    /// Returns the number of explicitly subscribed kinds.
    #[must_use]
    pub fn count(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(ActivityKind::View));
    }

    #[test]
    fn subscribe_specific_stream() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[ActivityKind::Click], false);
        assert!(mgr.matches(ActivityKind::Click));
        assert!(!mgr.matches(ActivityKind::View));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.matches(ActivityKind::View));
        assert!(mgr.matches(ActivityKind::Conversion));
    }

    #[test]
    fn unsubscribe_removes_stream() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[ActivityKind::View], false);
        assert!(mgr.matches(ActivityKind::View));
        mgr.unsubscribe(&[ActivityKind::View], false);
        assert!(!mgr.matches(ActivityKind::View));
    }

    #[test]
    fn unsubscribe_wildcard_disables_catch_all() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        mgr.unsubscribe(&[], true);
        assert!(!mgr.matches(ActivityKind::Event));
    }

    #[test]
    fn count_tracks_explicit() {
        let mut mgr = SubscriptionManager::new();
        assert_eq!(mgr.count(), 0);
        mgr.subscribe(&[ActivityKind::View, ActivityKind::Click], false);
        assert_eq!(mgr.count(), 2);
    }
}
