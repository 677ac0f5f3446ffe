//! Rolling metrics snapshot and the pure change-event fold.
//!
//! [`MetricsSnapshot`] is the in-memory aggregate behind the operator
//! dashboard: seeded once from the database, then advanced by folding
//! streamed [`ChangeEvent`]s through [`MetricsSnapshot::apply`]. The fold
//! is a pure function of `(snapshot, event)`, so replaying the same event
//! sequence always produces the same snapshot.

use serde::Serialize;

use super::activity::ActivityEntry;
use super::change_event::ChangeEvent;

/// Maximum length of the recent-activity list. Oldest entries are evicted
/// on overflow.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Live, approximately-consistent summary of platform activity.
///
/// Totals are monotonic under streamed updates; only a fresh reseed can
/// lower them. The activity list is newest-first and bounded by
/// [`RECENT_ACTIVITY_LIMIT`]. Entries from different streams may
/// interleave out of true global order, which is acceptable for a
/// dashboard view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Total recorded page views.
    pub total_views: u64,
    /// Total recorded clicks across all counters.
    pub total_clicks: u64,
    /// Distinct sessions active within the trailing window at seed time.
    /// Not advanced by streamed updates.
    pub active_users: u64,
    /// Recent activity, newest first.
    pub recent_activities: Vec<ActivityEntry>,
}

impl MetricsSnapshot {
    /// Returns the snapshot that results from applying one change event.
    ///
    /// Update rules:
    /// - view recorded: `total_views + 1`, prepend a view entry;
    /// - user event recorded: prepend an event entry, totals unchanged;
    /// - click counter updated: if `new - old > 0`, add the delta to
    ///   `total_clicks` and prepend a single click entry (batched
    ///   increments collapse to one visible entry);
    /// - conversion recorded: prepend a conversion entry, totals
    ///   unchanged.
    ///
    /// Non-positive click deltas leave the snapshot untouched so that
    /// totals never decrease from streamed updates.
    #[must_use]
    pub fn apply(&self, event: &ChangeEvent) -> Self {
        let mut next = self.clone();
        match event {
            ChangeEvent::ViewRecorded { .. } => {
                next.total_views = next.total_views.saturating_add(1);
                next.push_activity(ActivityEntry::from_change(event));
            }
            ChangeEvent::EventRecorded { .. } => {
                next.push_activity(ActivityEntry::from_change(event));
            }
            ChangeEvent::ClickCounterUpdated {
                old_value,
                new_value,
                ..
            } => {
                let delta = new_value.saturating_sub(*old_value);
                if delta > 0 {
                    let delta = u64::try_from(delta).unwrap_or(0);
                    next.total_clicks = next.total_clicks.saturating_add(delta);
                    next.push_activity(ActivityEntry::from_change(event));
                }
            }
            ChangeEvent::ConversionRecorded { .. } => {
                next.push_activity(ActivityEntry::from_change(event));
            }
        }
        next
    }

    /// Prepends an entry and enforces the activity list bound.
    fn push_activity(&mut self, entry: ActivityEntry) {
        self.recent_activities.insert(0, entry);
        self.recent_activities.truncate(RECENT_ACTIVITY_LIMIT);
    }
}
