//! Persistence layer: PostgreSQL storage behind the [`Store`] trait.
//!
//! Services depend on the [`Store`] trait rather than on a concrete
//! database, so business logic is testable against the in-memory
//! implementation. The production implementation is
//! [`postgres::PostgresStore`] over `sqlx::PgPool`. All row shapes are
//! typed at this boundary; nothing above it sees raw rows.

pub mod models;
pub mod postgres;

#[cfg(test)]
pub(crate) mod memory;

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{ActivityEntry, NotificationDefinition, NotificationId, SessionId, ViewRecord};
use crate::error::GatewayError;

/// Storage operations the services need.
///
/// Implementations must be cheap to share (`&self` methods only). The
/// methods are declared with explicit `impl Future + Send` return types
/// so callers can await them inside spawned tasks; implementations may
/// still use plain `async fn`.
pub trait Store: Send + Sync + 'static {
    /// Inserts a page view row.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn insert_page_view(
        &self,
        session: SessionId,
        page: &str,
        referrer: Option<&str>,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Inserts a generic user event row.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn insert_user_event(
        &self,
        session: SessionId,
        name: &str,
        details: &str,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Atomically adds `by` to the named click counter, creating it at
    /// zero if absent. Returns `(old_value, new_value)`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn bump_click_counter(
        &self,
        target: &str,
        by: i64,
    ) -> impl Future<Output = Result<(i64, i64), GatewayError>> + Send;

    /// Inserts a conversion row.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn insert_conversion(
        &self,
        session: SessionId,
        goal: &str,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Appends an entry to the activity feed table.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn append_activity(
        &self,
        entry: &ActivityEntry,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Returns the total number of page view rows.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn total_page_views(&self) -> impl Future<Output = Result<u64, GatewayError>> + Send;

    /// Returns the sum of all click counters.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn total_clicks(&self) -> impl Future<Output = Result<u64, GatewayError>> + Send;

    /// Returns the number of distinct sessions with a page view at or
    /// after `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn active_sessions_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, GatewayError>> + Send;

    /// Returns up to `limit` activity entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn recent_activities(
        &self,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<ActivityEntry>, GatewayError>> + Send;

    /// Inserts or replaces a notification definition.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn upsert_notification(
        &self,
        definition: &NotificationDefinition,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Deletes a notification definition, returning `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn delete_notification(
        &self,
        id: NotificationId,
    ) -> impl Future<Output = Result<bool, GatewayError>> + Send;

    /// Loads all notification definitions in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure or
    /// when a row holds an unknown kind/frequency value.
    fn load_notifications(
        &self,
    ) -> impl Future<Output = Result<Vec<NotificationDefinition>, GatewayError>> + Send;

    /// Inserts a fresh view record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn insert_view_record(
        &self,
        record: &ViewRecord,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Returns all view records for the given session.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn view_records_for_session(
        &self,
        session: SessionId,
    ) -> impl Future<Output = Result<Vec<ViewRecord>, GatewayError>> + Send;

    /// Returns all view records for the given notification, across all
    /// sessions. Used for once-frequency eligibility.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn view_records_for_notification(
        &self,
        id: NotificationId,
    ) -> impl Future<Output = Result<Vec<ViewRecord>, GatewayError>> + Send;

    /// Marks the latest view record of `(notification, session)` as
    /// dismissed. Returns `false` if no record exists.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn mark_dismissed(
        &self,
        id: NotificationId,
        session: SessionId,
    ) -> impl Future<Output = Result<bool, GatewayError>> + Send;

    /// Marks the latest view record of `(notification, session)` as
    /// clicked. Returns `false` if no record exists.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn mark_clicked(
        &self,
        id: NotificationId,
        session: SessionId,
    ) -> impl Future<Output = Result<bool, GatewayError>> + Send;

    /// Inserts or replaces a settings row.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn put_setting(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Returns the settings row with the given key, if any.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn get_setting(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, GatewayError>> + Send;

    /// Returns the paths of all published content pages.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn published_paths(&self) -> impl Future<Output = Result<Vec<String>, GatewayError>> + Send;

    /// Recomputes and stores the per-day view/event/conversion counts for
    /// the given day.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn rollup_daily(&self, day: NaiveDate)
    -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Records the outcome of a scheduled job run.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    fn record_job_run(
        &self,
        job: &str,
        success: bool,
        detail: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
