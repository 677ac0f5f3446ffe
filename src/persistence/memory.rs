//! In-memory [`Store`] implementation for service-level tests.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;

use super::Store;
use crate::domain::{ActivityEntry, NotificationDefinition, NotificationId, SessionId, ViewRecord};
use crate::error::GatewayError;

#[derive(Debug, Default)]
struct MemoryState {
    page_views: Vec<(SessionId, String, DateTime<Utc>)>,
    user_events: Vec<(SessionId, String, String, DateTime<Utc>)>,
    click_counters: HashMap<String, i64>,
    conversions: Vec<(SessionId, String, DateTime<Utc>)>,
    activities: Vec<ActivityEntry>,
    notifications: Vec<NotificationDefinition>,
    view_records: Vec<ViewRecord>,
    settings: HashMap<String, String>,
    content_paths: Vec<String>,
    daily_stats: HashMap<NaiveDate, (i64, i64, i64)>,
    job_runs: Vec<(String, bool, String)>,
}

/// Test double storing everything in process memory.
///
/// `with_failing_reads` builds a store whose read queries all fail,
/// for exercising error paths the normal store never hits.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_reads: bool,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_failing_reads() -> Self {
        Self {
            state: Mutex::default(),
            fail_reads: true,
        }
    }

    fn check_reads(&self) -> Result<(), GatewayError> {
        if self.fail_reads {
            return Err(GatewayError::PersistenceError(
                "simulated read failure".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) async fn set_content_paths(&self, paths: Vec<String>) {
        self.state.lock().await.content_paths = paths;
    }

    pub(crate) async fn view_record_count(&self) -> usize {
        self.state.lock().await.view_records.len()
    }

    pub(crate) async fn all_view_records(&self) -> Vec<ViewRecord> {
        self.state.lock().await.view_records.clone()
    }

    pub(crate) async fn job_runs(&self) -> Vec<(String, bool, String)> {
        self.state.lock().await.job_runs.clone()
    }

    pub(crate) async fn daily_stats(&self, day: NaiveDate) -> Option<(i64, i64, i64)> {
        self.state.lock().await.daily_stats.get(&day).copied()
    }
}

impl Store for MemoryStore {
    async fn insert_page_view(
        &self,
        session: SessionId,
        page: &str,
        _referrer: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), GatewayError> {
        self.state
            .lock()
            .await
            .page_views
            .push((session, page.to_string(), at));
        Ok(())
    }

    async fn insert_user_event(
        &self,
        session: SessionId,
        name: &str,
        details: &str,
        at: DateTime<Utc>,
    ) -> Result<(), GatewayError> {
        self.state
            .lock()
            .await
            .user_events
            .push((session, name.to_string(), details.to_string(), at));
        Ok(())
    }

    async fn bump_click_counter(&self, target: &str, by: i64) -> Result<(i64, i64), GatewayError> {
        let mut state = self.state.lock().await;
        let counter = state.click_counters.entry(target.to_string()).or_insert(0);
        let old = *counter;
        *counter += by;
        Ok((old, *counter))
    }

    async fn insert_conversion(
        &self,
        session: SessionId,
        goal: &str,
        at: DateTime<Utc>,
    ) -> Result<(), GatewayError> {
        self.state
            .lock()
            .await
            .conversions
            .push((session, goal.to_string(), at));
        Ok(())
    }

    async fn append_activity(&self, entry: &ActivityEntry) -> Result<(), GatewayError> {
        self.state.lock().await.activities.push(entry.clone());
        Ok(())
    }

    async fn total_page_views(&self) -> Result<u64, GatewayError> {
        self.check_reads()?;
        Ok(self.state.lock().await.page_views.len() as u64)
    }

    async fn total_clicks(&self) -> Result<u64, GatewayError> {
        self.check_reads()?;
        let sum: i64 = self.state.lock().await.click_counters.values().sum();
        Ok(u64::try_from(sum).unwrap_or(0))
    }

    async fn active_sessions_since(&self, cutoff: DateTime<Utc>) -> Result<u64, GatewayError> {
        self.check_reads()?;
        let state = self.state.lock().await;
        let mut sessions: Vec<SessionId> = state
            .page_views
            .iter()
            .filter(|(_, _, at)| *at >= cutoff)
            .map(|(s, _, _)| *s)
            .collect();
        sessions.sort_by_key(|s| *s.as_uuid());
        sessions.dedup();
        Ok(sessions.len() as u64)
    }

    async fn recent_activities(&self, limit: i64) -> Result<Vec<ActivityEntry>, GatewayError> {
        self.check_reads()?;
        let state = self.state.lock().await;
        let mut entries = state.activities.clone();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(entries)
    }

    async fn upsert_notification(
        &self,
        definition: &NotificationDefinition,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state
            .notifications
            .iter_mut()
            .find(|d| d.id == definition.id)
        {
            *existing = definition.clone();
        } else {
            state.notifications.push(definition.clone());
        }
        Ok(())
    }

    async fn delete_notification(&self, id: NotificationId) -> Result<bool, GatewayError> {
        let mut state = self.state.lock().await;
        let before = state.notifications.len();
        state.notifications.retain(|d| d.id != id);
        Ok(state.notifications.len() != before)
    }

    async fn load_notifications(&self) -> Result<Vec<NotificationDefinition>, GatewayError> {
        Ok(self.state.lock().await.notifications.clone())
    }

    async fn insert_view_record(&self, record: &ViewRecord) -> Result<(), GatewayError> {
        self.state.lock().await.view_records.push(record.clone());
        Ok(())
    }

    async fn view_records_for_session(
        &self,
        session: SessionId,
    ) -> Result<Vec<ViewRecord>, GatewayError> {
        Ok(self
            .state
            .lock()
            .await
            .view_records
            .iter()
            .filter(|r| r.session_id == session)
            .cloned()
            .collect())
    }

    async fn view_records_for_notification(
        &self,
        id: NotificationId,
    ) -> Result<Vec<ViewRecord>, GatewayError> {
        Ok(self
            .state
            .lock()
            .await
            .view_records
            .iter()
            .filter(|r| r.notification_id == id)
            .cloned()
            .collect())
    }

    async fn mark_dismissed(
        &self,
        id: NotificationId,
        session: SessionId,
    ) -> Result<bool, GatewayError> {
        let mut state = self.state.lock().await;
        let latest = state
            .view_records
            .iter_mut()
            .filter(|r| r.notification_id == id && r.session_id == session)
            .max_by_key(|r| r.viewed_at);
        match latest {
            Some(record) => {
                record.dismissed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_clicked(
        &self,
        id: NotificationId,
        session: SessionId,
    ) -> Result<bool, GatewayError> {
        let mut state = self.state.lock().await;
        let latest = state
            .view_records
            .iter_mut()
            .filter(|r| r.notification_id == id && r.session_id == session)
            .max_by_key(|r| r.viewed_at);
        match latest {
            Some(record) => {
                record.clicked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn put_setting(&self, key: &str, value: &str) -> Result<(), GatewayError> {
        self.state
            .lock()
            .await
            .settings
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, GatewayError> {
        Ok(self.state.lock().await.settings.get(key).cloned())
    }

    async fn published_paths(&self) -> Result<Vec<String>, GatewayError> {
        Ok(self.state.lock().await.content_paths.clone())
    }

    async fn rollup_daily(&self, day: NaiveDate) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        let views = state
            .page_views
            .iter()
            .filter(|(_, _, at)| at.date_naive() == day)
            .count() as i64;
        let events = state
            .user_events
            .iter()
            .filter(|(_, _, _, at)| at.date_naive() == day)
            .count() as i64;
        let conversions = state
            .conversions
            .iter()
            .filter(|(_, _, at)| at.date_naive() == day)
            .count() as i64;
        state.daily_stats.insert(day, (views, events, conversions));
        Ok(())
    }

    async fn record_job_run(
        &self,
        job: &str,
        success: bool,
        detail: &str,
    ) -> Result<(), GatewayError> {
        self.state
            .lock()
            .await
            .job_runs
            .push((job.to_string(), success, detail.to_string()));
        Ok(())
    }
}
