//! PostgreSQL implementation of the [`Store`] trait.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::Store;
use super::models::{NotificationRow, ViewRecordRow};
use crate::domain::{
    ActivityEntry, ActivityKind, NotificationDefinition, NotificationId, SessionId, ViewRecord,
};
use crate::error::GatewayError;

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(e: sqlx::Error) -> GatewayError {
    GatewayError::PersistenceError(e.to_string())
}

impl Store for PostgresStore {
    async fn insert_page_view(
        &self,
        session: SessionId,
        page: &str,
        referrer: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO page_views (session_id, page, referrer, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(session.as_uuid())
        .bind(page)
        .bind(referrer)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn insert_user_event(
        &self,
        session: SessionId,
        name: &str,
        details: &str,
        at: DateTime<Utc>,
    ) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO user_events (session_id, name, details, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(session.as_uuid())
        .bind(name)
        .bind(details)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn bump_click_counter(&self, target: &str, by: i64) -> Result<(i64, i64), GatewayError> {
        let new_value = sqlx::query_scalar::<_, i64>(
            "INSERT INTO click_counters (target, clicks, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (target) DO UPDATE \
             SET clicks = click_counters.clicks + EXCLUDED.clicks, updated_at = now() \
             RETURNING clicks",
        )
        .bind(target)
        .bind(by)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok((new_value.saturating_sub(by), new_value))
    }

    async fn insert_conversion(
        &self,
        session: SessionId,
        goal: &str,
        at: DateTime<Utc>,
    ) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO conversions (session_id, goal, created_at) VALUES ($1, $2, $3)",
        )
        .bind(session.as_uuid())
        .bind(goal)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn append_activity(&self, entry: &ActivityEntry) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO activities (id, kind, details, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.id)
        .bind(entry.kind.as_str())
        .bind(&entry.details)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn total_page_views(&self) -> Result<u64, GatewayError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM page_views")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn total_clicks(&self) -> Result<u64, GatewayError> {
        let sum = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(clicks), 0)::BIGINT FROM click_counters",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(u64::try_from(sum).unwrap_or(0))
    }

    async fn active_sessions_since(&self, cutoff: DateTime<Utc>) -> Result<u64, GatewayError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT session_id) FROM page_views WHERE created_at >= $1",
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn recent_activities(&self, limit: i64) -> Result<Vec<ActivityEntry>, GatewayError> {
        let rows = sqlx::query_as::<_, (Uuid, String, String, DateTime<Utc>)>(
            "SELECT id, kind, details, created_at FROM activities \
             ORDER BY created_at DESC, id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        // A single malformed row must not blank the dashboard feed.
        Ok(rows
            .into_iter()
            .filter_map(|(id, kind, details, created_at)| {
                let Some(kind) = ActivityKind::parse(&kind) else {
                    tracing::warn!(%id, kind, "skipping activity row with unknown kind");
                    return None;
                };
                Some(ActivityEntry {
                    id,
                    kind,
                    timestamp: created_at,
                    details,
                })
            })
            .collect())
    }

    async fn upsert_notification(
        &self,
        definition: &NotificationDefinition,
    ) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO notifications \
             (id, title, content, kind, display_frequency, display_pages, priority, \
              starts_at, ends_at, link_url, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (id) DO UPDATE SET \
               title = EXCLUDED.title, content = EXCLUDED.content, kind = EXCLUDED.kind, \
               display_frequency = EXCLUDED.display_frequency, \
               display_pages = EXCLUDED.display_pages, priority = EXCLUDED.priority, \
               starts_at = EXCLUDED.starts_at, ends_at = EXCLUDED.ends_at, \
               link_url = EXCLUDED.link_url",
        )
        .bind(definition.id.as_uuid())
        .bind(&definition.title)
        .bind(&definition.content)
        .bind(definition.kind.as_str())
        .bind(definition.frequency.as_str())
        .bind(definition.pages.to_wildcard_list())
        .bind(definition.priority)
        .bind(definition.starts_at)
        .bind(definition.ends_at)
        .bind(definition.link_url.as_deref())
        .bind(definition.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete_notification(&self, id: NotificationId) -> Result<bool, GatewayError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn load_notifications(&self) -> Result<Vec<NotificationDefinition>, GatewayError> {
        let rows = sqlx::query_as::<
            _,
            (
                Uuid,
                String,
                String,
                String,
                String,
                Vec<String>,
                i32,
                Option<DateTime<Utc>>,
                Option<DateTime<Utc>>,
                Option<String>,
                DateTime<Utc>,
            ),
        >(
            "SELECT id, title, content, kind, display_frequency, display_pages, priority, \
             starts_at, ends_at, link_url, created_at \
             FROM notifications ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter()
            .map(
                |(
                    id,
                    title,
                    content,
                    kind,
                    display_frequency,
                    display_pages,
                    priority,
                    starts_at,
                    ends_at,
                    link_url,
                    created_at,
                )| {
                    NotificationDefinition::try_from(NotificationRow {
                        id,
                        title,
                        content,
                        kind,
                        display_frequency,
                        display_pages,
                        priority,
                        starts_at,
                        ends_at,
                        link_url,
                        created_at,
                    })
                },
            )
            .collect()
    }

    async fn insert_view_record(&self, record: &ViewRecord) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO notification_views \
             (notification_id, session_id, viewed_at, dismissed, clicked) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(record.notification_id.as_uuid())
        .bind(record.session_id.as_uuid())
        .bind(record.viewed_at)
        .bind(record.dismissed)
        .bind(record.clicked)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn view_records_for_session(
        &self,
        session: SessionId,
    ) -> Result<Vec<ViewRecord>, GatewayError> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid, DateTime<Utc>, bool, bool)>(
            "SELECT notification_id, session_id, viewed_at, dismissed, clicked \
             FROM notification_views WHERE session_id = $1 ORDER BY viewed_at",
        )
        .bind(session.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(
                |(notification_id, session_id, viewed_at, dismissed, clicked)| {
                    ViewRecord::from(ViewRecordRow {
                        notification_id,
                        session_id,
                        viewed_at,
                        dismissed,
                        clicked,
                    })
                },
            )
            .collect())
    }

    async fn view_records_for_notification(
        &self,
        id: NotificationId,
    ) -> Result<Vec<ViewRecord>, GatewayError> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid, DateTime<Utc>, bool, bool)>(
            "SELECT notification_id, session_id, viewed_at, dismissed, clicked \
             FROM notification_views WHERE notification_id = $1 ORDER BY viewed_at",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(
                |(notification_id, session_id, viewed_at, dismissed, clicked)| {
                    ViewRecord::from(ViewRecordRow {
                        notification_id,
                        session_id,
                        viewed_at,
                        dismissed,
                        clicked,
                    })
                },
            )
            .collect())
    }

    async fn mark_dismissed(
        &self,
        id: NotificationId,
        session: SessionId,
    ) -> Result<bool, GatewayError> {
        let result = sqlx::query(
            "UPDATE notification_views SET dismissed = TRUE WHERE id = ( \
               SELECT id FROM notification_views \
               WHERE notification_id = $1 AND session_id = $2 \
               ORDER BY viewed_at DESC LIMIT 1)",
        )
        .bind(id.as_uuid())
        .bind(session.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_clicked(
        &self,
        id: NotificationId,
        session: SessionId,
    ) -> Result<bool, GatewayError> {
        let result = sqlx::query(
            "UPDATE notification_views SET clicked = TRUE WHERE id = ( \
               SELECT id FROM notification_views \
               WHERE notification_id = $1 AND session_id = $2 \
               ORDER BY viewed_at DESC LIMIT 1)",
        )
        .bind(id.as_uuid())
        .bind(session.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn put_setting(&self, key: &str, value: &str) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, GatewayError> {
        sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn published_paths(&self) -> Result<Vec<String>, GatewayError> {
        sqlx::query_scalar::<_, String>(
            "SELECT path FROM content_pages WHERE published ORDER BY path",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn rollup_daily(&self, day: NaiveDate) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO daily_stats (day, views, events, conversions) SELECT $1, \
               (SELECT COUNT(*) FROM page_views WHERE created_at::date = $1), \
               (SELECT COUNT(*) FROM user_events WHERE created_at::date = $1), \
               (SELECT COUNT(*) FROM conversions WHERE created_at::date = $1) \
             ON CONFLICT (day) DO UPDATE SET \
               views = EXCLUDED.views, events = EXCLUDED.events, \
               conversions = EXCLUDED.conversions",
        )
        .bind(day)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn record_job_run(
        &self,
        job: &str,
        success: bool,
        detail: &str,
    ) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO job_runs (job, success, detail, run_at) VALUES ($1, $2, $3, now())",
        )
        .bind(job)
        .bind(success)
        .bind(detail)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}
