//! Daily stats rollup job.
//!
//! Folds the day's raw tracking rows into one `daily_stats` row per day.
//! The rollup is idempotent, so re-running it for the same day just
//! refreshes the counts.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;

use crate::persistence::Store;

/// Job name used in the job-run log.
pub const JOB_NAME: &str = "daily_rollup";

/// Runs the rollup loop until aborted.
pub async fn run_loop<S: Store>(store: Arc<S>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        match run_once(store.as_ref()).await {
            Ok(detail) => {
                tracing::info!(job = JOB_NAME, %detail, "rollup completed");
                record_outcome(store.as_ref(), true, &detail).await;
            }
            Err(error) => {
                tracing::error!(job = JOB_NAME, %error, "rollup failed");
                record_outcome(store.as_ref(), false, &error.to_string()).await;
            }
        }
    }
}

/// Rolls up the current day once.
///
/// # Errors
///
/// Returns an error when the rollup query fails.
pub async fn run_once<S: Store>(store: &S) -> anyhow::Result<String> {
    let today = Utc::now().date_naive();
    store
        .rollup_daily(today)
        .await
        .with_context(|| format!("rolling up stats for {today}"))?;
    Ok(format!("rolled up {today}"))
}

async fn record_outcome<S: Store>(store: &S, success: bool, detail: &str) {
    if let Err(error) = store.record_job_run(JOB_NAME, success, detail).await {
        tracing::warn!(job = JOB_NAME, %error, "could not record job run");
    }
}
