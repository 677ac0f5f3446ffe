//! Sitemap refresh job.
//!
//! Rebuilds the sitemap from the published content pages and stores the
//! XML in the settings table, where the `/sitemap.xml` endpoint serves it
//! from.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::persistence::Store;

/// Job name used in the job-run log.
pub const JOB_NAME: &str = "sitemap_refresh";

/// Settings key the generated XML is stored under.
pub const SITEMAP_SETTING_KEY: &str = "sitemap_xml";

/// Runs the sitemap refresh loop until aborted.
pub async fn run_loop<S: Store>(store: Arc<S>, base_url: String, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        match run_once(store.as_ref(), &base_url).await {
            Ok(detail) => {
                tracing::info!(job = JOB_NAME, %detail, "sitemap refreshed");
                record_outcome(store.as_ref(), true, &detail).await;
            }
            Err(error) => {
                tracing::error!(job = JOB_NAME, %error, "sitemap refresh failed");
                record_outcome(store.as_ref(), false, &error.to_string()).await;
            }
        }
    }
}

/// Rebuilds and stores the sitemap once.
///
/// # Errors
///
/// Returns an error when reading the published paths or storing the XML
/// fails.
pub async fn run_once<S: Store>(store: &S, base_url: &str) -> anyhow::Result<String> {
    let paths = store
        .published_paths()
        .await
        .context("loading published paths")?;
    let count = paths.len();
    let xml = build_sitemap_xml(base_url, &paths);
    store
        .put_setting(SITEMAP_SETTING_KEY, &xml)
        .await
        .context("storing generated sitemap")?;
    Ok(format!("{count} urls"))
}

/// Renders the sitemap XML for the given page paths.
#[must_use]
pub fn build_sitemap_xml(base_url: &str, paths: &[String]) -> String {
    let base = base_url.trim_end_matches('/');
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for path in paths {
        let loc = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        xml.push_str("  <url><loc>");
        xml.push_str(&escape_xml(&loc));
        xml.push_str("</loc></url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

async fn record_outcome<S: Store>(store: &S, success: bool, detail: &str) {
    if let Err(error) = store.record_job_run(JOB_NAME, success, detail).await {
        tracing::warn!(job = JOB_NAME, %error, "could not record job run");
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::memory::MemoryStore;

    #[test]
    fn sitemap_lists_every_path_under_the_base_url() {
        let paths = vec!["/".to_string(), "/bonuses".to_string(), "reviews/royal".to_string()];
        let xml = build_sitemap_xml("https://example.com/", &paths);

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<loc>https://example.com/bonuses</loc>"));
        assert!(xml.contains("<loc>https://example.com/reviews/royal</loc>"));
        assert!(xml.ends_with("</urlset>\n"));
    }

    #[test]
    fn special_characters_are_escaped() {
        let paths = vec!["/bonus?a=1&b=<2>".to_string()];
        let xml = build_sitemap_xml("https://example.com", &paths);
        assert!(xml.contains("/bonus?a=1&amp;b=&lt;2&gt;"));
    }

    #[tokio::test]
    async fn run_once_stores_the_xml_in_settings() {
        let store = MemoryStore::new();
        store
            .set_content_paths(vec!["/".to_string(), "/bonuses".to_string()])
            .await;

        let detail = run_once(&store, "https://example.com")
            .await
            .unwrap_or_else(|e| panic!("sitemap job failed: {e}"));
        assert_eq!(detail, "2 urls");

        let stored = store.get_setting(SITEMAP_SETTING_KEY).await;
        let Ok(Some(xml)) = stored else {
            panic!("expected stored sitemap");
        };
        assert!(xml.contains("https://example.com/bonuses"));
    }
}
