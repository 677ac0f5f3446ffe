//! Notification campaign definitions and the targeting engine.
//!
//! [`select_notification`] is the deterministic core of notification
//! delivery: given page-filtered candidates and the relevant view history,
//! it picks at most one definition to present. Recording the presentation
//! is the service layer's job; this module stays a pure function of its
//! inputs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{NotificationId, SessionId};

/// Visual style of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Inline banner at the top of the page.
    Banner,
    /// Corner popup.
    Popup,
    /// Blocking modal dialog.
    Modal,
}

impl NotificationKind {
    /// Returns the kind as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::Popup => "popup",
            Self::Modal => "modal",
        }
    }

    /// Parses a kind from its wire string. Returns `None` for unknown input.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "banner" => Some(Self::Banner),
            "popup" => Some(Self::Popup),
            "modal" => Some(Self::Modal),
            _ => None,
        }
    }
}

/// How often a notification may be re-presented to the same audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisplayFrequency {
    /// Eligible on every evaluation, even with prior views.
    Always,
    /// Eligible again 24 hours after the last same-session view.
    Daily,
    /// At most once per session.
    Session,
    /// At most once ever: any view record, from any session, blocks it.
    Once,
}

impl DisplayFrequency {
    /// Returns the frequency as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Daily => "daily",
            Self::Session => "session",
            Self::Once => "once",
        }
    }

    /// Parses a frequency from its wire string. Returns `None` for unknown
    /// input.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "always" => Some(Self::Always),
            "daily" => Some(Self::Daily),
            "session" => Some(Self::Session),
            "once" => Some(Self::Once),
            _ => None,
        }
    }
}

/// Pages a notification may appear on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayPages {
    /// Every page.
    All,
    /// Only the listed page paths.
    Pages(Vec<String>),
}

impl DisplayPages {
    /// Builds from a wire list where the entry `"all"` acts as a wildcard.
    #[must_use]
    pub fn from_wildcard_list(pages: Vec<String>) -> Self {
        if pages.iter().any(|p| p == "all") {
            Self::All
        } else {
            Self::Pages(pages)
        }
    }

    /// Renders back to the wire list form (`["all"]` for the wildcard).
    #[must_use]
    pub fn to_wildcard_list(&self) -> Vec<String> {
        match self {
            Self::All => vec!["all".to_string()],
            Self::Pages(pages) => pages.clone(),
        }
    }

    /// Returns `true` if the given page is covered.
    #[must_use]
    pub fn contains(&self, page: &str) -> bool {
        match self {
            Self::All => true,
            Self::Pages(pages) => pages.iter().any(|p| p == page),
        }
    }
}

/// Fields of a notification under admin control, without identity.
///
/// Handlers build a draft from the request body; the service turns it
/// into a [`NotificationDefinition`] (create) or merges it over an
/// existing one (update).
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    /// Short headline.
    pub title: String,
    /// Body content.
    pub content: String,
    /// Visual style.
    pub kind: NotificationKind,
    /// Re-presentation rule.
    pub frequency: DisplayFrequency,
    /// Pages the notification may appear on.
    pub pages: DisplayPages,
    /// Selection priority; higher wins.
    pub priority: i32,
    /// Optional start of the active window.
    pub starts_at: Option<DateTime<Utc>>,
    /// Optional end of the active window.
    pub ends_at: Option<DateTime<Utc>>,
    /// Optional navigation target for clicks.
    pub link_url: Option<String>,
}

/// A configured notification campaign.
///
/// Owned and mutated by the admin surface; read-only to the targeting
/// engine.
#[derive(Debug, Clone)]
pub struct NotificationDefinition {
    /// Unique identifier (immutable after creation).
    pub id: NotificationId,
    /// Short headline.
    pub title: String,
    /// Body content.
    pub content: String,
    /// Visual style.
    pub kind: NotificationKind,
    /// Re-presentation rule.
    pub frequency: DisplayFrequency,
    /// Pages the notification may appear on.
    pub pages: DisplayPages,
    /// Selection priority; higher wins, ties keep catalog order.
    pub priority: i32,
    /// Optional start of the active window.
    pub starts_at: Option<DateTime<Utc>>,
    /// Optional end of the active window.
    pub ends_at: Option<DateTime<Utc>>,
    /// Optional navigation target for clicks.
    pub link_url: Option<String>,
    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,
}

impl NotificationDefinition {
    /// Creates a definition from a draft with a fresh identity.
    #[must_use]
    pub fn from_draft(draft: NotificationDraft) -> Self {
        Self {
            id: NotificationId::new(),
            title: draft.title,
            content: draft.content,
            kind: draft.kind,
            frequency: draft.frequency,
            pages: draft.pages,
            priority: draft.priority,
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            link_url: draft.link_url,
            created_at: Utc::now(),
        }
    }

    /// Returns a copy with the draft's fields applied, keeping identity
    /// and creation time.
    #[must_use]
    pub fn with_draft(&self, draft: NotificationDraft) -> Self {
        Self {
            id: self.id,
            title: draft.title,
            content: draft.content,
            kind: draft.kind,
            frequency: draft.frequency,
            pages: draft.pages,
            priority: draft.priority,
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            link_url: draft.link_url,
            created_at: self.created_at,
        }
    }

    /// Returns `true` if the notification may appear on the given page.
    #[must_use]
    pub fn applies_to_page(&self, page: &str) -> bool {
        self.pages.contains(page)
    }

    /// Returns `true` if `now` falls inside the active window.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.starts_at.is_none_or(|s| now >= s) && self.ends_at.is_none_or(|e| now <= e)
    }
}

/// Record of one presentation of a notification to a session.
///
/// Created when the engine selects the notification; updated when the
/// visitor dismisses or clicks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRecord {
    /// Presented notification.
    pub notification_id: NotificationId,
    /// Session it was presented to.
    pub session_id: SessionId,
    /// Presentation time.
    pub viewed_at: DateTime<Utc>,
    /// Whether the visitor dismissed it.
    pub dismissed: bool,
    /// Whether the visitor clicked it.
    pub clicked: bool,
}

/// Selects at most one notification to present.
///
/// `candidates` must already be filtered to the current page and active
/// window. `history` holds the session's view records plus, for
/// once-frequency candidates, records from any session. Candidates are
/// ordered by descending priority (stable, so ties keep catalog order)
/// and the first eligible one wins.
///
/// Eligibility per candidate:
/// - no record at all: eligible;
/// - `always`: eligible;
/// - `daily`: eligible iff 24 hours have passed since the latest
///   same-session view (or there is none);
/// - `session`: ineligible if any same-session record exists;
/// - `once`: ineligible if any record exists, regardless of session.
#[must_use]
pub fn select_notification<'a>(
    candidates: &'a [NotificationDefinition],
    history: &[ViewRecord],
    session: SessionId,
    now: DateTime<Utc>,
) -> Option<&'a NotificationDefinition> {
    let mut ordered: Vec<&NotificationDefinition> = candidates.iter().collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
    ordered
        .into_iter()
        .find(|c| is_eligible(c, history, session, now))
}

fn is_eligible(
    candidate: &NotificationDefinition,
    history: &[ViewRecord],
    session: SessionId,
    now: DateTime<Utc>,
) -> bool {
    let mut any_record = false;
    let mut same_session = false;
    let mut latest_session_view: Option<DateTime<Utc>> = None;

    for record in history
        .iter()
        .filter(|r| r.notification_id == candidate.id)
    {
        any_record = true;
        if record.session_id == session {
            same_session = true;
            let newer = latest_session_view.is_none_or(|t| record.viewed_at > t);
            if newer {
                latest_session_view = Some(record.viewed_at);
            }
        }
    }

    if !any_record {
        return true;
    }

    match candidate.frequency {
        DisplayFrequency::Always => true,
        DisplayFrequency::Daily => {
            latest_session_view.is_none_or(|t| now - t >= Duration::hours(24))
        }
        DisplayFrequency::Session => !same_session,
        DisplayFrequency::Once => false,
    }
}
