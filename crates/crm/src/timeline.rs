//! Lead timeline events and the KPIs derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of lifecycle event. Serialized kebab-case; the dotted spelling
/// (`ad.impression`, `lp.view`, ...) is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    #[serde(alias = "ad.impression")]
    AdImpression,
    #[serde(alias = "ad.click")]
    AdClick,
    #[serde(alias = "lp.view")]
    LandingPageView,
    #[serde(alias = "thread.message")]
    ThreadMessage,
    #[serde(alias = "task.created")]
    TaskCreated,
    #[serde(alias = "proposal.sent")]
    ProposalSent,
    #[serde(alias = "proposal.accepted")]
    ProposalAccepted,
    #[serde(alias = "meeting.scheduled")]
    MeetingScheduled,
    #[serde(alias = "payment.intent")]
    PaymentIntent,
    #[serde(alias = "payment.confirmed")]
    PaymentConfirmed,
    #[serde(alias = "payment.failed")]
    PaymentFailed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdImpression => "ad-impression",
            Self::AdClick => "ad-click",
            Self::LandingPageView => "landing-page-view",
            Self::ThreadMessage => "thread-message",
            Self::TaskCreated => "task-created",
            Self::ProposalSent => "proposal-sent",
            Self::ProposalAccepted => "proposal-accepted",
            Self::MeetingScheduled => "meeting-scheduled",
            Self::PaymentIntent => "payment-intent",
            Self::PaymentConfirmed => "payment-confirmed",
            Self::PaymentFailed => "payment-failed",
        }
    }

    pub fn category(&self) -> EventCategory {
        match self {
            Self::AdImpression | Self::AdClick | Self::LandingPageView => EventCategory::Ads,
            Self::ThreadMessage => EventCategory::Chat,
            Self::TaskCreated
            | Self::ProposalSent
            | Self::ProposalAccepted
            | Self::MeetingScheduled => EventCategory::System,
            Self::PaymentIntent | Self::PaymentConfirmed | Self::PaymentFailed => {
                EventCategory::Payments
            }
        }
    }

    pub fn is_payment(&self) -> bool {
        self.category() == EventCategory::Payments
    }
}

/// Groups of event kinds that the timeline view toggles together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Ads,
    Chat,
    System,
    Payments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    #[serde(alias = "at")]
    pub timestamp: DateTime<Utc>,
    #[serde(alias = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// `"lead"` or `"agent:<name>"` for chat messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, alias = "meta", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl TimelineEvent {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>, kind: EventKind) -> Self {
        Self {
            id: id.into(),
            timestamp,
            kind,
            channel: None,
            author: None,
            body: None,
            metadata: None,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    fn is_message_from_lead(&self) -> bool {
        self.kind == EventKind::ThreadMessage && self.author.as_deref() == Some("lead")
    }

    fn is_message_from_agent(&self) -> bool {
        self.kind == EventKind::ThreadMessage
            && self
                .author
                .as_deref()
                .is_some_and(|a| a.starts_with("agent"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Confirmed,
    Pending,
    Failed,
    /// No payment event on the timeline.
    None,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::Pending => "Pending",
            Self::Failed => "Failed",
            Self::None => "—",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineKpis {
    /// Minutes from the lead's first message to the first agent reply.
    pub first_contact_minutes: Option<f64>,
    pub payment_status: PaymentStatus,
}

impl TimelineKpis {
    /// `"2.0 min"`, or `"—"` when there was no reply.
    pub fn first_contact_label(&self) -> String {
        match self.first_contact_minutes {
            Some(minutes) => format!("{minutes:.1} min"),
            None => "—".to_string(),
        }
    }
}

/// Derive the lead KPIs from a timeline.
///
/// Events are ordered by timestamp first (stable, so events sharing a
/// timestamp keep their input order); callers may pass them in any order.
pub fn compute_kpis(events: &[TimelineEvent]) -> TimelineKpis {
    let mut ordered: Vec<&TimelineEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.timestamp);

    let first_contact_minutes = ordered
        .iter()
        .position(|e| e.is_message_from_lead())
        .and_then(|idx| {
            let lead_msg = ordered[idx];
            ordered[idx + 1..]
                .iter()
                .find(|e| e.is_message_from_agent())
                .map(|reply| {
                    (reply.timestamp - lead_msg.timestamp).num_milliseconds() as f64 / 60_000.0
                })
        });

    let payment_status = ordered
        .iter()
        .rev()
        .find(|e| e.kind.is_payment())
        .map_or(PaymentStatus::None, |e| match e.kind {
            EventKind::PaymentConfirmed => PaymentStatus::Confirmed,
            EventKind::PaymentIntent => PaymentStatus::Pending,
            _ => PaymentStatus::Failed,
        });

    TimelineKpis {
        first_contact_minutes,
        payment_status,
    }
}

/// Which event categories the timeline shows. Everything is visible by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineFilter {
    pub ads: bool,
    pub chat: bool,
    pub system: bool,
    pub payments: bool,
}

impl Default for TimelineFilter {
    fn default() -> Self {
        Self {
            ads: true,
            chat: true,
            system: true,
            payments: true,
        }
    }
}

impl TimelineFilter {
    pub fn shows(&self, category: EventCategory) -> bool {
        match category {
            EventCategory::Ads => self.ads,
            EventCategory::Chat => self.chat,
            EventCategory::System => self.system,
            EventCategory::Payments => self.payments,
        }
    }

    pub fn toggle(&mut self, category: EventCategory) {
        let flag = match category {
            EventCategory::Ads => &mut self.ads,
            EventCategory::Chat => &mut self.chat,
            EventCategory::System => &mut self.system,
            EventCategory::Payments => &mut self.payments,
        };
        *flag = !*flag;
    }

    pub fn matches(&self, event: &TimelineEvent) -> bool {
        self.shows(event.kind.category())
    }

    /// Visible events, in input order.
    pub fn apply<'a>(&self, events: &'a [TimelineEvent]) -> Vec<&'a TimelineEvent> {
        events.iter().filter(|e| self.matches(e)).collect()
    }
}
