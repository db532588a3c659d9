use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to an animal's lost/found status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The owner flagged the animal as missing
    OwnerMarkedLost,
    /// The owner cleared the lost flag
    OwnerMarkedFound,
    /// Someone reported finding the animal
    ThirdPartyReportedFound,
    /// Someone reported the animal lost on the owner's behalf
    ThirdPartyReportedLost,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::OwnerMarkedLost => "owner_marked_lost",
            NotificationKind::OwnerMarkedFound => "owner_marked_found",
            NotificationKind::ThirdPartyReportedFound => "third_party_reported_found",
            NotificationKind::ThirdPartyReportedLost => "third_party_reported_lost",
        }
    }

    /// Role of the inline actor attached to events of this kind, if any
    pub fn actor_role(&self) -> Option<RecipientRole> {
        match self {
            NotificationKind::ThirdPartyReportedFound => Some(RecipientRole::Finder),
            NotificationKind::ThirdPartyReportedLost => Some(RecipientRole::Reporter),
            _ => None,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact details supplied inline by a finder or reporter.
///
/// Never persisted; lives only as long as the request's notifications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ActorContact {
    pub fn email(&self) -> Option<&str> {
        non_empty(self.email.as_deref())
    }

    pub fn phone(&self) -> Option<&str> {
        non_empty(self.phone.as_deref())
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(self.name.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A status change to fan out to stakeholders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub animal_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<ActorContact>,
    pub occurred_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NotificationEvent {
    pub fn new(kind: NotificationKind, animal_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            animal_id: animal_id.into(),
            actor: None,
            occurred_at: Utc::now(),
            location_hint: None,
            message: None,
        }
    }

    pub fn owner_marked_lost(animal_id: impl Into<String>) -> Self {
        Self::new(NotificationKind::OwnerMarkedLost, animal_id)
    }

    pub fn owner_marked_found(animal_id: impl Into<String>) -> Self {
        Self::new(NotificationKind::OwnerMarkedFound, animal_id)
    }

    pub fn reported_found(animal_id: impl Into<String>, finder: ActorContact) -> Self {
        Self::new(NotificationKind::ThirdPartyReportedFound, animal_id).actor(finder)
    }

    pub fn reported_lost(animal_id: impl Into<String>, reporter: ActorContact) -> Self {
        Self::new(NotificationKind::ThirdPartyReportedLost, animal_id).actor(reporter)
    }

    pub fn actor(mut self, actor: ActorContact) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn location_hint(mut self, location: Option<String>) -> Self {
        self.location_hint = location;
        self
    }

    pub fn message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }
}

/// Who a notification is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientRole {
    Owner,
    Finder,
    Reporter,
}

impl RecipientRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientRole::Owner => "owner",
            RecipientRole::Finder => "finder",
            RecipientRole::Reporter => "reporter",
        }
    }
}

/// Delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Email,
    Sms,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Email => "email",
            ChannelKind::Sms => "sms",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a channel was skipped without being attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Transport has no provider credentials
    NotConfigured,
    /// Owner preferences hide this channel, or no preferences exist
    NotVisible,
    /// Recipient supplied no address for this channel
    NoAddress,
}

/// Result of one channel for one recipient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotifyOutcome {
    pub recipient_role: RecipientRole,
    pub channel: ChannelKind,
    /// Skipped channels count as ok
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}

impl NotifyOutcome {
    pub fn sent(recipient_role: RecipientRole, channel: ChannelKind) -> Self {
        Self {
            recipient_role,
            channel,
            ok: true,
            error: None,
            skipped: None,
        }
    }

    pub fn skipped(recipient_role: RecipientRole, channel: ChannelKind, reason: SkipReason) -> Self {
        Self {
            recipient_role,
            channel,
            ok: true,
            error: None,
            skipped: Some(reason),
        }
    }

    pub fn failed(
        recipient_role: RecipientRole,
        channel: ChannelKind,
        error: impl Into<String>,
    ) -> Self {
        Self {
            recipient_role,
            channel,
            ok: false,
            error: Some(error.into()),
            skipped: None,
        }
    }

    pub fn was_sent(&self) -> bool {
        self.ok && self.skipped.is_none()
    }
}

/// Every outcome of a single dispatch, returned instead of raised
#[derive(Debug, Clone, Serialize)]
pub struct NotifyResultBag {
    pub event_id: Uuid,
    pub kind: NotificationKind,
    pub animal_id: String,
    pub outcomes: Vec<NotifyOutcome>,
    /// Set when the dispatch could not resolve its recipients at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotifyResultBag {
    pub fn new(event: &NotificationEvent) -> Self {
        Self {
            event_id: event.id,
            kind: event.kind,
            animal_id: event.animal_id.clone(),
            outcomes: Vec::new(),
            error: None,
        }
    }

    pub fn aborted(event: &NotificationEvent, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(event)
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &NotifyOutcome> {
        self.outcomes.iter().filter(|o| !o.ok)
    }

    pub fn has_failures(&self) -> bool {
        self.error.is_some() || self.outcomes.iter().any(|o| !o.ok)
    }

    pub fn sent_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.was_sent()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.skipped.is_some()).count()
    }

    pub fn outcome(&self, role: RecipientRole, channel: ChannelKind) -> Option<&NotifyOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.recipient_role == role && o.channel == channel)
    }
}
