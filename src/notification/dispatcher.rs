use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::animal::{Animal, AnimalStore, ContactPreferences, ContactPreferencesStore};
use crate::auth::{IdentityService, UserProfile};
use crate::config::NotificationConfig;
use crate::metrics::NotifyMetrics;

use super::channels::{ChannelError, DeliveryChannel};
use super::mask::MaskedContact;
use super::template::{self, CommonContext, RecipientPayload, RenderedMessage, Scenario};
use super::{
    ChannelKind, NotificationEvent, NotificationKind, NotifyOutcome, NotifyResultBag,
    RecipientRole, SkipReason,
};

/// Statistics for the notification dispatcher.
///
/// Relaxed counters shared by concurrent dispatches. They are only written
/// and read for `/stats`; no dispatch decision depends on them.
#[derive(Debug, Default)]
pub struct DispatcherStats {
    /// Events dispatched
    pub total_dispatched: AtomicU64,
    /// Channel sends that reached a provider successfully
    pub total_sent: AtomicU64,
    /// Channels skipped (hidden, no address, transport unconfigured)
    pub total_skipped: AtomicU64,
    /// Channel sends that failed or timed out
    pub total_failed: AtomicU64,
    /// Events whose recipients could not be resolved
    pub total_aborted: AtomicU64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            total_dispatched: self.total_dispatched.load(Ordering::Relaxed),
            total_sent: self.total_sent.load(Ordering::Relaxed),
            total_skipped: self.total_skipped.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
            total_aborted: self.total_aborted.load(Ordering::Relaxed),
        }
    }

    fn record(&self, bag: &NotifyResultBag) {
        self.total_dispatched.fetch_add(1, Ordering::Relaxed);
        if bag.error.is_some() {
            self.total_aborted.fetch_add(1, Ordering::Relaxed);
        }
        let failed = bag.failures().count() as u64;
        self.total_sent
            .fetch_add(bag.sent_count() as u64, Ordering::Relaxed);
        self.total_skipped
            .fetch_add(bag.skipped_count() as u64, Ordering::Relaxed);
        self.total_failed.fetch_add(failed, Ordering::Relaxed);
    }
}

/// Snapshot of dispatcher statistics
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherStatsSnapshot {
    pub total_dispatched: u64,
    pub total_sent: u64,
    pub total_skipped: u64,
    pub total_failed: u64,
    pub total_aborted: u64,
}

/// Email and SMS transports used for every recipient
#[derive(Clone)]
pub struct DeliveryChannels {
    pub email: Arc<dyn DeliveryChannel>,
    pub sms: Arc<dyn DeliveryChannel>,
}

impl DeliveryChannels {
    fn get(&self, kind: ChannelKind) -> Arc<dyn DeliveryChannel> {
        match kind {
            ChannelKind::Email => self.email.clone(),
            ChannelKind::Sms => self.sms.clone(),
        }
    }
}

/// Where one channel of one recipient goes
#[derive(Debug, Clone, PartialEq)]
enum Address {
    Deliver(String),
    Skip(SkipReason),
}

impl Address {
    fn from_inline(value: Option<&str>) -> Self {
        match value {
            Some(v) => Address::Deliver(v.to_string()),
            None => Address::Skip(SkipReason::NoAddress),
        }
    }

    fn from_gated(value: Option<String>) -> Self {
        match value {
            Some(v) => Address::Deliver(v),
            None => Address::Skip(SkipReason::NotVisible),
        }
    }
}

/// A resolved recipient with its rendered message
struct Recipient {
    role: RecipientRole,
    email: Address,
    sms: Address,
    message: Arc<RenderedMessage>,
}

/// Fans a status event out to the owner and any inline finder/reporter.
///
/// Holds no per-event state; collaborators are only read. The one shared
/// mutable piece is `stats`, which is write-only from a dispatch's view.
pub struct NotificationDispatcher {
    animals: Arc<dyn AnimalStore>,
    preferences: Arc<dyn ContactPreferencesStore>,
    identity: Arc<dyn IdentityService>,
    channels: DeliveryChannels,
    app_name: String,
    send_timeout: Duration,
    /// Observability counters only, never read back by `dispatch`
    stats: DispatcherStats,
}

impl NotificationDispatcher {
    pub fn new(
        animals: Arc<dyn AnimalStore>,
        preferences: Arc<dyn ContactPreferencesStore>,
        identity: Arc<dyn IdentityService>,
        channels: DeliveryChannels,
        config: &NotificationConfig,
    ) -> Self {
        Self {
            animals,
            preferences,
            identity,
            channels,
            app_name: config.app_name.clone(),
            send_timeout: Duration::from_secs(config.channel_timeout_secs),
            stats: DispatcherStats::default(),
        }
    }

    /// Override the per-send timeout
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Get dispatcher statistics
    pub fn stats(&self) -> DispatcherStatsSnapshot {
        self.stats.snapshot()
    }

    /// Deliver `event` to every eligible recipient and channel.
    ///
    /// Never fails: problems end up in the returned bag.
    #[tracing::instrument(
        name = "dispatcher.dispatch",
        skip(self, event),
        fields(event_id = %event.id, kind = %event.kind, animal_id = %event.animal_id)
    )]
    pub async fn dispatch(&self, event: NotificationEvent) -> NotifyResultBag {
        NotifyMetrics::record_dispatched(event.kind.as_str());

        let animal = match self.animals.get_animal_by_id(&event.animal_id).await {
            Ok(animal) => animal,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot resolve recipients, dropping notification");
                let bag = NotifyResultBag::aborted(&event, e.to_string());
                self.stats.record(&bag);
                return bag;
            }
        };

        let ctx = CommonContext::new(self.app_name.clone(), event.occurred_at);
        let recipients = self.resolve_recipients(&event, &animal, &ctx).await;

        let mut bag = NotifyResultBag::new(&event);
        let mut pending = FuturesUnordered::new();

        for recipient in recipients {
            for (kind, address) in [
                (ChannelKind::Email, recipient.email),
                (ChannelKind::Sms, recipient.sms),
            ] {
                match address {
                    Address::Deliver(to) => pending.push(deliver(
                        self.channels.get(kind),
                        recipient.role,
                        to,
                        recipient.message.clone(),
                        self.send_timeout,
                    )),
                    Address::Skip(reason) => {
                        tracing::debug!(
                            role = recipient.role.as_str(),
                            channel = %kind,
                            reason = ?reason,
                            "Channel skipped"
                        );
                        NotifyMetrics::record_send(kind.as_str(), "skipped");
                        bag.outcomes
                            .push(NotifyOutcome::skipped(recipient.role, kind, reason));
                    }
                }
            }
        }

        while let Some(outcome) = pending.next().await {
            bag.outcomes.push(outcome);
        }

        self.stats.record(&bag);
        tracing::debug!(
            sent = bag.sent_count(),
            skipped = bag.skipped_count(),
            failed = bag.failures().count(),
            "Notification dispatched"
        );

        bag
    }

    /// Run [`dispatch`](Self::dispatch) as a detached task.
    ///
    /// The returned handle resolves after a continuation has logged the
    /// result; callers are free to drop it.
    pub fn spawn_dispatch(
        self: &Arc<Self>,
        event: NotificationEvent,
    ) -> JoinHandle<Option<NotifyResultBag>> {
        let dispatcher = Arc::clone(self);
        let event_id = event.id;
        let kind = event.kind;
        let task = tokio::spawn(async move { dispatcher.dispatch(event).await });

        tokio::spawn(async move {
            match task.await {
                Ok(bag) => {
                    if bag.has_failures() {
                        for failure in bag.failures() {
                            tracing::warn!(
                                event_id = %event_id,
                                kind = %kind,
                                role = failure.recipient_role.as_str(),
                                channel = %failure.channel,
                                error = failure.error.as_deref().unwrap_or("unknown"),
                                "Notification delivery failed"
                            );
                        }
                        if let Some(ref error) = bag.error {
                            tracing::warn!(event_id = %event_id, kind = %kind, error = %error, "Notification aborted");
                        }
                    }
                    Some(bag)
                }
                Err(e) => {
                    NotifyMetrics::record_task_failure();
                    tracing::error!(
                        event_id = %event_id,
                        kind = %kind,
                        error = %e,
                        "Notification task did not complete"
                    );
                    None
                }
            }
        })
    }

    async fn resolve_recipients(
        &self,
        event: &NotificationEvent,
        animal: &Animal,
        ctx: &CommonContext,
    ) -> Vec<Recipient> {
        let mut recipients = Vec::with_capacity(2);

        // Inline finder/reporter: only when they left an email, no preference gating
        if let (Some(role), Some(actor)) = (event.kind.actor_role(), event.actor.as_ref()) {
            if actor.email().is_some() {
                let scenario = match event.kind {
                    NotificationKind::ThirdPartyReportedFound => Scenario::ReportedFoundToFinder,
                    _ => Scenario::ReportedLostToReporter,
                };
                let payload = RecipientPayload {
                    recipient_name: actor.name().map(str::to_string),
                    third_party: None,
                    location: event.location_hint.clone(),
                    message: event.message.clone(),
                };
                recipients.push(Recipient {
                    role,
                    email: Address::from_inline(actor.email()),
                    sms: Address::from_inline(actor.phone()),
                    message: Arc::new(self.render(scenario, animal, &payload, ctx)),
                });
            }
        }

        recipients.push(self.resolve_owner(event, animal, ctx).await);
        recipients
    }

    async fn resolve_owner(
        &self,
        event: &NotificationEvent,
        animal: &Animal,
        ctx: &CommonContext,
    ) -> Recipient {
        let preferences = match self.preferences.get_by_animal_id(&animal.id).await {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load contact preferences, owner channels gated off");
                None
            }
        };
        let profile = self.identity.lookup_user_by_id(&animal.owner_id).await;
        if profile.is_none() {
            tracing::debug!(owner_id = %animal.owner_id, "Owner profile not found");
        }

        let (email, sms) = owner_addresses(preferences.as_ref(), profile.as_ref());

        let scenario = match event.kind {
            NotificationKind::OwnerMarkedLost => Scenario::LostToOwner,
            NotificationKind::OwnerMarkedFound => Scenario::FoundToOwner,
            NotificationKind::ThirdPartyReportedFound => Scenario::ReportedFoundToOwner,
            NotificationKind::ThirdPartyReportedLost => Scenario::ReportedLostToOwner,
        };
        let payload = RecipientPayload {
            recipient_name: profile
                .map(|p| p.display_name)
                .filter(|name| !name.trim().is_empty()),
            third_party: event.actor.as_ref().map(MaskedContact::from_actor),
            location: event.location_hint.clone(),
            message: event.message.clone(),
        };

        Recipient {
            role: RecipientRole::Owner,
            email: Address::from_gated(email),
            sms: Address::from_gated(sms),
            message: Arc::new(self.render(scenario, animal, &payload, ctx)),
        }
    }

    fn render(
        &self,
        scenario: Scenario,
        animal: &Animal,
        payload: &RecipientPayload,
        ctx: &CommonContext,
    ) -> RenderedMessage {
        template::render(scenario, animal, payload, ctx).unwrap_or_else(|e| {
            tracing::warn!(scenario = ?scenario, error = %e, "Template render failed, using fallback");
            RenderedMessage::fallback(&self.app_name)
        })
    }
}

/// Owner email and SMS destinations after preference gating.
///
/// Email: the preferences address when visible, else the identity-service
/// address, but only while `show_email` is set. SMS needs `show_sms` and a
/// phone. Without a preferences row every owner channel is off.
fn owner_addresses(
    preferences: Option<&ContactPreferences>,
    profile: Option<&UserProfile>,
) -> (Option<String>, Option<String>) {
    let Some(prefs) = preferences else {
        return (None, None);
    };

    let email = if prefs.show_email {
        prefs
            .visible_email()
            .map(str::to_string)
            .or_else(|| {
                profile
                    .map(|p| p.email.trim().to_string())
                    .filter(|e| !e.is_empty())
            })
    } else {
        None
    };
    let sms = prefs.sms_number().map(str::to_string);

    (email, sms)
}

async fn deliver(
    channel: Arc<dyn DeliveryChannel>,
    role: RecipientRole,
    to: String,
    message: Arc<RenderedMessage>,
    timeout: Duration,
) -> NotifyOutcome {
    let kind = channel.kind();
    let started = Instant::now();

    // Own task so a panicking transport cannot take down sibling sends
    let send = tokio::spawn(async move {
        tokio::time::timeout(timeout, channel.send(&to, &message)).await
    });

    let outcome = match send.await {
        Ok(Ok(Ok(()))) => {
            NotifyMetrics::record_send(kind.as_str(), "sent");
            NotifyOutcome::sent(role, kind)
        }
        Ok(Ok(Err(ChannelError::NotConfigured))) => {
            tracing::info!(role = role.as_str(), channel = %kind, "Channel not configured, skipping");
            NotifyMetrics::record_send(kind.as_str(), "skipped");
            NotifyOutcome::skipped(role, kind, SkipReason::NotConfigured)
        }
        Ok(Ok(Err(e))) => failed(role, kind, e.to_string()),
        Ok(Err(_elapsed)) => failed(role, kind, ChannelError::Timeout(timeout).to_string()),
        Err(join_err) => failed(role, kind, format!("Transport task failed: {}", join_err)),
    };

    NotifyMetrics::record_latency(kind.as_str(), started.elapsed());
    outcome
}

fn failed(role: RecipientRole, kind: ChannelKind, error: String) -> NotifyOutcome {
    tracing::warn!(role = role.as_str(), channel = %kind, error = %error, "Channel send failed");
    NotifyMetrics::record_send(kind.as_str(), "failed");
    NotifyOutcome::failed(role, kind, error)
}
