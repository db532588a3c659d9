//! Notification events, templates, contact masking, delivery channels and
//! the dispatcher that fans status changes out to stakeholders.
//!
//! # Recipients
//!
//! - Owner: every event kind; channels gated by the animal's
//!   `ContactPreferences`.
//! - Finder / reporter: third-party reports only, when an email was supplied
//!   inline. Their contact is shown to the owner masked.

mod channels;
mod dispatcher;
mod mask;
mod template;
mod types;

pub use channels::{ChannelError, DeliveryChannel, HttpEmailTransport, HttpSmsTransport};
pub use dispatcher::{
    DeliveryChannels, DispatcherStats, DispatcherStatsSnapshot, NotificationDispatcher,
};
pub use mask::{mask_contact, MaskedContact};
pub use template::{
    found_to_owner, lost_to_owner, render, reported_found_to_finder, reported_found_to_owner,
    reported_lost_to_owner, reported_lost_to_reporter, CommonContext, RecipientPayload,
    RenderError, RenderedMessage, Scenario,
};
pub use types::{
    ActorContact, ChannelKind, NotificationEvent, NotificationKind, NotifyOutcome,
    NotifyResultBag, RecipientRole, SkipReason,
};
