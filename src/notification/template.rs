//! Message templates, one explicit function per scenario.
//!
//! Rendering is pure: no I/O, and the same inputs always give the same
//! output. Owner-facing templates only ever receive a [`MaskedContact`].

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::animal::Animal;

use super::mask::MaskedContact;

/// Rendering error; the dispatcher replaces the message with a fallback
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Values shared by every template
#[derive(Debug, Clone)]
pub struct CommonContext {
    pub app_name: String,
    pub timestamp: DateTime<Utc>,
}

impl CommonContext {
    pub fn new(app_name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            app_name: app_name.into(),
            timestamp,
        }
    }

    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Per-recipient values
#[derive(Debug, Clone, Default)]
pub struct RecipientPayload {
    /// How to greet the recipient
    pub recipient_name: Option<String>,
    /// Masked contact of the opposite party (owner-facing scenarios)
    pub third_party: Option<MaskedContact>,
    pub location: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    pub subject: String,
    pub text: String,
}

/// Longest SMS body sent, in characters
const SMS_MAX_CHARS: usize = 640;

impl RenderedMessage {
    /// Generic message used when a template cannot be rendered
    pub fn fallback(app_name: &str) -> Self {
        Self {
            subject: format!("{}: status update", app_name),
            text: format!(
                "There is an update about an animal on {}. Sign in to see the details.",
                app_name
            ),
        }
    }

    /// Single-part body for SMS delivery
    pub fn sms_text(&self) -> String {
        let body = format!("{}: {}", self.subject, self.text);
        if body.chars().count() <= SMS_MAX_CHARS {
            body
        } else {
            let mut truncated: String = body.chars().take(SMS_MAX_CHARS - 3).collect();
            truncated.push_str("...");
            truncated
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    LostToOwner,
    FoundToOwner,
    ReportedFoundToFinder,
    ReportedFoundToOwner,
    ReportedLostToOwner,
    ReportedLostToReporter,
}

/// Render `scenario` after checking the inputs it needs
pub fn render(
    scenario: Scenario,
    animal: &Animal,
    payload: &RecipientPayload,
    ctx: &CommonContext,
) -> Result<RenderedMessage, RenderError> {
    if animal.name.trim().is_empty() {
        return Err(RenderError::MissingField("animal name"));
    }
    if ctx.app_name.trim().is_empty() {
        return Err(RenderError::MissingField("app name"));
    }

    Ok(match scenario {
        Scenario::LostToOwner => lost_to_owner(animal, payload, ctx),
        Scenario::FoundToOwner => found_to_owner(animal, payload, ctx),
        Scenario::ReportedFoundToFinder => reported_found_to_finder(animal, payload, ctx),
        Scenario::ReportedFoundToOwner => reported_found_to_owner(animal, payload, ctx),
        Scenario::ReportedLostToOwner => reported_lost_to_owner(animal, payload, ctx),
        Scenario::ReportedLostToReporter => reported_lost_to_reporter(animal, payload, ctx),
    })
}

pub fn lost_to_owner(
    animal: &Animal,
    payload: &RecipientPayload,
    ctx: &CommonContext,
) -> RenderedMessage {
    let mut text = greeting(payload);
    let _ = writeln!(
        text,
        "{} has been marked as lost on {} at {}.",
        animal.name,
        ctx.app_name,
        ctx.timestamp_iso()
    );
    if let Some(location) = &payload.location {
        let _ = writeln!(text, "Last seen: {}", location);
    }
    if let Some(message) = &payload.message {
        let _ = writeln!(text, "Your note: {}", message);
    }
    text.push_str(
        "\nAnyone who finds them can now report it, and we will pass their details on to you.\n",
    );
    push_signature(&mut text, ctx);

    RenderedMessage {
        subject: format!("{} is marked as lost", animal.name),
        text,
    }
}

pub fn found_to_owner(
    animal: &Animal,
    payload: &RecipientPayload,
    ctx: &CommonContext,
) -> RenderedMessage {
    let mut text = greeting(payload);
    let _ = writeln!(
        text,
        "Good news: {} is no longer marked as lost (updated {}).",
        animal.name,
        ctx.timestamp_iso()
    );
    text.push_str("Their lost notice and message have been removed.\n");
    push_signature(&mut text, ctx);

    RenderedMessage {
        subject: format!("{} is home", animal.name),
        text,
    }
}

pub fn reported_found_to_finder(
    animal: &Animal,
    payload: &RecipientPayload,
    ctx: &CommonContext,
) -> RenderedMessage {
    let mut text = greeting(payload);
    let _ = writeln!(
        text,
        "Thank you for reporting that you found {}. We have let the owner know.",
        animal.name
    );
    if let Some(location) = &payload.location {
        let _ = writeln!(text, "Location you reported: {}", location);
    }
    text.push_str("The owner may get in touch with you using the details you provided.\n");
    let _ = writeln!(text, "Reported at {}.", ctx.timestamp_iso());
    push_signature(&mut text, ctx);

    RenderedMessage {
        subject: format!("Thanks for helping {} get home", animal.name),
        text,
    }
}

pub fn reported_found_to_owner(
    animal: &Animal,
    payload: &RecipientPayload,
    ctx: &CommonContext,
) -> RenderedMessage {
    let mut text = greeting(payload);
    let _ = writeln!(
        text,
        "Someone reported finding {} at {}.",
        animal.name,
        ctx.timestamp_iso()
    );
    if let Some(location) = &payload.location {
        let _ = writeln!(text, "Where: {}", location);
    }
    if let Some(message) = &payload.message {
        let _ = writeln!(text, "Their message: {}", message);
    }
    push_third_party(&mut text, payload.third_party.as_ref(), "finder");
    push_signature(&mut text, ctx);

    RenderedMessage {
        subject: format!("{} may have been found", animal.name),
        text,
    }
}

pub fn reported_lost_to_owner(
    animal: &Animal,
    payload: &RecipientPayload,
    ctx: &CommonContext,
) -> RenderedMessage {
    let mut text = greeting(payload);
    let _ = writeln!(
        text,
        "Someone reported {} as lost at {}.",
        animal.name,
        ctx.timestamp_iso()
    );
    if let Some(location) = &payload.location {
        let _ = writeln!(text, "Last seen: {}", location);
    }
    if let Some(message) = &payload.message {
        let _ = writeln!(text, "Their message: {}", message);
    }
    push_third_party(&mut text, payload.third_party.as_ref(), "reporter");
    let _ = writeln!(
        text,
        "\nIf {} is missing, mark them as lost on {} so finders can reach you.",
        animal.name, ctx.app_name
    );
    push_signature(&mut text, ctx);

    RenderedMessage {
        subject: format!("{} was reported lost", animal.name),
        text,
    }
}

pub fn reported_lost_to_reporter(
    animal: &Animal,
    payload: &RecipientPayload,
    ctx: &CommonContext,
) -> RenderedMessage {
    let mut text = greeting(payload);
    let _ = writeln!(
        text,
        "Thank you for reporting {} as lost. The owner has been notified.",
        animal.name
    );
    if let Some(location) = &payload.location {
        let _ = writeln!(text, "Location you reported: {}", location);
    }
    let _ = writeln!(text, "Reported at {}.", ctx.timestamp_iso());
    push_signature(&mut text, ctx);

    RenderedMessage {
        subject: format!("We passed on your report about {}", animal.name),
        text,
    }
}

fn greeting(payload: &RecipientPayload) -> String {
    match payload.recipient_name.as_deref() {
        Some(name) => format!("Hi {},\n\n", name),
        None => "Hi there,\n\n".to_string(),
    }
}

fn push_third_party(text: &mut String, contact: Option<&MaskedContact>, role: &str) {
    let Some(contact) = contact.filter(|c| c.has_reachable_contact() || c.name().is_some()) else {
        let _ = writeln!(text, "The {} did not leave contact details.", role);
        return;
    };

    text.push('\n');
    let _ = writeln!(text, "About the {}:", role);
    if let Some(name) = contact.name() {
        let _ = writeln!(text, "  Name: {}", name);
    }
    if let Some(email) = contact.email() {
        let _ = writeln!(text, "  Email: {}", email);
    }
    if let Some(phone) = contact.phone() {
        let _ = writeln!(text, "  Phone: {}", phone);
    }
}

fn push_signature(text: &mut String, ctx: &CommonContext) {
    let _ = write!(text, "\nThe {} team", ctx.app_name);
}
