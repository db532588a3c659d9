//! Request and response models for the animal status API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::animal::Animal;
use crate::error::{AppError, Result};
use crate::notification::{ActorContact, NotificationKind};
use crate::transition::{TransitionOutcome, TransitionTarget};

/// `POST /api/v1/animals/{id}/status`
#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    /// `"lost"` or `"found"`
    pub status: TransitionTarget,
    /// Note shown to finders while lost
    pub message: Option<String>,
    pub last_seen_location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub animal: Animal,
    pub previous_lost: bool,
    pub new_lost: bool,
    pub changed: bool,
    /// Whether a notification was handed off for delivery
    pub notification_scheduled: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<TransitionOutcome> for StatusChangeResponse {
    fn from(outcome: TransitionOutcome) -> Self {
        let notification_scheduled = outcome.notification_scheduled();
        Self {
            animal: outcome.animal,
            previous_lost: outcome.previous_lost,
            new_lost: outcome.new_lost,
            changed: outcome.changed,
            notification_scheduled,
            timestamp: Utc::now(),
        }
    }
}

/// `POST /api/v1/animals/{id}/report-found`
#[derive(Debug, Default, Deserialize)]
pub struct ReportFoundRequest {
    pub finder_name: Option<String>,
    pub finder_email: Option<String>,
    pub finder_phone: Option<String>,
    /// Where the animal was found
    pub location: Option<String>,
    pub message: Option<String>,
}

/// `POST /api/v1/animals/{id}/report-lost`
#[derive(Debug, Default, Deserialize)]
pub struct ReportLostRequest {
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    /// Where the animal was last seen
    pub location: Option<String>,
    pub message: Option<String>,
}

/// Validated third-party report ready for dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct ThirdPartyReport {
    pub actor: ActorContact,
    pub location: Option<String>,
    pub message: Option<String>,
}

impl ReportFoundRequest {
    pub fn validate(self, max_len: usize) -> Result<ThirdPartyReport> {
        validate_report(
            self.finder_name,
            self.finder_email,
            self.finder_phone,
            self.location,
            self.message,
            max_len,
        )
    }
}

impl ReportLostRequest {
    pub fn validate(self, max_len: usize) -> Result<ThirdPartyReport> {
        validate_report(
            self.reporter_name,
            self.reporter_email,
            self.reporter_phone,
            self.location,
            self.message,
            max_len,
        )
    }
}

/// Response for accepted third-party reports
#[derive(Debug, Serialize)]
pub struct ReportAcceptedResponse {
    pub accepted: bool,
    pub event_id: Uuid,
    pub kind: NotificationKind,
    pub timestamp: DateTime<Utc>,
}

fn validate_report(
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    location: Option<String>,
    message: Option<String>,
    max_len: usize,
) -> Result<ThirdPartyReport> {
    let email = bounded_text("email", email, max_len)?;
    if let Some(ref address) = email {
        validate_email(address)?;
    }
    let phone = bounded_text("phone", phone, max_len)?;
    if let Some(ref number) = phone {
        validate_phone(number)?;
    }

    Ok(ThirdPartyReport {
        actor: ActorContact {
            name: bounded_text("name", name, max_len)?,
            email,
            phone,
        },
        location: bounded_text("location", location, max_len)?,
        message: bounded_text("message", message, max_len)?,
    })
}

/// Trim a free-text field; blank becomes `None`, overlong is rejected
pub fn bounded_text(field: &str, value: Option<String>, max_len: usize) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(Some(trimmed.to_string()))
}

fn validate_email(address: &str) -> Result<()> {
    let valid = match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !address.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Invalid email address: {}", address)))
    }
}

fn validate_phone(number: &str) -> Result<()> {
    let allowed = number
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
    let digits = number.chars().filter(char::is_ascii_digit).count();

    if allowed && (7..=15).contains(&digits) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Invalid phone number: {}", number)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_request_accepts_only_lost_or_found() {
        let req: StatusChangeRequest = serde_json::from_str(r#"{"status": "lost"}"#).unwrap();
        assert_eq!(req.status, TransitionTarget::Lost);

        let req: StatusChangeRequest = serde_json::from_str(r#"{"status": "found"}"#).unwrap();
        assert_eq!(req.status, TransitionTarget::Found);

        assert!(serde_json::from_str::<StatusChangeRequest>(r#"{"status": "missing"}"#).is_err());
    }

    #[test]
    fn test_bounded_text() {
        assert_eq!(bounded_text("message", None, 10).unwrap(), None);
        assert_eq!(bounded_text("message", Some("   ".into()), 10).unwrap(), None);
        assert_eq!(
            bounded_text("message", Some("  hi ".into()), 10).unwrap().as_deref(),
            Some("hi")
        );
        assert!(matches!(
            bounded_text("message", Some("x".repeat(301)), 300),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_report_validation() {
        let report = ReportFoundRequest {
            finder_name: Some("Sam".into()),
            finder_email: Some(" f@x.com ".into()),
            finder_phone: Some("+1 (555) 010-9876".into()),
            location: Some("Elm Park".into()),
            message: None,
        }
        .validate(300)
        .unwrap();

        assert_eq!(report.actor.email.as_deref(), Some("f@x.com"));
        assert_eq!(report.location.as_deref(), Some("Elm Park"));

        let bad_email = ReportLostRequest {
            reporter_email: Some("not-an-email".into()),
            ..ReportLostRequest::default()
        };
        assert!(bad_email.validate(300).is_err());

        let bad_phone = ReportLostRequest {
            reporter_phone: Some("call me".into()),
            ..ReportLostRequest::default()
        };
        assert!(bad_phone.validate(300).is_err());
    }
}
