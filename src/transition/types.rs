use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::animal::Animal;
use crate::notification::NotifyResultBag;

/// Requested lost/found status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionTarget {
    Lost,
    Found,
}

impl TransitionTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionTarget::Lost => "lost",
            TransitionTarget::Found => "found",
        }
    }
}

impl fmt::Display for TransitionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied details for a transition
#[derive(Debug, Clone, Default)]
pub struct TransitionContext {
    /// Resolved caller identity; required to mark an animal found
    pub caller: Option<String>,
    /// Replaces the lost message when marking lost
    pub lost_message: Option<String>,
    /// Replaces the last seen location when marking lost
    pub last_seen_location: Option<String>,
}

impl TransitionContext {
    pub fn as_caller(caller: impl Into<String>) -> Self {
        Self {
            caller: Some(caller.into()),
            ..Self::default()
        }
    }
}

/// Result of an applied transition
#[derive(Debug)]
pub struct TransitionOutcome {
    /// Animal as persisted after the transition
    pub animal: Animal,
    pub previous_lost: bool,
    pub new_lost: bool,
    pub changed: bool,
    /// Detached notification task, present only when `changed`
    pub notification: Option<JoinHandle<Option<NotifyResultBag>>>,
}

impl TransitionOutcome {
    pub fn notification_scheduled(&self) -> bool {
        self.notification.is_some()
    }
}
