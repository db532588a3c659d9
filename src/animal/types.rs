use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered animal and its lost-status fields.
///
/// `lost_since` is set exactly while the animal is in lost mode and is only
/// written by the status transition handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    #[serde(default)]
    pub lost_mode: bool,
    #[serde(default)]
    pub lost_since: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lost_message: Option<String>,
}

impl Animal {
    pub fn new(id: impl Into<String>, name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner_id: owner_id.into(),
            lost_mode: false,
            lost_since: None,
            last_seen_location: None,
            lost_message: None,
        }
    }
}

/// Per-animal visibility settings for the owner's contact channels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPreferences {
    pub animal_id: String,
    #[serde(default)]
    pub show_email: bool,
    #[serde(default)]
    pub show_phone: bool,
    #[serde(default)]
    pub show_sms: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ContactPreferences {
    /// Email address if the owner made it visible and it is non-empty
    pub fn visible_email(&self) -> Option<&str> {
        if self.show_email {
            non_empty(self.email.as_deref())
        } else {
            None
        }
    }

    /// Phone number usable for SMS if the owner opted in
    pub fn sms_number(&self) -> Option<&str> {
        if self.show_sms {
            non_empty(self.phone.as_deref())
        } else {
            None
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Requested lost-status change, applied against the stored record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LostStatus {
    /// Enter lost mode; `since` is only stamped if the animal was not lost
    Lost { since: DateTime<Utc> },
    /// Leave lost mode; nothing is written if the animal was not lost
    Found,
}

/// Partial update of an animal's lost-status fields.
///
/// For `lost_message` and `last_seen_location` the outer `Option` means
/// "leave unchanged" and the inner one clears the field.
#[derive(Debug, Clone, Default)]
pub struct AnimalUpdate {
    pub status: Option<LostStatus>,
    pub lost_message: Option<Option<String>>,
    pub last_seen_location: Option<Option<String>>,
}

impl AnimalUpdate {
    /// Apply to `animal` and return its `lost_mode` before the update.
    ///
    /// Stores call this while holding the record's write lock, so the
    /// lost/not-lost decision and the write cannot interleave with another
    /// update.
    pub fn apply_to(&self, animal: &mut Animal) -> bool {
        let previous_lost = animal.lost_mode;

        match self.status {
            Some(LostStatus::Lost { since }) => {
                if !previous_lost {
                    animal.lost_mode = true;
                    animal.lost_since = Some(since);
                }
            }
            Some(LostStatus::Found) => {
                if !previous_lost {
                    return previous_lost;
                }
                animal.lost_mode = false;
                animal.lost_since = None;
                animal.lost_message = None;
            }
            None => {}
        }

        if let Some(ref message) = self.lost_message {
            animal.lost_message = message.clone();
        }
        if let Some(ref location) = self.last_seen_location {
            animal.last_seen_location = location.clone();
        }
        previous_lost
    }
}

/// An update as persisted, with the status it replaced
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedUpdate {
    pub previous_lost: bool,
    pub animal: Animal,
}

impl AppliedUpdate {
    pub fn changed(&self) -> bool {
        self.previous_lost != self.animal.lost_mode
    }
}
