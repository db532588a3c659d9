//! Startup fixture loading for the in-memory stores.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::auth::{LocalIdentityService, UserProfile};

use super::{Animal, ContactPreferences, MemoryAnimalStore, MemoryContactPreferencesStore};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Animal {animal_id} references unknown owner {owner_id}")]
    UnknownOwner { animal_id: String, owner_id: String },

    #[error("Animal {animal_id} has lost_mode={lost_mode} with inconsistent lost_since")]
    InconsistentLostStatus { animal_id: String, lost_mode: bool },
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub animals: Vec<Animal>,
    #[serde(default)]
    pub contact_preferences: Vec<ContactPreferences>,
}

/// Counts of records loaded from a seed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub animals: usize,
    pub contact_preferences: usize,
}

impl SeedData {
    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        let data: SeedData = serde_json::from_str(raw)?;
        data.validate()?;
        Ok(data)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    fn validate(&self) -> Result<(), SeedError> {
        for animal in &self.animals {
            if !self.users.iter().any(|u| u.id == animal.owner_id) {
                return Err(SeedError::UnknownOwner {
                    animal_id: animal.id.clone(),
                    owner_id: animal.owner_id.clone(),
                });
            }
            // lost_since is present exactly while lost
            if animal.lost_mode != animal.lost_since.is_some() {
                return Err(SeedError::InconsistentLostStatus {
                    animal_id: animal.id.clone(),
                    lost_mode: animal.lost_mode,
                });
            }
        }
        Ok(())
    }

    pub fn apply(
        self,
        identity: &LocalIdentityService,
        animals: &MemoryAnimalStore,
        preferences: &MemoryContactPreferencesStore,
    ) -> SeedSummary {
        let summary = SeedSummary {
            users: self.users.len(),
            animals: self.animals.len(),
            contact_preferences: self.contact_preferences.len(),
        };

        self.users.into_iter().for_each(|u| identity.insert_user(u));
        self.animals.into_iter().for_each(|a| animals.insert(a));
        self.contact_preferences
            .into_iter()
            .for_each(|p| preferences.insert(p));

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::AnimalStore;
    use crate::auth::IdentityService;
    use crate::config::{JwtConfig, SessionConfig};

    const SEED: &str = r#"{
        "users": [{"id": "u1", "email": "dana@example.com", "display_name": "Dana"}],
        "animals": [{"id": "a1", "name": "Biscuit", "owner_id": "u1"}],
        "contact_preferences": [{"animal_id": "a1", "show_email": true, "email": "dana@example.com"}]
    }"#;

    #[tokio::test]
    async fn test_seed_applies_to_stores() {
        let jwt = JwtConfig {
            secret: "s".to_string(),
            issuer: None,
            audience: None,
        };
        let identity = LocalIdentityService::new(&jwt, &SessionConfig::default());
        let animals = MemoryAnimalStore::new();
        let preferences = MemoryContactPreferencesStore::new();

        let summary = SeedData::from_json(SEED)
            .unwrap()
            .apply(&identity, &animals, &preferences);

        assert_eq!(summary.animals, 1);
        let animal = animals.get_animal_by_id("a1").await.unwrap();
        assert!(!animal.lost_mode);
        assert!(identity.lookup_user_by_id("u1").await.is_some());
    }

    #[test]
    fn test_unknown_owner_rejected() {
        let raw = r#"{"animals": [{"id": "a1", "name": "Biscuit", "owner_id": "ghost"}]}"#;
        assert!(matches!(
            SeedData::from_json(raw),
            Err(SeedError::UnknownOwner { .. })
        ));
    }

    #[test]
    fn test_lost_without_clock_rejected() {
        let raw = r#"{
            "users": [{"id": "u1", "email": "dana@example.com", "display_name": "Dana"}],
            "animals": [{"id": "a1", "name": "Biscuit", "owner_id": "u1", "lost_mode": true}]
        }"#;
        assert!(matches!(
            SeedData::from_json(raw),
            Err(SeedError::InconsistentLostStatus { lost_mode: true, .. })
        ));
    }

    #[test]
    fn test_clock_without_lost_rejected() {
        let raw = r#"{
            "users": [{"id": "u1", "email": "dana@example.com", "display_name": "Dana"}],
            "animals": [{
                "id": "a1", "name": "Biscuit", "owner_id": "u1",
                "lost_since": "2026-03-01T08:00:00Z"
            }]
        }"#;
        assert!(matches!(
            SeedData::from_json(raw),
            Err(SeedError::InconsistentLostStatus { lost_mode: false, .. })
        ));
    }
}
