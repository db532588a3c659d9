//! In-memory stores using DashMap.
//!
//! Data is lost on restart; the service seeds them from a JSON file at
//! startup when `data.seed_path` is configured.

use async_trait::async_trait;
use dashmap::DashMap;

use super::store::{AnimalStore, ContactPreferencesStore, StoreError};
use super::{Animal, AnimalUpdate, AppliedUpdate, ContactPreferences};

#[derive(Debug, Default)]
pub struct MemoryAnimalStore {
    animals: DashMap<String, Animal>,
}

impl MemoryAnimalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, animal: Animal) {
        self.animals.insert(animal.id.clone(), animal);
    }
}

#[async_trait]
impl AnimalStore for MemoryAnimalStore {
    async fn get_animal_by_id(&self, id: &str) -> Result<Animal, StoreError> {
        self.animals
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update_animal(
        &self,
        id: &str,
        update: AnimalUpdate,
    ) -> Result<AppliedUpdate, StoreError> {
        // Shard write lock held across read and write
        let mut entry = self
            .animals
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let previous_lost = update.apply_to(entry.value_mut());
        Ok(AppliedUpdate {
            previous_lost,
            animal: entry.value().clone(),
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryContactPreferencesStore {
    preferences: DashMap<String, ContactPreferences>,
}

impl MemoryContactPreferencesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, preferences: ContactPreferences) {
        self.preferences
            .insert(preferences.animal_id.clone(), preferences);
    }
}

#[async_trait]
impl ContactPreferencesStore for MemoryContactPreferencesStore {
    async fn get_by_animal_id(
        &self,
        animal_id: &str,
    ) -> Result<Option<ContactPreferences>, StoreError> {
        Ok(self
            .preferences
            .get(animal_id)
            .map(|entry| entry.value().clone()))
    }
}
