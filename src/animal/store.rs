//! Persistence contracts consumed by the transition handler and dispatcher.
//!
//! Profile and animal CRUD lives in a separate service; this crate only
//! reads animals and contact preferences and writes the lost-status fields.

use async_trait::async_trait;
use thiserror::Error;

use super::{Animal, AnimalUpdate, AppliedUpdate, ContactPreferences};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced animal does not exist
    #[error("Animal not found: {0}")]
    NotFound(String),

    /// Underlying storage failed
    #[error("Store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait AnimalStore: Send + Sync {
    async fn get_animal_by_id(&self, id: &str) -> Result<Animal, StoreError>;

    /// Apply a partial update atomically with respect to other updates of
    /// the same animal, returning the stored result and the prior status
    async fn update_animal(
        &self,
        id: &str,
        update: AnimalUpdate,
    ) -> Result<AppliedUpdate, StoreError>;
}

#[async_trait]
pub trait ContactPreferencesStore: Send + Sync {
    /// `Ok(None)` when the owner never saved preferences for this animal
    async fn get_by_animal_id(
        &self,
        animal_id: &str,
    ) -> Result<Option<ContactPreferences>, StoreError>;
}
