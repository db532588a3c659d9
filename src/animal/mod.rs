//! Animals, their owners' contact preferences, and the stores holding them.

mod memory;
mod seed;
mod store;
mod types;

pub use memory::{MemoryAnimalStore, MemoryContactPreferencesStore};
pub use seed::{SeedData, SeedError, SeedSummary};
pub use store::{AnimalStore, ContactPreferencesStore, StoreError};
pub use types::{Animal, AnimalUpdate, AppliedUpdate, ContactPreferences, LostStatus};
