pub mod memory;

use uuid::Uuid;

use crate::database::Database;
use crate::error::StoreError;
use crate::filters::{EventFilter, PlaceFilter};
use crate::models::{Event, Place, SubmissionStatus};

pub use memory::MemoryStore;

/// Catalog backend selected at startup: Postgres, or the seeded
/// in-memory catalog when mock mode is on.
#[derive(Clone)]
pub enum CatalogStore {
    Postgres(Database),
    Memory(MemoryStore),
}

impl CatalogStore {
    pub fn backend_name(&self) -> &'static str {
        match self {
            CatalogStore::Postgres(_) => "postgres",
            CatalogStore::Memory(_) => "memory",
        }
    }

    // ========================================================================
    // PLACES
    // ========================================================================

    pub async fn list_places(&self, filter: &PlaceFilter) -> Result<Vec<Place>, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.list_places(filter).await,
            CatalogStore::Memory(mem) => Ok(mem.list_places(filter).await),
        }
    }

    pub async fn get_place(&self, id: Uuid) -> Result<Option<Place>, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.get_place(id).await,
            CatalogStore::Memory(mem) => Ok(mem.get_place(id).await),
        }
    }

    pub async fn insert_place(&self, place: Place) -> Result<Place, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.insert_place(place).await,
            CatalogStore::Memory(mem) => Ok(mem.insert_place(place).await),
        }
    }

    pub async fn update_pending_place(&self, place: Place) -> Result<Place, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.update_pending_place(place).await,
            CatalogStore::Memory(mem) => mem.update_pending_place(place).await,
        }
    }

    pub async fn delete_pending_place(&self, id: Uuid) -> Result<(), StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.delete_pending_place(id).await,
            CatalogStore::Memory(mem) => mem.delete_pending_place(id).await,
        }
    }

    pub async fn decide_place(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        reason: Option<String>,
    ) -> Result<Place, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.decide_place(id, status, reason).await,
            CatalogStore::Memory(mem) => mem.decide_place(id, status, reason).await,
        }
    }

    pub async fn places_with_status(
        &self,
        status: SubmissionStatus,
    ) -> Result<Vec<Place>, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.places_with_status(status).await,
            CatalogStore::Memory(mem) => Ok(mem.places_with_status(status).await),
        }
    }

    pub async fn places_for_merchant(&self, merchant_id: Uuid) -> Result<Vec<Place>, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.places_for_merchant(merchant_id).await,
            CatalogStore::Memory(mem) => Ok(mem.places_for_merchant(merchant_id).await),
        }
    }

    pub async fn all_places(&self) -> Result<Vec<Place>, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.all_places().await,
            CatalogStore::Memory(mem) => Ok(mem.all_places().await),
        }
    }

    pub async fn approved_places_page(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Place>, i64), StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.approved_places_page(limit, offset).await,
            CatalogStore::Memory(mem) => Ok(mem.approved_places_page(limit, offset).await),
        }
    }

    // ========================================================================
    // EVENTS
    // ========================================================================

    pub async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.list_events(filter).await,
            CatalogStore::Memory(mem) => Ok(mem.list_events(filter).await),
        }
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.get_event(id).await,
            CatalogStore::Memory(mem) => Ok(mem.get_event(id).await),
        }
    }

    pub async fn insert_event(&self, event: Event) -> Result<Event, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.insert_event(event).await,
            CatalogStore::Memory(mem) => Ok(mem.insert_event(event).await),
        }
    }

    pub async fn update_pending_event(&self, event: Event) -> Result<Event, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.update_pending_event(event).await,
            CatalogStore::Memory(mem) => mem.update_pending_event(event).await,
        }
    }

    pub async fn delete_pending_event(&self, id: Uuid) -> Result<(), StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.delete_pending_event(id).await,
            CatalogStore::Memory(mem) => mem.delete_pending_event(id).await,
        }
    }

    pub async fn decide_event(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        reason: Option<String>,
    ) -> Result<Event, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.decide_event(id, status, reason).await,
            CatalogStore::Memory(mem) => mem.decide_event(id, status, reason).await,
        }
    }

    pub async fn events_with_status(
        &self,
        status: SubmissionStatus,
    ) -> Result<Vec<Event>, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.events_with_status(status).await,
            CatalogStore::Memory(mem) => Ok(mem.events_with_status(status).await),
        }
    }

    pub async fn events_for_merchant(&self, merchant_id: Uuid) -> Result<Vec<Event>, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.events_for_merchant(merchant_id).await,
            CatalogStore::Memory(mem) => Ok(mem.events_for_merchant(merchant_id).await),
        }
    }

    pub async fn all_events(&self) -> Result<Vec<Event>, StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.all_events().await,
            CatalogStore::Memory(mem) => Ok(mem.all_events().await),
        }
    }

    pub async fn approved_events_page(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Event>, i64), StoreError> {
        match self {
            CatalogStore::Postgres(db) => db.approved_events_page(limit, offset).await,
            CatalogStore::Memory(mem) => Ok(mem.approved_events_page(limit, offset).await),
        }
    }
}
