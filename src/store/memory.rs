use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::filters::{sort_events, sort_places, EventFilter, PlaceFilter};
use crate::fixtures;
use crate::models::{Event, Place, SubmissionStatus};

/// Process-local catalog used in mock mode and in tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    places: Arc<RwLock<Vec<Place>>>,
    events: Arc<RwLock<Vec<Event>>>,
}

/// Record types the generic helpers below operate on.
trait Submission: Clone {
    fn id(&self) -> Uuid;
    fn status(&self) -> SubmissionStatus;
    fn merchant_id(&self) -> Option<Uuid>;
    fn created_at(&self) -> chrono::DateTime<Utc>;
    fn decide(&mut self, status: SubmissionStatus, reason: Option<String>);
}

impl Submission for Place {
    fn id(&self) -> Uuid {
        self.id
    }
    fn status(&self) -> SubmissionStatus {
        self.status
    }
    fn merchant_id(&self) -> Option<Uuid> {
        self.merchant_id
    }
    fn created_at(&self) -> chrono::DateTime<Utc> {
        self.created_at
    }
    fn decide(&mut self, status: SubmissionStatus, reason: Option<String>) {
        self.status = status;
        self.rejection_reason = reason;
        self.updated_at = Utc::now();
    }
}

impl Submission for Event {
    fn id(&self) -> Uuid {
        self.id
    }
    fn status(&self) -> SubmissionStatus {
        self.status
    }
    fn merchant_id(&self) -> Option<Uuid> {
        self.merchant_id
    }
    fn created_at(&self) -> chrono::DateTime<Utc> {
        self.created_at
    }
    fn decide(&mut self, status: SubmissionStatus, reason: Option<String>) {
        self.status = status;
        self.rejection_reason = reason;
        self.updated_at = Utc::now();
    }
}

async fn replace_pending<T: Submission>(
    records: &RwLock<Vec<T>>,
    record: T,
) -> Result<T, StoreError> {
    let mut guard = records.write().await;
    let slot = guard
        .iter_mut()
        .find(|r| r.id() == record.id())
        .ok_or(StoreError::NotFound)?;
    if slot.status() != SubmissionStatus::Pending {
        return Err(StoreError::NotPending(slot.status()));
    }
    *slot = record.clone();
    Ok(record)
}

async fn remove_pending<T: Submission>(
    records: &RwLock<Vec<T>>,
    id: Uuid,
) -> Result<(), StoreError> {
    let mut guard = records.write().await;
    let index = guard
        .iter()
        .position(|r| r.id() == id)
        .ok_or(StoreError::NotFound)?;
    let status = guard[index].status();
    if status != SubmissionStatus::Pending {
        return Err(StoreError::NotPending(status));
    }
    guard.remove(index);
    Ok(())
}

async fn decide_pending<T: Submission>(
    records: &RwLock<Vec<T>>,
    id: Uuid,
    status: SubmissionStatus,
    reason: Option<String>,
) -> Result<T, StoreError> {
    let mut guard = records.write().await;
    let slot = guard
        .iter_mut()
        .find(|r| r.id() == id)
        .ok_or(StoreError::NotFound)?;
    if slot.status() != SubmissionStatus::Pending {
        return Err(StoreError::NotPending(slot.status()));
    }
    slot.decide(status, reason);
    Ok(slot.clone())
}

async fn with_status<T: Submission>(records: &RwLock<Vec<T>>, status: SubmissionStatus) -> Vec<T> {
    let mut found: Vec<T> = records
        .read()
        .await
        .iter()
        .filter(|r| r.status() == status)
        .cloned()
        .collect();
    found.sort_by_key(|r| r.created_at());
    found
}

async fn owned_by<T: Submission>(records: &RwLock<Vec<T>>, merchant_id: Uuid) -> Vec<T> {
    let mut found: Vec<T> = records
        .read()
        .await
        .iter()
        .filter(|r| r.merchant_id() == Some(merchant_id))
        .cloned()
        .collect();
    found.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
    found
}

async fn approved_page<T: Submission>(
    records: &RwLock<Vec<T>>,
    limit: i64,
    offset: i64,
) -> (Vec<T>, i64) {
    let mut approved = with_status(records, SubmissionStatus::Approved).await;
    approved.reverse();
    let total = approved.len() as i64;
    let page = approved
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect();
    (page, total)
}

impl MemoryStore {
    /// Store pre-loaded with the static catalog.
    pub fn seeded() -> Self {
        Self {
            places: Arc::new(RwLock::new(fixtures::places())),
            events: Arc::new(RwLock::new(fixtures::events())),
        }
    }

    // ========================================================================
    // PLACES
    // ========================================================================

    pub async fn list_places(&self, filter: &PlaceFilter) -> Vec<Place> {
        let mut places: Vec<Place> = self
            .places
            .read()
            .await
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        sort_places(&mut places);
        places
    }

    pub async fn get_place(&self, id: Uuid) -> Option<Place> {
        self.places.read().await.iter().find(|p| p.id == id).cloned()
    }

    pub async fn insert_place(&self, place: Place) -> Place {
        self.places.write().await.push(place.clone());
        place
    }

    pub async fn update_pending_place(&self, place: Place) -> Result<Place, StoreError> {
        replace_pending(&self.places, place).await
    }

    pub async fn delete_pending_place(&self, id: Uuid) -> Result<(), StoreError> {
        remove_pending(&self.places, id).await
    }

    pub async fn decide_place(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        reason: Option<String>,
    ) -> Result<Place, StoreError> {
        decide_pending(&self.places, id, status, reason).await
    }

    pub async fn places_with_status(&self, status: SubmissionStatus) -> Vec<Place> {
        with_status(&self.places, status).await
    }

    pub async fn places_for_merchant(&self, merchant_id: Uuid) -> Vec<Place> {
        owned_by(&self.places, merchant_id).await
    }

    pub async fn all_places(&self) -> Vec<Place> {
        self.places.read().await.clone()
    }

    pub async fn approved_places_page(&self, limit: i64, offset: i64) -> (Vec<Place>, i64) {
        approved_page(&self.places, limit, offset).await
    }

    // ========================================================================
    // EVENTS
    // ========================================================================

    pub async fn list_events(&self, filter: &EventFilter) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .events
            .read()
            .await
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        sort_events(&mut events);
        events
    }

    pub async fn get_event(&self, id: Uuid) -> Option<Event> {
        self.events.read().await.iter().find(|e| e.id == id).cloned()
    }

    pub async fn insert_event(&self, event: Event) -> Event {
        self.events.write().await.push(event.clone());
        event
    }

    pub async fn update_pending_event(&self, event: Event) -> Result<Event, StoreError> {
        replace_pending(&self.events, event).await
    }

    pub async fn delete_pending_event(&self, id: Uuid) -> Result<(), StoreError> {
        remove_pending(&self.events, id).await
    }

    pub async fn decide_event(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        reason: Option<String>,
    ) -> Result<Event, StoreError> {
        decide_pending(&self.events, id, status, reason).await
    }

    pub async fn events_with_status(&self, status: SubmissionStatus) -> Vec<Event> {
        with_status(&self.events, status).await
    }

    pub async fn events_for_merchant(&self, merchant_id: Uuid) -> Vec<Event> {
        owned_by(&self.events, merchant_id).await
    }

    pub async fn all_events(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }

    pub async fn approved_events_page(&self, limit: i64, offset: i64) -> (Vec<Event>, i64) {
        approved_page(&self.events, limit, offset).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_place(store_places: &[Place]) -> Place {
        store_places
            .iter()
            .find(|p| p.status == SubmissionStatus::Pending)
            .cloned()
            .unwrap()
    }

    #[actix_rt::test]
    async fn public_listing_hides_pending() {
        let store = MemoryStore::seeded();
        let listed = store.list_places(&PlaceFilter::default()).await;
        assert!(!listed.is_empty());
        assert!(listed.iter().all(|p| p.status == SubmissionStatus::Approved));
    }

    #[actix_rt::test]
    async fn decide_moves_pending_once() {
        let store = MemoryStore::seeded();
        let pending = pending_place(&store.all_places().await);

        let approved = store
            .decide_place(pending.id, SubmissionStatus::Approved, None)
            .await
            .unwrap();
        assert_eq!(approved.status, SubmissionStatus::Approved);

        let again = store
            .decide_place(pending.id, SubmissionStatus::Rejected, Some("x".into()))
            .await;
        assert!(matches!(
            again,
            Err(StoreError::NotPending(SubmissionStatus::Approved))
        ));
    }

    #[actix_rt::test]
    async fn decided_records_cannot_be_replaced_or_removed() {
        let store = MemoryStore::seeded();
        let approved = store
            .places_with_status(SubmissionStatus::Approved)
            .await
            .remove(0);

        let mut edited = approved.clone();
        edited.name = "Otro nombre".into();
        assert!(matches!(
            store.update_pending_place(edited).await,
            Err(StoreError::NotPending(_))
        ));
        assert!(matches!(
            store.delete_pending_place(approved.id).await,
            Err(StoreError::NotPending(_))
        ));
        assert!(store.get_place(approved.id).await.is_some());
    }

    #[actix_rt::test]
    async fn missing_records_report_not_found() {
        let store = MemoryStore::default();
        assert!(matches!(
            store.delete_pending_event(Uuid::new_v4()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store
                .decide_event(Uuid::new_v4(), SubmissionStatus::Approved, None)
                .await,
            Err(StoreError::NotFound)
        ));
    }

    #[actix_rt::test]
    async fn pages_are_newest_first_with_total() {
        let store = MemoryStore::seeded();
        let (page, total) = store.approved_places_page(2, 0).await;
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
        assert!(page[0].created_at >= page[1].created_at);

        let (rest, _) = store.approved_places_page(2, 2).await;
        assert_eq!(rest.len(), 1);
    }

    #[actix_rt::test]
    async fn merchant_view_includes_every_status() {
        let store = MemoryStore::seeded();
        let mine = store.places_for_merchant(fixtures::DEMO_MERCHANT_ID).await;
        assert_eq!(mine.len(), fixtures::places().len());
        assert!(store.places_for_merchant(Uuid::new_v4()).await.is_empty());
    }
}
