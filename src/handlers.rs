use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use futures_util::future::try_join;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::analytics;
use crate::auth::Actor;
use crate::clients::legacy::LegacyCatalogClient;
use crate::error::AppError;
use crate::filters::{EventFilter, PageQuery, PlaceFilter, PlaceQuery};
use crate::models::{
    ApiResponse, ComercioView, EventInput, EventoView, MerchantSubmissions, Page,
    PendingSubmissions, PlaceInput, RejectRequest, Role, SubmissionStatus,
};
use crate::moderation::{self, Decision};
use crate::store::CatalogStore;

type HandlerResult = Result<HttpResponse, AppError>;

/// Anything not approved is visible only to its merchant and to curators.
fn can_view(status: SubmissionStatus, merchant_id: Option<Uuid>, actor: Option<&Actor>) -> bool {
    status == SubmissionStatus::Approved
        || actor.is_some_and(|a| a.role == Role::Curator || merchant_id == Some(a.id))
}

// ============================================================================
// HEALTH CHECK
// ============================================================================

#[get("/health")]
pub async fn health_check(store: web::Data<CatalogStore>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "tourism-portal-service",
        "store": store.backend_name(),
        "timestamp": Utc::now()
    }))
}

// ============================================================================
// PLACES
// ============================================================================

#[get("/places")]
pub async fn list_places(
    store: web::Data<CatalogStore>,
    query: web::Query<PlaceQuery>,
) -> HandlerResult {
    let filter = PlaceFilter::from(query.into_inner());
    let places = store.list_places(&filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(places)))
}

#[get("/places/{place_id}")]
pub async fn get_place(
    store: web::Data<CatalogStore>,
    place_id: web::Path<Uuid>,
    actor: Option<Actor>,
) -> HandlerResult {
    let place = store
        .get_place(place_id.into_inner())
        .await?
        .filter(|p| can_view(p.status, p.merchant_id, actor.as_ref()))
        .ok_or_else(|| AppError::not_found("Place"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(place)))
}

#[post("/places")]
pub async fn create_place(
    store: web::Data<CatalogStore>,
    actor: Actor,
    payload: web::Json<PlaceInput>,
) -> HandlerResult {
    actor.require(&[Role::Merchant])?;

    let input = payload.into_inner().normalized();
    input.validate()?;

    let place = store.insert_place(input.into_new_place(actor.id)).await?;
    log::info!(
        "Place {} submitted by merchant {} ({})",
        place.id,
        actor.id,
        actor.name.as_deref().unwrap_or("sin nombre")
    );

    Ok(HttpResponse::Created().json(ApiResponse::success(place)))
}

#[put("/places/{place_id}")]
pub async fn update_place(
    store: web::Data<CatalogStore>,
    actor: Actor,
    place_id: web::Path<Uuid>,
    payload: web::Json<PlaceInput>,
) -> HandlerResult {
    actor.require(&[Role::Merchant])?;

    let mut place = store
        .get_place(place_id.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Place"))?;
    actor.require_owner(place.merchant_id)?;
    moderation::ensure_mutable(place.status)?;

    let input = payload.into_inner().normalized();
    input.validate()?;

    input.apply_to_existing(&mut place);
    let updated = store.update_pending_place(place).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

#[delete("/places/{place_id}")]
pub async fn delete_place(
    store: web::Data<CatalogStore>,
    actor: Actor,
    place_id: web::Path<Uuid>,
) -> HandlerResult {
    actor.require(&[Role::Merchant, Role::Curator])?;

    let place_id = place_id.into_inner();
    let place = store
        .get_place(place_id)
        .await?
        .ok_or_else(|| AppError::not_found("Place"))?;
    actor.require_owner(place.merchant_id)?;
    moderation::ensure_mutable(place.status)?;

    store.delete_pending_place(place_id).await?;
    log::info!("Place {} deleted by {}", place_id, actor.id);

    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "message": "Place deleted successfully"
    }))))
}

#[post("/places/{place_id}/resubmit")]
pub async fn resubmit_place(
    store: web::Data<CatalogStore>,
    actor: Actor,
    place_id: web::Path<Uuid>,
) -> HandlerResult {
    actor.require(&[Role::Merchant])?;

    let original = store
        .get_place(place_id.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Place"))?;
    actor.require_owner(original.merchant_id)?;
    moderation::ensure_resubmittable(original.status)?;

    let copy = store.insert_place(original.resubmitted()).await?;
    log::info!("Place {} resubmitted as {}", original.id, copy.id);

    Ok(HttpResponse::Created().json(ApiResponse::success(copy)))
}

// ============================================================================
// EVENTS
// ============================================================================

#[get("/events")]
pub async fn list_events(
    store: web::Data<CatalogStore>,
    query: web::Query<EventFilter>,
) -> HandlerResult {
    let events = store.list_events(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(events)))
}

#[get("/events/{event_id}")]
pub async fn get_event(
    store: web::Data<CatalogStore>,
    event_id: web::Path<Uuid>,
    actor: Option<Actor>,
) -> HandlerResult {
    let event = store
        .get_event(event_id.into_inner())
        .await?
        .filter(|e| can_view(e.status, e.merchant_id, actor.as_ref()))
        .ok_or_else(|| AppError::not_found("Event"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(event)))
}

#[post("/events")]
pub async fn create_event(
    store: web::Data<CatalogStore>,
    actor: Actor,
    payload: web::Json<EventInput>,
) -> HandlerResult {
    actor.require(&[Role::Merchant])?;

    let input = payload.into_inner().normalized();
    input.validate_all()?;

    let event = store.insert_event(input.into_new_event(actor.id)).await?;
    log::info!(
        "Event {} submitted by merchant {} ({})",
        event.id,
        actor.id,
        actor.name.as_deref().unwrap_or("sin nombre")
    );

    Ok(HttpResponse::Created().json(ApiResponse::success(event)))
}

#[put("/events/{event_id}")]
pub async fn update_event(
    store: web::Data<CatalogStore>,
    actor: Actor,
    event_id: web::Path<Uuid>,
    payload: web::Json<EventInput>,
) -> HandlerResult {
    actor.require(&[Role::Merchant])?;

    let mut event = store
        .get_event(event_id.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Event"))?;
    actor.require_owner(event.merchant_id)?;
    moderation::ensure_mutable(event.status)?;

    let input = payload.into_inner().normalized();
    input.validate_all()?;

    input.apply_to_existing(&mut event);
    let updated = store.update_pending_event(event).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

#[delete("/events/{event_id}")]
pub async fn delete_event(
    store: web::Data<CatalogStore>,
    actor: Actor,
    event_id: web::Path<Uuid>,
) -> HandlerResult {
    actor.require(&[Role::Merchant, Role::Curator])?;

    let event_id = event_id.into_inner();
    let event = store
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event"))?;
    actor.require_owner(event.merchant_id)?;
    moderation::ensure_mutable(event.status)?;

    store.delete_pending_event(event_id).await?;
    log::info!("Event {} deleted by {}", event_id, actor.id);

    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "message": "Event deleted successfully"
    }))))
}

#[post("/events/{event_id}/resubmit")]
pub async fn resubmit_event(
    store: web::Data<CatalogStore>,
    actor: Actor,
    event_id: web::Path<Uuid>,
) -> HandlerResult {
    actor.require(&[Role::Merchant])?;

    let original = store
        .get_event(event_id.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Event"))?;
    actor.require_owner(original.merchant_id)?;
    moderation::ensure_resubmittable(original.status)?;

    let copy = store.insert_event(original.resubmitted()).await?;
    log::info!("Event {} resubmitted as {}", original.id, copy.id);

    Ok(HttpResponse::Created().json(ApiResponse::success(copy)))
}

// ============================================================================
// MERCHANT PANEL
// ============================================================================

#[get("/merchant/submissions")]
pub async fn merchant_submissions(store: web::Data<CatalogStore>, actor: Actor) -> HandlerResult {
    actor.require(&[Role::Merchant])?;

    let (places, events) = try_join(
        store.places_for_merchant(actor.id),
        store.events_for_merchant(actor.id),
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(MerchantSubmissions { places, events })))
}

// ============================================================================
// MODERATION
// ============================================================================

#[get("/moderation/pending")]
pub async fn list_pending(store: web::Data<CatalogStore>, actor: Actor) -> HandlerResult {
    actor.require(&[Role::Curator])?;

    let (places, events) = try_join(
        store.places_with_status(SubmissionStatus::Pending),
        store.events_with_status(SubmissionStatus::Pending),
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(PendingSubmissions { places, events })))
}

async fn moderate_place(
    store: &CatalogStore,
    actor: &Actor,
    place_id: Uuid,
    decision: Decision,
) -> HandlerResult {
    let place = store
        .get_place(place_id)
        .await?
        .ok_or_else(|| AppError::not_found("Place"))?;
    let status = moderation::decide(place.status, &decision)?;

    let decided = store
        .decide_place(place_id, status, decision.reason().map(str::to_string))
        .await?;
    log::info!("Place {} {} by curator {}", place_id, status, actor.id);

    Ok(HttpResponse::Ok().json(ApiResponse::success(decided)))
}

async fn moderate_event(
    store: &CatalogStore,
    actor: &Actor,
    event_id: Uuid,
    decision: Decision,
) -> HandlerResult {
    let event = store
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event"))?;
    let status = moderation::decide(event.status, &decision)?;

    let decided = store
        .decide_event(event_id, status, decision.reason().map(str::to_string))
        .await?;
    log::info!("Event {} {} by curator {}", event_id, status, actor.id);

    Ok(HttpResponse::Ok().json(ApiResponse::success(decided)))
}

#[post("/moderation/places/{place_id}/approve")]
pub async fn approve_place(
    store: web::Data<CatalogStore>,
    actor: Actor,
    place_id: web::Path<Uuid>,
) -> HandlerResult {
    actor.require(&[Role::Curator])?;
    moderate_place(&store, &actor, place_id.into_inner(), Decision::Approve).await
}

#[post("/moderation/places/{place_id}/reject")]
pub async fn reject_place(
    store: web::Data<CatalogStore>,
    actor: Actor,
    place_id: web::Path<Uuid>,
    payload: Option<web::Json<RejectRequest>>,
) -> HandlerResult {
    actor.require(&[Role::Curator])?;
    let decision = Decision::reject(payload.and_then(|p| p.into_inner().reason))?;
    moderate_place(&store, &actor, place_id.into_inner(), decision).await
}

#[post("/moderation/events/{event_id}/approve")]
pub async fn approve_event(
    store: web::Data<CatalogStore>,
    actor: Actor,
    event_id: web::Path<Uuid>,
) -> HandlerResult {
    actor.require(&[Role::Curator])?;
    moderate_event(&store, &actor, event_id.into_inner(), Decision::Approve).await
}

#[post("/moderation/events/{event_id}/reject")]
pub async fn reject_event(
    store: web::Data<CatalogStore>,
    actor: Actor,
    event_id: web::Path<Uuid>,
    payload: Option<web::Json<RejectRequest>>,
) -> HandlerResult {
    actor.require(&[Role::Curator])?;
    let decision = Decision::reject(payload.and_then(|p| p.into_inner().reason))?;
    moderate_event(&store, &actor, event_id.into_inner(), decision).await
}

// ============================================================================
// ANALYTICS
// ============================================================================

#[get("/analytics/kpis")]
pub async fn get_kpis(store: web::Data<CatalogStore>, actor: Actor) -> HandlerResult {
    actor.require(&[Role::Analyst, Role::Curator])?;

    let (places, events) = try_join(store.all_places(), store.all_events()).await?;
    let kpis = analytics::compute_kpis(&places, &events, Utc::now().date_naive());

    Ok(HttpResponse::Ok().json(ApiResponse::success(kpis)))
}

// ============================================================================
// LEGACY LISTINGS
// ============================================================================

#[get("/comercios")]
pub async fn list_comercios(
    store: web::Data<CatalogStore>,
    query: web::Query<PageQuery>,
) -> HandlerResult {
    let (page, page_size, offset) = query.resolve();
    let (places, total) = store.approved_places_page(page_size, offset).await?;

    Ok(HttpResponse::Ok().json(Page {
        items: places.iter().map(ComercioView::from).collect(),
        total,
        page,
        page_size,
    }))
}

#[get("/eventos")]
pub async fn list_eventos(
    store: web::Data<CatalogStore>,
    query: web::Query<PageQuery>,
) -> HandlerResult {
    let (page, page_size, offset) = query.resolve();
    let (events, total) = store.approved_events_page(page_size, offset).await?;

    Ok(HttpResponse::Ok().json(Page {
        items: events.iter().map(EventoView::from).collect(),
        total,
        page,
        page_size,
    }))
}

// ============================================================================
// FEATURED
// ============================================================================

#[derive(Deserialize)]
pub struct FeaturedQuery {
    pub limit: Option<usize>,
}

impl FeaturedQuery {
    pub const DEFAULT_LIMIT: usize = 6;
    pub const MAX_LIMIT: usize = 50;

    fn limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .min(Self::MAX_LIMIT)
    }
}

#[get("/featured/places")]
pub async fn featured_places(
    client: web::Data<LegacyCatalogClient>,
    query: web::Query<FeaturedQuery>,
) -> HttpResponse {
    let cards = client.featured_places(query.limit()).await;
    HttpResponse::Ok().json(ApiResponse::success(cards))
}

#[get("/featured/events")]
pub async fn featured_events(
    client: web::Data<LegacyCatalogClient>,
    query: web::Query<FeaturedQuery>,
) -> HttpResponse {
    let cards = client.featured_events(query.limit()).await;
    HttpResponse::Ok().json(ApiResponse::success(cards))
}

/// Registers every route plus body/query error handlers that answer with the
/// standard envelope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    // Health
    .service(health_check)
    // Places
    .service(list_places)
    .service(create_place)
    .service(get_place)
    .service(update_place)
    .service(delete_place)
    .service(resubmit_place)
    // Events
    .service(list_events)
    .service(create_event)
    .service(get_event)
    .service(update_event)
    .service(delete_event)
    .service(resubmit_event)
    // Merchant panel
    .service(merchant_submissions)
    // Moderation
    .service(list_pending)
    .service(approve_place)
    .service(reject_place)
    .service(approve_event)
    .service(reject_event)
    // Analytics
    .service(get_kpis)
    // Legacy listings
    .service(list_comercios)
    .service(list_eventos)
    // Featured
    .service(featured_places)
    .service(featured_events);
}
