use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

// ============================================================================
// ENUMS
// ============================================================================

/// Moderation status of a submission (this is also a Postgres enum)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "submission_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Place category (Postgres enum `place_category`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "place_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlaceCategory {
    Alojamiento,
    Gastronomia,
    Actividades,
}

impl PlaceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceCategory::Alojamiento => "alojamiento",
            PlaceCategory::Gastronomia => "gastronomia",
            PlaceCategory::Actividades => "actividades",
        }
    }
}

/// Event category (Postgres enum `event_category`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "event_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Cultural,
    Deportivo,
    Gastronomico,
    Familiar,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Cultural => "cultural",
            EventCategory::Deportivo => "deportivo",
            EventCategory::Gastronomico => "gastronomico",
            EventCategory::Familiar => "familiar",
        }
    }
}

/// Price range shown on place cards. Stored as plain text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PriceRange {
    #[serde(rename = "$")]
    Low,
    #[serde(rename = "$$")]
    Medium,
    #[serde(rename = "$$$")]
    High,
}

impl PriceRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceRange::Low => "$",
            PriceRange::Medium => "$$",
            PriceRange::High => "$$$",
        }
    }
}

impl FromStr for PriceRange {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "$" => Ok(PriceRange::Low),
            "$$" => Ok(PriceRange::Medium),
            "$$$" => Ok(PriceRange::High),
            other => Err(format!("unknown price range '{other}'")),
        }
    }
}

/// Portal roles. Anything unrecognised is treated as a tourist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Tourist,
    Merchant,
    Curator,
    Analyst,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tourist => "tourist",
            Role::Merchant => "merchant",
            Role::Curator => "curator",
            Role::Analyst => "analyst",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tourist" => Ok(Role::Tourist),
            "merchant" => Ok(Role::Merchant),
            "curator" => Ok(Role::Curator),
            "analyst" => Ok(Role::Analyst),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

// ============================================================================
// CATALOG RECORDS
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Tourism place listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub category: PlaceCategory,
    pub subcategory: Option<String>,
    pub description: String,
    pub long_description: Option<String>,
    pub zone: String,
    pub address: String,
    pub coordinates: Coordinates,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub images: Vec<String>,
    pub rating: f64,
    pub price_range: Option<PriceRange>,
    pub hours: Option<BTreeMap<String, String>>,
    pub amenities: Vec<String>,
    pub merchant_id: Option<Uuid>,
    pub status: SubmissionStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Place {
    /// Copy of this place as a fresh pending submission.
    pub fn resubmitted(&self) -> Place {
        let now = Utc::now();
        Place {
            id: Uuid::new_v4(),
            status: SubmissionStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventContact {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

/// Tourism event listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: EventCategory,
    pub zone: String,
    pub location: String,
    pub coordinates: Coordinates,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_time: String,
    pub end_time: Option<String>,
    pub images: Vec<String>,
    pub organizer: Option<String>,
    pub contact: Option<EventContact>,
    pub price: Option<String>,
    pub merchant_id: Option<Uuid>,
    pub status: SubmissionStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Copy of this event as a fresh pending submission.
    pub fn resubmitted(&self) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            status: SubmissionStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }
}

// ============================================================================
// REQUEST/RESPONSE DTOs
// ============================================================================

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            fields: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            fields: None,
            timestamp: Utc::now(),
        }
    }

    pub fn validation(message: String, fields: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            fields: Some(fields),
            ..Self::error(message)
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Payload sent by merchants to create or replace a place
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaceInput {
    #[validate(length(
        min = 3,
        max = 100,
        message = "El nombre debe tener entre 3 y 100 caracteres"
    ))]
    pub name: String,
    pub category: PlaceCategory,
    pub subcategory: Option<String>,
    #[validate(length(
        min = 10,
        max = 500,
        message = "La descripción debe tener entre 10 y 500 caracteres"
    ))]
    pub description: String,
    pub long_description: Option<String>,
    #[validate(length(min = 1, message = "Debes especificar la zona"))]
    pub zone: String,
    #[validate(length(min = 5, message = "La dirección debe tener al menos 5 caracteres"))]
    pub address: String,
    pub phone: Option<String>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    #[validate(url(message = "URL inválida"))]
    pub website: Option<String>,
    pub price_range: Option<PriceRange>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitud inválida"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitud inválida"))]
    pub longitude: f64,
    #[serde(default)]
    pub images: Vec<String>,
    pub hours: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl PlaceInput {
    /// Trims required text and drops blank optional fields, so an empty
    /// email or website counts as "not provided".
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            subcategory: blank_to_none(self.subcategory),
            description: self.description.trim().to_string(),
            long_description: blank_to_none(self.long_description),
            zone: self.zone.trim().to_string(),
            address: self.address.trim().to_string(),
            phone: blank_to_none(self.phone),
            email: blank_to_none(self.email),
            website: blank_to_none(self.website),
            ..self
        }
    }

    pub fn into_new_place(self, merchant_id: Uuid) -> Place {
        let now = Utc::now();
        Place {
            id: Uuid::new_v4(),
            name: self.name,
            category: self.category,
            subcategory: self.subcategory,
            description: self.description,
            long_description: self.long_description,
            zone: self.zone,
            address: self.address,
            coordinates: Coordinates {
                lat: self.latitude,
                lng: self.longitude,
            },
            phone: self.phone,
            email: self.email,
            website: self.website,
            images: self.images,
            rating: 0.0,
            price_range: self.price_range,
            hours: self.hours,
            amenities: self.amenities,
            merchant_id: Some(merchant_id),
            status: SubmissionStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_to_existing(&self, existing: &mut Place) {
        existing.name = self.name.clone();
        existing.category = self.category;
        existing.subcategory = self.subcategory.clone();
        existing.description = self.description.clone();
        existing.long_description = self.long_description.clone();
        existing.zone = self.zone.clone();
        existing.address = self.address.clone();
        existing.coordinates = Coordinates {
            lat: self.latitude,
            lng: self.longitude,
        };
        existing.phone = self.phone.clone();
        existing.email = self.email.clone();
        existing.website = self.website.clone();
        existing.images = self.images.clone();
        existing.price_range = self.price_range;
        existing.hours = self.hours.clone();
        existing.amenities = self.amenities.clone();
        existing.updated_at = Utc::now();
    }
}

/// Payload sent by merchants to create or replace an event
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    #[validate(length(
        min = 3,
        max = 100,
        message = "El título debe tener entre 3 y 100 caracteres"
    ))]
    pub title: String,
    #[validate(length(
        min = 10,
        max = 500,
        message = "La descripción debe tener entre 10 y 500 caracteres"
    ))]
    pub description: String,
    pub category: EventCategory,
    #[validate(length(min = 1, message = "Debes especificar la zona"))]
    pub zone: String,
    #[validate(length(min = 3, message = "La ubicación debe tener al menos 3 caracteres"))]
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    // Field-level rename so validation errors are keyed `startTime` too.
    #[serde(rename = "startTime")]
    #[validate(length(min = 1, message = "Debes especificar la hora de inicio"))]
    pub start_time: String,
    pub end_time: Option<String>,
    pub price: Option<String>,
    pub organizer: Option<String>,
    pub contact: Option<EventContact>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitud inválida"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitud inválida"))]
    pub longitude: f64,
    #[serde(default)]
    pub images: Vec<String>,
}

impl EventInput {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            zone: self.zone.trim().to_string(),
            location: self.location.trim().to_string(),
            start_time: self.start_time.trim().to_string(),
            end_time: blank_to_none(self.end_time),
            price: blank_to_none(self.price),
            organizer: blank_to_none(self.organizer),
            ..self
        }
    }

    /// Field rules plus the cross-field date ordering rule.
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if let Some(end_date) = self.end_date {
            if end_date < self.start_date {
                errors.add(
                    "endDate",
                    ValidationError::new("date_order").with_message(Cow::Borrowed(
                        "La fecha de fin debe ser posterior a la fecha de inicio",
                    )),
                );
            }
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn into_new_event(self, merchant_id: Uuid) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            category: self.category,
            zone: self.zone,
            location: self.location,
            coordinates: Coordinates {
                lat: self.latitude,
                lng: self.longitude,
            },
            start_date: self.start_date,
            end_date: self.end_date,
            start_time: self.start_time,
            end_time: self.end_time,
            images: self.images,
            organizer: self.organizer,
            contact: self.contact,
            price: self.price,
            merchant_id: Some(merchant_id),
            status: SubmissionStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_to_existing(&self, existing: &mut Event) {
        existing.title = self.title.clone();
        existing.description = self.description.clone();
        existing.category = self.category;
        existing.zone = self.zone.clone();
        existing.location = self.location.clone();
        existing.coordinates = Coordinates {
            lat: self.latitude,
            lng: self.longitude,
        };
        existing.start_date = self.start_date;
        existing.end_date = self.end_date;
        existing.start_time = self.start_time.clone();
        existing.end_time = self.end_time.clone();
        existing.images = self.images.clone();
        existing.organizer = self.organizer.clone();
        existing.contact = self.contact.clone();
        existing.price = self.price.clone();
        existing.updated_at = Utc::now();
    }
}

/// Curator rejection payload
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

// ============================================================================
// COMPOSITE RESPONSE TYPES
// ============================================================================

/// Moderation queue
#[derive(Debug, Clone, Serialize)]
pub struct PendingSubmissions {
    pub places: Vec<Place>,
    pub events: Vec<Event>,
}

/// A merchant's own submissions, any status
#[derive(Debug, Clone, Serialize)]
pub struct MerchantSubmissions {
    pub places: Vec<Place>,
    pub events: Vec<Event>,
}

/// Paginated listing in the `{items, total}` shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

/// Spanish-named view of an approved place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComercioView {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub categoria: String,
    pub ciudad: String,
    pub imagen_url: Option<String>,
    pub creado_en: DateTime<Utc>,
}

impl From<&Place> for ComercioView {
    fn from(place: &Place) -> Self {
        Self {
            id: place.id,
            nombre: place.name.clone(),
            descripcion: Some(place.description.clone()),
            categoria: place.category.as_str().to_string(),
            ciudad: place.zone.clone(),
            imagen_url: place.images.first().cloned(),
            creado_en: place.created_at,
        }
    }
}

/// Spanish-named view of an approved event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventoView {
    pub id: Uuid,
    pub titulo: String,
    pub categoria: String,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: Option<NaiveDate>,
    pub imagen_url: Option<String>,
    pub creado_en: DateTime<Utc>,
}

impl From<&Event> for EventoView {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            titulo: event.title.clone(),
            categoria: event.category.as_str().to_string(),
            fecha_inicio: event.start_date,
            fecha_fin: event.end_date,
            imagen_url: event.images.first().cloned(),
            creado_en: event.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place_input() -> PlaceInput {
        PlaceInput {
            name: "Posada La Serrana".into(),
            category: PlaceCategory::Alojamiento,
            subcategory: Some("Posada".into()),
            description: "Posada rústica con vistas a las sierras".into(),
            long_description: None,
            zone: "Villa Serrana".into(),
            address: "Calle Principal 123".into(),
            phone: None,
            email: Some("".into()),
            website: Some("   ".into()),
            price_range: Some(PriceRange::Medium),
            latitude: -34.38,
            longitude: -55.01,
            images: vec![],
            hours: None,
            amenities: vec!["WiFi".into()],
        }
    }

    fn event_input() -> EventInput {
        EventInput {
            title: "Festival de Música".into(),
            description: "Tres días de música en vivo en Minas".into(),
            category: EventCategory::Cultural,
            zone: "Minas".into(),
            location: "Plaza Libertad".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            end_date: Some(NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()),
            start_time: "18:00".into(),
            end_time: None,
            price: None,
            organizer: None,
            contact: None,
            latitude: -34.37,
            longitude: -55.23,
            images: vec![],
        }
    }

    #[test]
    fn blank_optional_fields_pass_validation() {
        let input = place_input().normalized();
        assert_eq!(input.email, None);
        assert_eq!(input.website, None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn name_length_is_bounded() {
        let mut input = place_input();
        input.name = "ab".into();
        let errors = input.normalized().validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));

        let mut input = place_input();
        input.name = "x".repeat(101);
        assert!(input.normalized().validate().is_err());

        let mut input = place_input();
        input.name = "x".repeat(100);
        assert!(input.normalized().validate().is_ok());
    }

    #[test]
    fn coordinates_are_bounded() {
        let mut input = place_input();
        input.latitude = 91.0;
        input.longitude = -181.0;
        let errors = input.normalized().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("latitude"));
        assert!(fields.contains_key("longitude"));
    }

    #[test]
    fn invalid_email_is_reported() {
        let mut input = place_input();
        input.email = Some("not-an-email".into());
        let errors = input.normalized().validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn event_end_date_must_not_precede_start() {
        let mut input = event_input();
        input.end_date = NaiveDate::from_ymd_opt(2025, 3, 9);
        let errors = input.validate_all().unwrap_err();
        assert!(errors.errors().contains_key("endDate"));

        let mut same_day = event_input();
        same_day.end_date = Some(same_day.start_date);
        assert!(same_day.validate_all().is_ok());
    }

    #[test]
    fn event_errors_use_wire_field_names() {
        let mut input = event_input();
        input.start_time = "  ".into();
        input.end_date = NaiveDate::from_ymd_opt(2025, 3, 1);

        let errors = input.normalized().validate_all().unwrap_err();
        let keys: Vec<&str> = errors.errors().keys().map(|k| k.as_ref()).collect();
        assert!(keys.contains(&"startTime"));
        assert!(keys.contains(&"endDate"));
        assert!(!keys.contains(&"start_time"));
    }

    #[test]
    fn new_place_starts_pending_and_owned() {
        let merchant = Uuid::new_v4();
        let place = place_input().normalized().into_new_place(merchant);
        assert_eq!(place.status, SubmissionStatus::Pending);
        assert_eq!(place.merchant_id, Some(merchant));
        assert_eq!(place.rating, 0.0);
    }

    #[test]
    fn resubmission_gets_new_identity() {
        let mut place = place_input().into_new_place(Uuid::new_v4());
        place.status = SubmissionStatus::Rejected;
        place.rejection_reason = Some("Faltan fotos".into());

        let copy = place.resubmitted();
        assert_ne!(copy.id, place.id);
        assert_eq!(copy.status, SubmissionStatus::Pending);
        assert_eq!(copy.rejection_reason, None);
        assert_eq!(copy.name, place.name);
    }

    #[test]
    fn place_serializes_with_camel_case_and_coordinates() {
        let place = place_input().into_new_place(Uuid::new_v4());
        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["priceRange"], "$$");
        assert_eq!(json["coordinates"]["lat"], -34.38);
        assert_eq!(json["status"], "pending");
        assert!(json.get("merchantId").is_some());
    }

    #[test]
    fn unknown_category_is_rejected_on_deserialize() {
        let body = serde_json::json!({
            "name": "Lugar",
            "category": "museos",
            "description": "Descripción suficientemente larga",
            "zone": "Minas",
            "address": "Calle 123",
            "latitude": 0.0,
            "longitude": 0.0
        });
        assert!(serde_json::from_value::<PlaceInput>(body).is_err());
    }

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!("Curator".parse::<Role>(), Ok(Role::Curator));
        assert!("admin".parse::<Role>().is_err());
    }
}
