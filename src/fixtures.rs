//! Static catalog served in mock mode and used as the featured-card fallback.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    Coordinates, Event, EventCategory, EventContact, Place, PlaceCategory, PriceRange,
    SubmissionStatus,
};
use crate::normalize::{format_card_date, EventCard, PlaceCard};

pub const DEMO_MERCHANT_ID: Uuid = Uuid::from_u128(0x5e7a_0000_0000_4000_8000_0000_0000_0001);

fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn coords(lat: f64, lng: f64) -> Coordinates {
    Coordinates { lat, lng }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn hours(entries: &[(&str, &str)]) -> Option<BTreeMap<String, String>> {
    Some(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

pub fn places() -> Vec<Place> {
    vec![
        Place {
            id: Uuid::from_u128(0x1),
            name: "Posada La Serrana".into(),
            category: PlaceCategory::Alojamiento,
            subcategory: Some("Posada".into()),
            description: "Posada rústica en Villa Serrana con vistas a las sierras".into(),
            long_description: Some(
                "Habitaciones acogedoras con calefacción, desayuno incluido y actividades al aire libre."
                    .into(),
            ),
            zone: "Villa Serrana".into(),
            address: "Calle Principal 123, Villa Serrana".into(),
            coordinates: coords(-34.3833, -55.0167),
            phone: Some("+598 98 123 456".into()),
            email: Some("info@posadalaserana.com".into()),
            website: Some("https://posadalaserana.com".into()),
            images: strings(&[
                "https://images.unsplash.com/photo-1566073771259-6a8506099945?w=800",
                "https://images.unsplash.com/photo-1582719478250-c89cae4dc85b?w=800",
            ]),
            rating: 4.8,
            price_range: Some(PriceRange::Medium),
            hours: hours(&[("Lunes-Domingo", "Check-in: 14:00 / Check-out: 11:00")]),
            amenities: strings(&["WiFi", "Estacionamiento", "Desayuno", "Calefacción", "Jardín"]),
            merchant_id: Some(DEMO_MERCHANT_ID),
            status: SubmissionStatus::Approved,
            rejection_reason: None,
            created_at: ts(1_705_276_800),
            updated_at: ts(1_730_419_200),
        },
        Place {
            id: Uuid::from_u128(0x2),
            name: "Parrillada El Fogón".into(),
            category: PlaceCategory::Gastronomia,
            subcategory: Some("Parrilla".into()),
            description: "La mejor carne a la parrilla de Minas".into(),
            long_description: Some(
                "Restaurante familiar especializado en carnes a la parrilla y platos típicos uruguayos."
                    .into(),
            ),
            zone: "Minas".into(),
            address: "Av. Artigas 456, Minas".into(),
            coordinates: coords(-34.3756, -55.2378),
            phone: Some("+598 98 234 567".into()),
            email: Some("contacto@elfogon.com".into()),
            website: None,
            images: strings(&["https://images.unsplash.com/photo-1544025162-d76694265947?w=800"]),
            rating: 4.6,
            price_range: Some(PriceRange::Medium),
            hours: hours(&[
                ("Lunes-Viernes", "12:00 - 15:00, 19:00 - 23:00"),
                ("Sábado-Domingo", "12:00 - 23:00"),
            ]),
            amenities: strings(&["WiFi", "Estacionamiento", "Terraza", "Apto celíacos"]),
            merchant_id: Some(DEMO_MERCHANT_ID),
            status: SubmissionStatus::Approved,
            rejection_reason: None,
            created_at: ts(1_707_523_200),
            updated_at: ts(1_729_382_400),
        },
        Place {
            id: Uuid::from_u128(0x3),
            name: "Trekking Salto del Penitente".into(),
            category: PlaceCategory::Actividades,
            subcategory: Some("Trekking".into()),
            description: "Caminata guiada al Salto del Penitente".into(),
            long_description: Some(
                "Excursión de medio día con guía especializado, refrigerio y traslado desde Minas."
                    .into(),
            ),
            zone: "Sierra de Minas".into(),
            address: "Punto de encuentro: Plaza Libertad, Minas".into(),
            coordinates: coords(-34.3567, -55.1234),
            phone: Some("+598 98 345 678".into()),
            email: Some("info@trekkinglavalleja.com".into()),
            website: None,
            images: strings(&["https://images.unsplash.com/photo-1551632811-561732d1e306?w=800"]),
            rating: 4.9,
            price_range: Some(PriceRange::Low),
            hours: hours(&[("Sábado-Domingo", "Salidas: 9:00 y 14:00")]),
            amenities: strings(&["Guía", "Refrigerio", "Transporte", "Seguro"]),
            merchant_id: Some(DEMO_MERCHANT_ID),
            status: SubmissionStatus::Approved,
            rejection_reason: None,
            created_at: ts(1_709_251_200),
            updated_at: ts(1_728_950_400),
        },
        Place {
            id: Uuid::from_u128(0x4),
            name: "Café del Cerro".into(),
            category: PlaceCategory::Gastronomia,
            subcategory: Some("Cafetería".into()),
            description: "Cafetería de especialidad al pie del Cerro Arequita".into(),
            long_description: None,
            zone: "Cerro Arequita".into(),
            address: "Ruta 81 km 5, Lavalleja".into(),
            coordinates: coords(-34.2870, -55.2600),
            phone: None,
            email: None,
            website: None,
            images: Vec::new(),
            rating: 0.0,
            price_range: Some(PriceRange::Low),
            hours: None,
            amenities: strings(&["WiFi"]),
            merchant_id: Some(DEMO_MERCHANT_ID),
            status: SubmissionStatus::Pending,
            rejection_reason: None,
            created_at: ts(1_730_937_600),
            updated_at: ts(1_730_937_600),
        },
    ]
}

pub fn events() -> Vec<Event> {
    vec![
        Event {
            id: Uuid::from_u128(0x101),
            title: "Festival de Música en Minas".into(),
            description: "Tres noches de música en vivo con artistas locales y nacionales".into(),
            category: EventCategory::Cultural,
            zone: "Minas".into(),
            location: "Plaza Libertad".into(),
            coordinates: coords(-34.3759, -55.2377),
            start_date: date(2025, 2, 14),
            end_date: Some(date(2025, 2, 16)),
            start_time: "19:00".into(),
            end_time: Some("23:30".into()),
            images: strings(&["https://images.unsplash.com/photo-1483412033650-1015ddeb83d1?w=800"]),
            organizer: Some("Intendencia de Lavalleja".into()),
            contact: Some(EventContact {
                phone: Some("+598 4442 0000".into()),
                email: Some("cultura@lavalleja.gub.uy".into()),
                website: None,
            }),
            price: Some("Gratis".into()),
            merchant_id: Some(DEMO_MERCHANT_ID),
            status: SubmissionStatus::Approved,
            rejection_reason: None,
            created_at: ts(1_730_419_200),
            updated_at: ts(1_730_419_200),
        },
        Event {
            id: Uuid::from_u128(0x102),
            title: "Feria Gastronómica Serrana".into(),
            description: "Productores locales, quesos artesanales y cocina de campo".into(),
            category: EventCategory::Gastronomico,
            zone: "Villa Serrana".into(),
            location: "Parador Villa Serrana".into(),
            coordinates: coords(-34.3830, -55.0160),
            start_date: date(2025, 1, 18),
            end_date: None,
            start_time: "11:00".into(),
            end_time: Some("20:00".into()),
            images: strings(&["https://images.unsplash.com/photo-1476224203421-9ac39bcb3327?w=800"]),
            organizer: Some("Liga de Fomento Villa Serrana".into()),
            contact: None,
            price: Some("$200".into()),
            merchant_id: Some(DEMO_MERCHANT_ID),
            status: SubmissionStatus::Approved,
            rejection_reason: None,
            created_at: ts(1_729_814_400),
            updated_at: ts(1_729_814_400),
        },
        Event {
            id: Uuid::from_u128(0x103),
            title: "Carrera del Cerro".into(),
            description: "Carrera de montaña de 21 km por las sierras de Minas".into(),
            category: EventCategory::Deportivo,
            zone: "Sierra de Minas".into(),
            location: "Parque Salus".into(),
            coordinates: coords(-34.3390, -55.2290),
            start_date: date(2025, 4, 6),
            end_date: None,
            start_time: "08:00".into(),
            end_time: None,
            images: Vec::new(),
            organizer: Some("Club Atlético Minas".into()),
            contact: None,
            price: Some("$800".into()),
            merchant_id: Some(DEMO_MERCHANT_ID),
            status: SubmissionStatus::Pending,
            rejection_reason: None,
            created_at: ts(1_731_024_000),
            updated_at: ts(1_731_024_000),
        },
    ]
}

pub fn featured_place_cards() -> Vec<PlaceCard> {
    let card = |title: &str, image: &str, subtitle: &str, badge: &str| PlaceCard {
        title: title.into(),
        image_url: image.into(),
        subtitle: Some(subtitle.into()),
        badge: Some(badge.into()),
    };
    vec![
        card(
            "Cerro Arequita",
            "https://images.unsplash.com/photo-1502920514313-52581002a659?w=1200&q=80&auto=format&fit=crop",
            "Minas, Lavalleja",
            "Naturaleza",
        ),
        card(
            "Parque Salto del Penitente",
            "https://images.unsplash.com/photo-1473445730015-841f29a9490b?w=1200&q=80&auto=format&fit=crop",
            "Cascadas y senderismo",
            "Aventura",
        ),
        card(
            "Villa Serrana",
            "https://images.unsplash.com/photo-1500530855697-b586d89ba3ee?w=1200&q=80&auto=format&fit=crop",
            "Cabañas y descanso",
            "Escapadas",
        ),
    ]
}

/// Fallback event cards dated a few days from today.
pub fn featured_event_cards() -> Vec<EventCard> {
    let today = Utc::now().date_naive();
    vec![
        EventCard {
            title: "Feria Gastronómica Serrana".into(),
            image_url: "https://images.unsplash.com/photo-1476224203421-9ac39bcb3327?w=1200&q=80&auto=format&fit=crop".into(),
            subtitle: Some(format_card_date(today + Duration::days(3))),
            badge: Some("Gastronómico".into()),
        },
        EventCard {
            title: "Festival de Música en Minas".into(),
            image_url: "https://images.unsplash.com/photo-1483412033650-1015ddeb83d1?w=1200&q=80&auto=format&fit=crop".into(),
            subtitle: Some(format_card_date(today + Duration::days(10))),
            badge: Some("Cultural".into()),
        },
    ]
}
