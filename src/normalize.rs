//! Normalisation of upstream catalog payloads.
//!
//! The legacy API answers with a bare array, `{items: [...]}` or
//! `{data: [...]}`, and its records mix Spanish and English field names.
//! Everything is folded into the card shape the portal front page renders.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.jpg";
const SUBTITLE_DESCRIPTION_CHARS: usize = 90;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceCard {
    pub title: String,
    pub image_url: String,
    pub subtitle: Option<String>,
    pub badge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCard {
    pub title: String,
    pub image_url: String,
    pub subtitle: Option<String>,
    pub badge: Option<String>,
}

/// Extracts the record list from any of the accepted envelope shapes.
pub fn pick_array(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in ["items", "data"] {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return items;
                }
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// First key holding a non-empty string, taken verbatim (numbers are stringified).
fn first_text(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

pub fn comercio_to_card(record: &Value) -> PlaceCard {
    let subtitle = first_text(record, &["ciudad", "subtitulo"]).or_else(|| {
        first_text(record, &["descripcion"])
            .map(|d| truncate_chars(&d, SUBTITLE_DESCRIPTION_CHARS))
    });

    PlaceCard {
        title: first_text(record, &["nombre", "title"]).unwrap_or_else(|| "Comercio".into()),
        image_url: first_text(record, &["imagen_url", "imageUrl"])
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.into()),
        subtitle: Some(subtitle.unwrap_or_default()),
        badge: first_text(record, &["categoria", "tipo"]),
    }
}

pub fn evento_to_card(record: &Value) -> EventCard {
    let date = first_text(record, &["fecha_inicio", "fecha", "date"])
        .and_then(|raw| parse_loose_date(&raw))
        .map(format_card_date);
    let subtitle = date.or_else(|| first_text(record, &["subtitulo"]));

    EventCard {
        title: first_text(record, &["nombre", "titulo"]).unwrap_or_else(|| "Evento".into()),
        image_url: first_text(record, &["imagen_url", "imageUrl"])
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.into()),
        subtitle: Some(subtitle.unwrap_or_default()),
        badge: first_text(record, &["categoria", "category"]),
    }
}

pub fn place_cards(payload: Value, limit: usize) -> Vec<PlaceCard> {
    pick_array(payload)
        .iter()
        .take(limit)
        .map(comercio_to_card)
        .collect()
}

pub fn event_cards(payload: Value, limit: usize) -> Vec<EventCard> {
    pick_array(payload)
        .iter()
        .take(limit)
        .map(evento_to_card)
        .collect()
}

/// Accepts RFC 3339 timestamps, naive timestamps and plain dates.
pub fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

pub fn format_card_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_all_envelope_shapes() {
        let record = json!({"nombre": "Villa Serrana"});
        assert_eq!(pick_array(json!([record.clone()])).len(), 1);
        assert_eq!(pick_array(json!({"items": [record.clone()], "total": 1})).len(), 1);
        assert_eq!(pick_array(json!({"data": [record.clone(), record]})).len(), 2);
    }

    #[test]
    fn unknown_shapes_yield_nothing() {
        assert!(pick_array(json!({"results": []})).is_empty());
        assert!(pick_array(json!({"items": "nope"})).is_empty());
        assert!(pick_array(json!("text")).is_empty());
        assert!(pick_array(Value::Null).is_empty());
    }

    #[test]
    fn maps_spanish_comercio_fields() {
        let card = comercio_to_card(&json!({
            "nombre": "Parrillada El Fogón",
            "imagen_url": "https://img/fogon.jpg",
            "ciudad": "Minas",
            "categoria": "gastronomia"
        }));
        assert_eq!(card.title, "Parrillada El Fogón");
        assert_eq!(card.image_url, "https://img/fogon.jpg");
        assert_eq!(card.subtitle.as_deref(), Some("Minas"));
        assert_eq!(card.badge.as_deref(), Some("gastronomia"));
    }

    #[test]
    fn maps_english_fields_and_defaults() {
        let card = comercio_to_card(&json!({"title": "Cerro Arequita", "imageUrl": "a.jpg", "tipo": "Naturaleza"}));
        assert_eq!(card.title, "Cerro Arequita");
        assert_eq!(card.image_url, "a.jpg");
        assert_eq!(card.badge.as_deref(), Some("Naturaleza"));
        assert_eq!(card.subtitle.as_deref(), Some(""));

        let empty = comercio_to_card(&json!({"nombre": ""}));
        assert_eq!(empty.title, "Comercio");
        assert_eq!(empty.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(empty.badge, None);
    }

    #[test]
    fn only_empty_strings_count_as_missing() {
        let card = comercio_to_card(&json!({"nombre": "  ", "title": "Otro", "ciudad": " Minas "}));
        assert_eq!(card.title, "  ");
        assert_eq!(card.subtitle.as_deref(), Some(" Minas "));
    }

    #[test]
    fn long_descriptions_are_truncated_for_subtitles() {
        let description = "á".repeat(120);
        let card = comercio_to_card(&json!({"nombre": "X", "descripcion": description}));
        assert_eq!(card.subtitle.unwrap().chars().count(), 90);
    }

    #[test]
    fn event_dates_become_subtitles() {
        let card = evento_to_card(&json!({"titulo": "Feria", "fecha_inicio": "2025-03-10T18:00:00"}));
        assert_eq!(card.title, "Feria");
        assert_eq!(card.subtitle.as_deref(), Some("10/03/2025"));

        let card = evento_to_card(&json!({"nombre": "Festival", "date": "2025-12-01T10:00:00Z", "category": "cultural"}));
        assert_eq!(card.subtitle.as_deref(), Some("01/12/2025"));
        assert_eq!(card.badge.as_deref(), Some("cultural"));
    }

    #[test]
    fn unparseable_event_date_falls_back_to_subtitle() {
        let card = evento_to_card(&json!({"fecha": "pronto", "subtitulo": "Próximamente"}));
        assert_eq!(card.title, "Evento");
        assert_eq!(card.subtitle.as_deref(), Some("Próximamente"));
    }

    #[test]
    fn card_lists_respect_limit() {
        let payload = json!({"items": [{"nombre": "a"}, {"nombre": "b"}, {"nombre": "c"}]});
        let cards = place_cards(payload, 2);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].title, "b");
    }
}
