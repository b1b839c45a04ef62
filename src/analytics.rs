use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{Event, Place, SubmissionStatus};

const TOP_LIMIT: usize = 5;
const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ZoneCount {
    pub zone: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

/// Dashboard payload for analysts and curators
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_places: usize,
    pub total_events: usize,
    pub pending_places: usize,
    pub pending_events: usize,
    pub rejected_places: usize,
    pub rejected_events: usize,
    /// Mean rating of approved places, 0 when there are none.
    pub average_rating: f64,
    pub upcoming_events: usize,
    pub top_zones: Vec<ZoneCount>,
    pub top_categories: Vec<CategoryCount>,
    pub recent_activity: Vec<Activity>,
}

fn count_status<'a>(
    statuses: impl Iterator<Item = &'a SubmissionStatus>,
    wanted: SubmissionStatus,
) -> usize {
    statuses.filter(|s| **s == wanted).count()
}

/// Highest counts first, ties broken alphabetically.
fn top_counts<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(key, count)| (key.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(TOP_LIMIT);
    ranked
}

fn status_verb(status: SubmissionStatus) -> (&'static str, &'static str) {
    match status {
        SubmissionStatus::Pending => ("submitted", "enviado a revisión"),
        SubmissionStatus::Approved => ("approved", "aprobado"),
        SubmissionStatus::Rejected => ("rejected", "rechazado"),
    }
}

fn recent_activity(places: &[Place], events: &[Event]) -> Vec<Activity> {
    let place_activity = places.iter().map(|p| {
        let (verb, text) = status_verb(p.status);
        Activity {
            kind: format!("place_{verb}"),
            timestamp: p.updated_at,
            description: format!("Lugar \"{}\" {text}", p.name),
        }
    });
    let event_activity = events.iter().map(|e| {
        let (verb, text) = status_verb(e.status);
        Activity {
            kind: format!("event_{verb}"),
            timestamp: e.updated_at,
            description: format!("Evento \"{}\" {text}", e.title),
        }
    });

    let mut activity: Vec<Activity> = place_activity.chain(event_activity).collect();
    activity.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    activity.truncate(RECENT_LIMIT);
    activity
}

pub fn compute_kpis(places: &[Place], events: &[Event], today: NaiveDate) -> Kpis {
    let approved_places: Vec<&Place> = places
        .iter()
        .filter(|p| p.status == SubmissionStatus::Approved)
        .collect();
    let approved_events: Vec<&Event> = events
        .iter()
        .filter(|e| e.status == SubmissionStatus::Approved)
        .collect();

    let average_rating = if approved_places.is_empty() {
        0.0
    } else {
        let sum: f64 = approved_places.iter().map(|p| p.rating).sum();
        let mean = sum / approved_places.len() as f64;
        (mean * 10.0).round() / 10.0
    };

    let upcoming_events = approved_events
        .iter()
        .filter(|e| e.end_date.unwrap_or(e.start_date) >= today)
        .count();

    let zones = approved_places
        .iter()
        .map(|p| p.zone.as_str())
        .chain(approved_events.iter().map(|e| e.zone.as_str()));
    let categories = approved_places
        .iter()
        .map(|p| p.category.as_str())
        .chain(approved_events.iter().map(|e| e.category.as_str()));

    Kpis {
        total_places: approved_places.len(),
        total_events: approved_events.len(),
        pending_places: count_status(places.iter().map(|p| &p.status), SubmissionStatus::Pending),
        pending_events: count_status(events.iter().map(|e| &e.status), SubmissionStatus::Pending),
        rejected_places: count_status(places.iter().map(|p| &p.status), SubmissionStatus::Rejected),
        rejected_events: count_status(events.iter().map(|e| &e.status), SubmissionStatus::Rejected),
        average_rating,
        upcoming_events,
        top_zones: top_counts(zones)
            .into_iter()
            .map(|(zone, count)| ZoneCount { zone, count })
            .collect(),
        top_categories: top_counts(categories)
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect(),
        recent_activity: recent_activity(places, events),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use chrono::Duration;

    #[test]
    fn counts_follow_status() {
        let places = fixtures::places();
        let events = fixtures::events();
        let kpis = compute_kpis(&places, &events, Utc::now().date_naive());

        assert_eq!(kpis.total_places, 3);
        assert_eq!(kpis.pending_places, 1);
        assert_eq!(kpis.rejected_places, 0);
        assert_eq!(kpis.total_events, 2);
        assert_eq!(kpis.pending_events, 1);
        assert!(kpis.average_rating > 4.0 && kpis.average_rating <= 5.0);
    }

    #[test]
    fn top_zones_rank_by_count_then_name() {
        let ranked = top_counts(["b", "a", "b", "c", "a", "b"].into_iter());
        assert_eq!(
            ranked,
            vec![("b".to_string(), 3), ("a".to_string(), 2), ("c".to_string(), 1)]
        );

        let many = top_counts(["a", "b", "c", "d", "e", "f", "g"].into_iter());
        assert_eq!(many.len(), TOP_LIMIT);
    }

    #[test]
    fn past_events_are_not_upcoming() {
        let events = fixtures::events();
        let far_future = Utc::now().date_naive() + Duration::days(3650);
        let kpis = compute_kpis(&[], &events, far_future);
        assert_eq!(kpis.upcoming_events, 0);
        assert_eq!(kpis.average_rating, 0.0);
    }

    #[test]
    fn recent_activity_is_newest_first() {
        let mut places = fixtures::places();
        places[0].updated_at = Utc::now() + Duration::hours(1);
        let kpis = compute_kpis(&places, &fixtures::events(), Utc::now().date_naive());

        assert!(kpis.recent_activity.len() <= RECENT_LIMIT);
        assert_eq!(kpis.recent_activity[0].kind, "place_approved");
        assert!(kpis.recent_activity[0].description.contains(&places[0].name));
        assert!(kpis
            .recent_activity
            .windows(2)
            .all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn serializes_camel_case_with_activity_type() {
        let kpis = compute_kpis(&fixtures::places(), &[], Utc::now().date_naive());
        let json = serde_json::to_value(&kpis).unwrap();
        assert!(json.get("totalPlaces").is_some());
        assert!(json.get("topZones").is_some());
        assert!(json["recentActivity"][0].get("type").is_some());
    }
}
